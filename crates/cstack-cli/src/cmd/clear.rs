//! `cstack clear`: truncate a mailbox.

use clap::Args;
use cstack_core::{Mailbox, clear_mailbox};

use crate::Ctx;
use crate::output::render_success;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Mailbox to truncate: inbox or outbox.
    pub mailbox: Mailbox,
}

/// Execute `cstack clear`. Clearing a mailbox that was never written succeeds.
///
/// # Errors
///
/// Returns an error if the log exists but cannot be truncated.
pub fn run_clear(args: &ClearArgs, ctx: &Ctx) -> anyhow::Result<()> {
    clear_mailbox(&ctx.workspace, args.mailbox)?;
    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render_success(ctx.output, &format!("Cleared {}", args.mailbox))
}
