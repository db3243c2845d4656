//! `cstack init`: create `.cstack/` and seed missing files.

use std::io::Write;
use std::path::Path;

use clap::Args;
use cstack_core::{InitReport, init_stack};

use crate::Ctx;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct InitArgs {}

fn relative<'a>(path: &'a Path, workspace: &Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(workspace)
        .unwrap_or(path)
        .to_string_lossy()
}

/// Execute `cstack init`.
///
/// ```text
/// .cstack/
///   CURRENT.md    PLAN.md    INBOX.md    OUTBOX.md    QUICKREF.md
/// ```
///
/// Running it again only fills in files that have gone missing.
///
/// # Errors
///
/// Returns an error if the directory or a missing file cannot be created.
pub fn run_init(_args: &InitArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let report = init_stack(&ctx.workspace)?;
    let ws = ctx.workspace.as_path();

    render_mode(
        ctx.output,
        &report,
        |r: &InitReport, w: &mut dyn Write| {
            for path in &r.created {
                writeln!(w, "created  {}", relative(path, ws))?;
            }
            for path in &r.existing {
                writeln!(w, "exists   {}", relative(path, ws))?;
            }
            Ok(())
        },
        |r: &InitReport, w: &mut dyn Write| {
            pretty_section(w, "Initialized .cstack/")?;
            pretty_kv(w, "Created", r.created.len().to_string())?;
            pretty_kv(w, "Kept", r.existing.len().to_string())?;
            for path in &r.created {
                writeln!(w, "  + {}", relative(path, ws))?;
            }
            if !ctx.quiet {
                writeln!(w)?;
                writeln!(w, "Next steps:")?;
                writeln!(w, "  cstack plan add \"First task\"")?;
                writeln!(w, "  cstack checkpoint --task \"First task\"")?;
                writeln!(w, "  cat .cstack/QUICKREF.md")?;
            }
            Ok(())
        },
    )
}
