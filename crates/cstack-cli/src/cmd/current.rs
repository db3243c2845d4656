//! `cstack current` and `cstack checkpoint`: read and rewrite `CURRENT.md`.

use std::io::Write;

use clap::Args;
use cstack_core::message::format_time;
use cstack_core::{CurrentState, ErrorCode, read_current, write_current};
use tracing::info;

use crate::Ctx;
use crate::output::{CodedError, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct CurrentArgs {}

#[derive(Args, Debug)]
pub struct CheckpointArgs {
    /// Replace the current task.
    #[arg(long)]
    pub task: Option<String>,

    /// Replace the focus.
    #[arg(long)]
    pub focus: Option<String>,

    /// Append a next step (repeatable).
    #[arg(long = "step", value_name = "STEP")]
    pub steps: Vec<String>,

    /// Drop existing next steps before appending `--step` values.
    #[arg(long)]
    pub clear_steps: bool,
}

impl CheckpointArgs {
    /// Apply the requested changes to `state`.
    ///
    /// A next step is one bullet line, so steps containing line breaks are
    /// rejected before anything changes.
    fn apply(&self, state: &mut CurrentState) -> Result<(), CodedError> {
        if let Some(step) = self.steps.iter().find(|s| s.contains(['\n', '\r'])) {
            return Err(CodedError::new(
                ErrorCode::InvalidArgument,
                format!("next step must be a single line: {step:?}"),
            ));
        }
        if let Some(task) = &self.task {
            state.task = task.trim().to_string();
        }
        if let Some(focus) = &self.focus {
            state.focus = focus.trim().to_string();
        }
        if self.clear_steps {
            state.next_steps.clear();
        }
        state.next_steps.extend(
            self.steps
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Ok(())
    }
}

fn or_none(value: &str) -> &str {
    if value.is_empty() { "(none)" } else { value }
}

fn write_text(state: &CurrentState, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "task: {}", state.task.replace('\n', " / "))?;
    writeln!(w, "focus: {}", state.focus.replace('\n', " / "))?;
    for step in &state.next_steps {
        writeln!(w, "- {step}")?;
    }
    Ok(())
}

fn write_pretty(state: &CurrentState, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Current")?;
    pretty_kv(w, "Task", or_none(&state.task))?;
    pretty_kv(w, "Focus", or_none(&state.focus))?;
    pretty_kv(w, "Updated", format_time(state.last_modified))?;
    writeln!(w)?;
    pretty_section(w, "Next Steps")?;
    if state.next_steps.is_empty() {
        writeln!(w, "(none)")?;
    }
    for (i, step) in state.next_steps.iter().enumerate() {
        writeln!(w, "{:>2}. {step}", i + 1)?;
    }
    Ok(())
}

/// Execute `cstack current`.
///
/// # Errors
///
/// Returns an error if `CURRENT.md` exists but cannot be read.
pub fn run_current(_args: &CurrentArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let state = read_current(&ctx.workspace)?;
    render_mode(ctx.output, &state, write_text, write_pretty)
}

/// Execute `cstack checkpoint`.
///
/// # Errors
///
/// Returns an error if `CURRENT.md` cannot be read or written.
pub fn run_checkpoint(args: &CheckpointArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let mut state = read_current(&ctx.workspace)?;
    args.apply(&mut state)?;
    write_current(&ctx.workspace, &state)?;
    info!(steps = state.next_steps.len(), "checkpoint written");

    let state = read_current(&ctx.workspace)?;
    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render_mode(ctx.output, &state, write_text, write_pretty)
}
