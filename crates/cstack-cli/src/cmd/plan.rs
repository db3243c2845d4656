//! `cstack plan`: show the checklist, add tasks, change task status.
//!
//! - `cstack plan` prints the numbered task list.
//! - `cstack plan add <desc>` appends a pending task.
//! - `cstack plan mark <n> <status>` changes task `n` (1-based).

use std::io::Write;

use clap::{Args, Subcommand};
use cstack_core::{ErrorCode, PlanState, TaskStatus, read_plan_with, write_plan};
use serde::Serialize;
use tracing::info;

use crate::Ctx;
use crate::output::{CodedError, pretty_kv, pretty_section, render_mode, render_success};

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(subcommand)]
    pub action: Option<PlanAction>,
}

#[derive(Subcommand, Debug)]
pub enum PlanAction {
    /// Append a pending task.
    Add {
        /// Task description.
        description: String,
    },
    /// Set the status of task `n`.
    Mark {
        /// Task number as shown by `cstack plan` (1-based).
        n: usize,
        /// pending, in_progress, completed or blocked.
        status: TaskStatus,
    },
}

#[derive(Debug, Serialize)]
struct PlanView<'a> {
    #[serde(flatten)]
    plan: &'a PlanState,
    counts: Counts,
}

#[derive(Debug, Serialize)]
struct Counts {
    pending: usize,
    in_progress: usize,
    completed: usize,
    blocked: usize,
}

impl Counts {
    fn of(plan: &PlanState) -> Self {
        Self {
            pending: plan.count(TaskStatus::Pending),
            in_progress: plan.count(TaskStatus::InProgress),
            completed: plan.count(TaskStatus::Completed),
            blocked: plan.count(TaskStatus::Blocked),
        }
    }
}

/// Execute `cstack plan [add|mark]`.
///
/// # Errors
///
/// Returns an error if `PLAN.md` cannot be read or written, or if `mark`
/// names a task that does not exist.
pub fn run_plan(args: &PlanArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let options = ctx.config.project.plan.options();
    let mut plan = read_plan_with(&ctx.workspace, options)?;

    match &args.action {
        None => show(&plan, ctx),
        Some(PlanAction::Add { description }) => {
            let description = description.trim();
            check_description(description)?;
            plan.add_task(description);
            let n = plan.tasks.len();
            write_plan(&ctx.workspace, &plan)?;
            info!(n, "task added");
            finish(ctx, &plan, &format!("Added task #{n}: {description}"))
        }
        Some(PlanAction::Mark { n, status }) => {
            let total = plan.tasks.len();
            let task = n
                .checked_sub(1)
                .and_then(|index| plan.set_status(index, *status))
                .cloned()
                .ok_or_else(|| {
                    CodedError::new(
                        ErrorCode::InvalidTaskIndex,
                        format!("task #{n} (plan has {total} tasks)"),
                    )
                })?;
            write_plan(&ctx.workspace, &plan)?;
            info!(n, %status, "task status changed");
            finish(ctx, &plan, &format!("Task #{n} is {status}: {}", task.description))
        }
    }
}

/// A task is one checkbox line: non-empty, no line breaks.
fn check_description(description: &str) -> Result<(), CodedError> {
    if description.is_empty() {
        return Err(CodedError::new(
            ErrorCode::InvalidArgument,
            "task description is empty",
        ));
    }
    if description.contains(['\n', '\r']) {
        return Err(CodedError::new(
            ErrorCode::InvalidArgument,
            "task description must be a single line",
        ));
    }
    Ok(())
}

fn finish(ctx: &Ctx, plan: &PlanState, message: &str) -> anyhow::Result<()> {
    if ctx.output.is_json() {
        return show(plan, ctx);
    }
    if ctx.quiet {
        return Ok(());
    }
    render_success(ctx.output, message)
}

fn show(plan: &PlanState, ctx: &Ctx) -> anyhow::Result<()> {
    let view = PlanView {
        plan,
        counts: Counts::of(plan),
    };
    render_mode(ctx.output, &view, write_text, write_pretty)
}

fn write_text(view: &PlanView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for (i, task) in view.plan.tasks.iter().enumerate() {
        writeln!(w, "{}  {}  {}", i + 1, task.status, task.description)?;
    }
    Ok(())
}

fn write_pretty(view: &PlanView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Tasks")?;
    if view.plan.tasks.is_empty() {
        writeln!(w, "(no tasks)")?;
    }
    for (i, task) in view.plan.tasks.iter().enumerate() {
        writeln!(w, "{:>3}. {}", i + 1, task.to_line())?;
    }
    writeln!(w)?;
    let c = &view.counts;
    pretty_kv(
        w,
        "Progress",
        format!(
            "{} done, {} active, {} pending, {} blocked",
            c.completed, c.in_progress, c.pending, c.blocked
        ),
    )?;
    if !view.plan.notes.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Notes")?;
        writeln!(w, "{}", view.plan.notes)?;
    }
    Ok(())
}
