//! cstack-core library.
//!
//! Reads and writes the markdown files an agent keeps under `.cstack/`:
//!
//! - `CURRENT.md`: current task, focus and next steps ([`current`]).
//! - `PLAN.md`: task checklist and notes ([`plan`]).
//! - `INBOX.md` / `OUTBOX.md`: append-only message logs ([`mailbox`],
//!   [`message`]).
//!
//! Missing files read as empty documents. Unrecognized lines are dropped
//! rather than reported; only I/O failures are errors.
//!
//! # Conventions
//!
//! - **Errors**: [`StackError`] for file operations, `anyhow::Result` for
//!   config loading.
//! - **Logging**: `tracing` macros (`info!`, `debug!`, `trace!`).

pub mod config;
pub mod current;
pub mod error;
pub mod init;
pub mod mailbox;
pub mod message;
pub mod plan;
pub mod section;
pub mod stack;
pub mod templates;

pub use current::{CurrentState, read_current, write_current};
pub use error::{ErrorCode, FileOp, StackError};
pub use init::{InitReport, init_stack};
pub use mailbox::{
    AppendOptions, Mailbox, append_message, append_message_with, clear_inbox, clear_mailbox,
    clear_outbox, read_inbox, read_messages, read_outbox, write_inbox, write_outbox,
};
pub use message::{Message, parse_messages};
pub use plan::{PlanOptions, PlanState, Task, TaskStatus, read_plan, read_plan_with, write_plan};
pub use stack::{STACK_DIR, StackDir};
