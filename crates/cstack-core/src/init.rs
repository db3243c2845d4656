//! Stack bootstrap: create `.cstack/` and seed missing files.

use std::fs::OpenOptions;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FileOp, Result, StackError};
use crate::mailbox::Mailbox;
use crate::stack::StackDir;
use crate::templates;

/// Outcome of [`init_stack`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub stack_dir: PathBuf,
    /// Files written by this call.
    pub created: Vec<PathBuf>,
    /// Files that already existed and were left untouched.
    pub existing: Vec<PathBuf>,
}

/// Create the stack directory and seed every missing file from its template.
///
/// Existing files are never overwritten, so this is safe to run repeatedly.
///
/// # Errors
///
/// Returns [`StackError::Io`] if the directory cannot be created or a
/// missing file cannot be written.
pub fn init_stack(workspace: &Path) -> Result<InitReport> {
    let dir = StackDir::new(workspace);
    dir.ensure_dir()?;

    let seeds = [
        (dir.current_path(), templates::CURRENT),
        (dir.plan_path(), templates::PLAN),
        (dir.mailbox_path(Mailbox::Inbox), templates::INBOX),
        (dir.mailbox_path(Mailbox::Outbox), templates::OUTBOX),
        (dir.quickref_path(), templates::QUICKREF),
    ];

    let mut report = InitReport {
        stack_dir: dir.root().to_path_buf(),
        ..InitReport::default()
    };

    for (path, content) in seeds {
        if create_new(&path, content)? {
            debug!(path = %path.display(), "seeded stack file");
            report.created.push(path);
        } else {
            report.existing.push(path);
        }
    }

    info!(
        dir = %report.stack_dir.display(),
        created = report.created.len(),
        existing = report.existing.len(),
        "stack initialized"
    );
    Ok(report)
}

/// Write `content` to `path` only if nothing is there yet.
fn create_new(path: &Path, content: &str) -> Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(StackError::io(FileOp::Open, path, e)),
    };
    file.write_all(content.as_bytes())
        .map_err(|e| StackError::io(FileOp::Write, path, e))?;
    Ok(true)
}
