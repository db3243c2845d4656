//! On-disk layout of the `.cstack` state directory.
//!
//! # Directory Layout
//!
//! ```text
//! <workspace>/
//!   .cstack/
//!     CURRENT.md     # current task, focus, next steps
//!     PLAN.md        # task checklist + notes
//!     INBOX.md       # messages to this agent (append-only)
//!     OUTBOX.md      # messages from this agent (append-only)
//!     QUICKREF.md    # static reference card
//!     config.toml    # optional project config
//! ```
//!
//! Every operation opens, consumes and closes its file within the call. There
//! is no locking: concurrent appenders rely on the platform's atomic append
//! for a single write call.

use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Read as IoRead, Write as IoWrite};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FileOp, Result, StackError};
use crate::mailbox::Mailbox;

/// Name of the state directory under the workspace root.
pub const STACK_DIR: &str = ".cstack";

pub const CURRENT_FILE: &str = "CURRENT.md";
pub const PLAN_FILE: &str = "PLAN.md";
pub const INBOX_FILE: &str = "INBOX.md";
pub const OUTBOX_FILE: &str = "OUTBOX.md";
pub const QUICKREF_FILE: &str = "QUICKREF.md";
pub const CONFIG_FILE: &str = "config.toml";

/// Resolves the paths of the stack files for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDir {
    root: PathBuf,
}

impl StackDir {
    /// Stack directory for the given workspace root. Nothing is created.
    #[must_use]
    pub fn new(workspace: impl AsRef<Path>) -> Self {
        Self {
            root: workspace.as_ref().join(STACK_DIR),
        }
    }

    /// Path of the `.cstack` directory itself.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn current_path(&self) -> PathBuf {
        self.root.join(CURRENT_FILE)
    }

    #[must_use]
    pub fn plan_path(&self) -> PathBuf {
        self.root.join(PLAN_FILE)
    }

    #[must_use]
    pub fn mailbox_path(&self, mailbox: Mailbox) -> PathBuf {
        self.root.join(mailbox.file_name())
    }

    #[must_use]
    pub fn quickref_path(&self) -> PathBuf {
        self.root.join(QUICKREF_FILE)
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Create the stack directory (and parents) if missing. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Io`] with [`FileOp::CreateDir`] on failure.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| StackError::io(FileOp::CreateDir, &self.root, e))
    }
}

// ---------------------------------------------------------------------------
// File helpers shared by the document and mailbox modules
// ---------------------------------------------------------------------------

/// Contents and metadata of a stack file that exists.
pub(crate) struct Loaded {
    pub text: String,
    pub metadata: Metadata,
}

/// Read a whole stack file. `Ok(None)` when the file does not exist.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than failing the read.
pub(crate) fn load(path: &Path) -> Result<Option<Loaded>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "stack file absent");
            return Ok(None);
        }
        Err(e) => return Err(StackError::io(FileOp::Open, path, e)),
    };

    let metadata = file
        .metadata()
        .map_err(|e| StackError::io(FileOp::Stat, path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| StackError::io(FileOp::Read, path, e))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!(path = %path.display(), "stack file is not valid UTF-8");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    debug!(path = %path.display(), bytes = text.len(), "read stack file");
    Ok(Some(Loaded { text, metadata }))
}

/// Replace the contents of a stack file, creating the directory if needed.
pub(crate) fn overwrite(dir: &StackDir, path: &Path, content: &str) -> Result<()> {
    dir.ensure_dir()?;
    fs::write(path, content).map_err(|e| StackError::io(FileOp::Write, path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote stack file");
    Ok(())
}

/// Append `content` with a single `write_all` (`O_APPEND`), creating the file.
pub(crate) fn append(dir: &StackDir, path: &Path, content: &str, durable: bool) -> Result<()> {
    dir.ensure_dir()?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StackError::io(FileOp::Open, path, e))?;

    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| StackError::io(FileOp::Write, path, e))?;

    if durable {
        file.sync_data()
            .map_err(|e| StackError::io(FileOp::Write, path, e))?;
    }

    debug!(path = %path.display(), bytes = content.len(), durable, "appended to stack file");
    Ok(())
}

/// Truncate a stack file to zero length. Missing files are left missing.
pub(crate) fn truncate(path: &Path) -> Result<bool> {
    match OpenOptions::new().write(true).open(path) {
        Ok(file) => {
            file.set_len(0)
                .map_err(|e| StackError::io(FileOp::Truncate, path, e))?;
            debug!(path = %path.display(), "truncated stack file");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StackError::io(FileOp::Truncate, path, e)),
    }
}
