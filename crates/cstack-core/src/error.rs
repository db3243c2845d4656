use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    StackDirFailed,
    ReadFailed,
    WriteFailed,
    TruncateFailed,
    ConfigParseError,
    InvalidTaskIndex,
    InvalidArgument,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StackDirFailed => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidTaskIndex => "E2001",
            Self::InvalidArgument => "E2002",
            Self::ReadFailed => "E5001",
            Self::WriteFailed => "E5002",
            Self::TruncateFailed => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StackDirFailed => "Stack directory could not be created",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidTaskIndex => "No task at that position",
            Self::InvalidArgument => "Invalid argument",
            Self::ReadFailed => "Stack file read failed",
            Self::WriteFailed => "Stack file write failed",
            Self::TruncateFailed => "Stack file truncate failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::StackDirFailed => Some("Check write permissions on the workspace root."),
            Self::ConfigParseError => Some("Fix syntax in .cstack/config.toml and retry."),
            Self::InvalidTaskIndex => Some("Run `cstack plan` to see task numbers."),
            Self::InvalidArgument => None,
            Self::ReadFailed => Some("Check that the file is readable by the current user."),
            Self::WriteFailed | Self::TruncateFailed => {
                Some("Check disk space and write permissions.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The file operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    CreateDir,
    Open,
    Stat,
    Read,
    Write,
    Truncate,
}

impl FileOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::CreateDir => "create directory",
            Self::Open => "open",
            Self::Stat => "stat",
            Self::Read => "read",
            Self::Write => "write",
            Self::Truncate => "truncate",
        }
    }
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by stack file operations.
///
/// A missing file is never an error: readers return the document default and
/// clearing is a no-op. Everything else identifies the file and operation.
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: FileOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StackError {
    pub(crate) fn io(op: FileOp, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { op, .. } => match op {
                FileOp::CreateDir => ErrorCode::StackDirFailed,
                FileOp::Open | FileOp::Stat | FileOp::Read => ErrorCode::ReadFailed,
                FileOp::Write => ErrorCode::WriteFailed,
                FileOp::Truncate => ErrorCode::TruncateFailed,
            },
        }
    }

    /// Path of the file the failing operation targeted.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } => path,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

pub type Result<T, E = StackError> = std::result::Result<T, E>;
