//! Append-only inbox/outbox logs.
//!
//! `INBOX.md` holds messages *to* this agent, `OUTBOX.md` messages *from* it.
//! Both use the block format in [`crate::message`]. Blocks are appended and
//! never edited; the only other mutation is truncating the whole log.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::message::{Message, parse_messages};
use crate::stack::{self, INBOX_FILE, OUTBOX_FILE, StackDir};

/// Which message log to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mailbox {
    Inbox,
    Outbox,
}

impl Mailbox {
    pub const ALL: [Self; 2] = [Self::Inbox, Self::Outbox];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Outbox => "outbox",
        }
    }

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Inbox => INBOX_FILE,
            Self::Outbox => OUTBOX_FILE,
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mailbox '{got}': use inbox or outbox")]
pub struct ParseMailboxError {
    pub got: String,
}

impl FromStr for Mailbox {
    type Err = ParseMailboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "outbox" => Ok(Self::Outbox),
            _ => Err(ParseMailboxError { got: s.to_string() }),
        }
    }
}

/// Options for [`append_message_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOptions {
    /// `fsync` the log after writing.
    pub durable: bool,
}

/// Append `message` to a mailbox log, creating the directory and file.
///
/// Returns the timestamp written to the block: the message's own, or now.
///
/// # Errors
///
/// Returns [`crate::StackError::Io`] if the directory cannot be created or
/// the log cannot be opened or written.
pub fn append_message(
    workspace: &Path,
    mailbox: Mailbox,
    message: &Message,
) -> Result<DateTime<Utc>> {
    append_message_with(workspace, mailbox, message, AppendOptions::default())
}

/// [`append_message`] with explicit [`AppendOptions`].
///
/// # Errors
///
/// Same as [`append_message`].
pub fn append_message_with(
    workspace: &Path,
    mailbox: Mailbox,
    message: &Message,
    options: AppendOptions,
) -> Result<DateTime<Utc>> {
    let dir = StackDir::new(workspace);
    let stamped = message.timestamp.unwrap_or_else(Utc::now);
    let block = message.render(stamped);

    stack::append(&dir, &dir.mailbox_path(mailbox), &block, options.durable)?;
    debug!(%mailbox, from = message.from.as_str(), kind = message.kind.as_str(), "message appended");
    Ok(stamped)
}

/// Read every message in a mailbox log, in append order.
///
/// A missing log reads as empty.
///
/// # Errors
///
/// Returns [`crate::StackError::Io`] if the log exists but cannot be read.
pub fn read_messages(workspace: &Path, mailbox: Mailbox) -> Result<Vec<Message>> {
    let path = StackDir::new(workspace).mailbox_path(mailbox);
    Ok(stack::load(&path)?
        .map(|loaded| parse_messages(&loaded.text))
        .unwrap_or_default())
}

/// Truncate a mailbox log to zero length. Clearing a missing log succeeds.
///
/// # Errors
///
/// Returns [`crate::StackError::Io`] if the log exists but cannot be
/// truncated.
pub fn clear_mailbox(workspace: &Path, mailbox: Mailbox) -> Result<()> {
    let path = StackDir::new(workspace).mailbox_path(mailbox);
    let existed = stack::truncate(&path)?;
    debug!(%mailbox, existed, "mailbox cleared");
    Ok(())
}

/// Append to `INBOX.md`.
///
/// # Errors
///
/// See [`append_message`].
pub fn write_inbox(workspace: &Path, message: &Message) -> Result<DateTime<Utc>> {
    append_message(workspace, Mailbox::Inbox, message)
}

/// Append to `OUTBOX.md`.
///
/// # Errors
///
/// See [`append_message`].
pub fn write_outbox(workspace: &Path, message: &Message) -> Result<DateTime<Utc>> {
    append_message(workspace, Mailbox::Outbox, message)
}

/// Read `INBOX.md`.
///
/// # Errors
///
/// See [`read_messages`].
pub fn read_inbox(workspace: &Path) -> Result<Vec<Message>> {
    read_messages(workspace, Mailbox::Inbox)
}

/// Read `OUTBOX.md`.
///
/// # Errors
///
/// See [`read_messages`].
pub fn read_outbox(workspace: &Path) -> Result<Vec<Message>> {
    read_messages(workspace, Mailbox::Outbox)
}

/// Truncate `INBOX.md`.
///
/// # Errors
///
/// See [`clear_mailbox`].
pub fn clear_inbox(workspace: &Path) -> Result<()> {
    clear_mailbox(workspace, Mailbox::Inbox)
}

/// Truncate `OUTBOX.md`.
///
/// # Errors
///
/// See [`clear_mailbox`].
pub fn clear_outbox(workspace: &Path) -> Result<()> {
    clear_mailbox(workspace, Mailbox::Outbox)
}
