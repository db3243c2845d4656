//! Message block codec for `INBOX.md` / `OUTBOX.md`.
//!
//! # Block Format
//!
//! ```text
//! ---
//! ID: msg-001          (omitted when empty)
//! From: agent-1
//! To: manager          (omitted when empty)
//! Thread: thread-7     (omitted when empty)
//! Type: milestone
//! Time: 2026-01-19T10:00:00Z
//! ---
//! Task completed successfully
//! <blank line>
//! ```
//!
//! A log is a sequence of such blocks. Text outside a block (such as a
//! `# Inbox` title) is ignored by the reader.
//!
//! # Reader
//!
//! The reader is a three-state machine driven one line at a time:
//!
//! - **Seeking**: a `---` line opens a block in header mode; anything else is
//!   skipped.
//! - **Header**: `Key: value` lines fill in the message; `---` switches to
//!   body mode.
//! - **Body**: lines are buffered as content. A `---` line here is *content*,
//!   not a delimiter. A blank line after at least one content line completes
//!   the message; blank lines before any content are skipped.
//!
//! At end of input a body with buffered content is flushed as the final
//! message.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Line that opens and closes the header block.
pub const DELIMITER: &str = "---";

/// One inter-agent message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Optional identifier; empty means absent.
    pub id: String,
    pub from: String,
    /// Optional recipient; empty means absent.
    pub to: String,
    /// Optional conversation thread; empty means absent.
    pub thread: String,
    /// The `Type` header (`directive`, `milestone`, `question`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    /// `None` when the block had no parseable `Time` header.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        kind: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            kind: kind.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    #[must_use]
    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Render this message as one log block.
    ///
    /// `Time` uses the message timestamp, or `now` when it is unset. The
    /// block ends with the content followed by one blank line.
    #[must_use]
    pub fn render(&self, now: DateTime<Utc>) -> String {
        let time = self.timestamp.unwrap_or(now);
        let mut out = String::new();
        let _ = writeln!(out, "{DELIMITER}");
        if !self.id.is_empty() {
            let _ = writeln!(out, "ID: {}", self.id);
        }
        let _ = writeln!(out, "From: {}", self.from);
        if !self.to.is_empty() {
            let _ = writeln!(out, "To: {}", self.to);
        }
        if !self.thread.is_empty() {
            let _ = writeln!(out, "Thread: {}", self.thread);
        }
        let _ = writeln!(out, "Type: {}", self.kind);
        let _ = writeln!(out, "Time: {}", format_time(time));
        let _ = writeln!(out, "{DELIMITER}");
        out.push_str(&self.content);
        out.push_str("\n\n");
        out
    }

    fn apply(&mut self, field: HeaderField) {
        match field {
            HeaderField::Id(v) => self.id = v,
            HeaderField::From(v) => self.from = v,
            HeaderField::To(v) => self.to = v,
            HeaderField::Thread(v) => self.thread = v,
            HeaderField::Type(v) => self.kind = v,
            HeaderField::Time(t) => self.timestamp = Some(t),
        }
    }
}

/// RFC 3339 with second precision and a `Z` suffix.
#[must_use]
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A recognized header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderField {
    Id(String),
    From(String),
    To(String),
    Thread(String),
    Type(String),
    Time(DateTime<Utc>),
}

/// Parse one header line.
///
/// The line is split on the first `": "`; key and value are trimmed. Unknown
/// keys, lines without the separator, and unparseable `Time` values yield
/// `None`.
#[must_use]
pub fn parse_header_field(line: &str) -> Option<HeaderField> {
    let Some((key, value)) = line.split_once(": ") else {
        trace!(line, "dropping header line without separator");
        return None;
    };
    let value = value.trim().to_string();

    let field = match key.trim() {
        "ID" => HeaderField::Id(value),
        "From" => HeaderField::From(value),
        "To" => HeaderField::To(value),
        "Thread" => HeaderField::Thread(value),
        "Type" => HeaderField::Type(value),
        "Time" => match DateTime::parse_from_rfc3339(&value) {
            Ok(t) => HeaderField::Time(t.with_timezone(&Utc)),
            Err(e) => {
                trace!(value = value.as_str(), error = %e, "dropping unparseable Time header");
                return None;
            }
        },
        other => {
            trace!(key = other, "dropping unknown header key");
            return None;
        }
    };
    Some(field)
}

// ---------------------------------------------------------------------------
// Reader state machine
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum ReadState<'a> {
    Seeking,
    Header(Message),
    Body(Message, Vec<&'a str>),
}

impl<'a> ReadState<'a> {
    fn step(self, line: &'a str, out: &mut Vec<Message>) -> Self {
        match self {
            Self::Seeking => Self::seeking(line),
            Self::Header(msg) => Self::header(msg, line),
            Self::Body(msg, content) => Self::body(msg, content, line, out),
        }
    }

    fn seeking(line: &'a str) -> Self {
        if line == DELIMITER {
            Self::Header(Message::default())
        } else {
            Self::Seeking
        }
    }

    fn header(mut msg: Message, line: &'a str) -> Self {
        if line == DELIMITER {
            return Self::Body(msg, Vec::new());
        }
        if let Some(field) = parse_header_field(line) {
            msg.apply(field);
        }
        Self::Header(msg)
    }

    fn body(msg: Message, mut content: Vec<&'a str>, line: &'a str, out: &mut Vec<Message>) -> Self {
        if !line.trim().is_empty() {
            // Includes a literal `---`: inside a body it is content.
            content.push(line);
            return Self::Body(msg, content);
        }
        if content.is_empty() {
            return Self::Body(msg, content);
        }
        out.push(complete(msg, &content));
        Self::Seeking
    }

    fn finish(self, out: &mut Vec<Message>) {
        match self {
            Self::Body(msg, content) if !content.is_empty() => out.push(complete(msg, &content)),
            Self::Seeking | Self::Header(_) | Self::Body(..) => {}
        }
    }
}

fn complete(mut msg: Message, content: &[&str]) -> Message {
    msg.content = content.join("\n").trim().to_string();
    msg
}

/// Parse a whole message log, returning messages in file order.
#[must_use]
pub fn parse_messages(text: &str) -> Vec<Message> {
    let mut out = Vec::new();
    let mut state = ReadState::Seeking;
    for line in text.lines() {
        state = state.step(line, &mut out);
    }
    state.finish(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 19, h, m, 0)
            .single()
            .expect("valid time")
    }

    #[test]
    fn render_full_message() {
        let msg = Message::new("manager", "directive", "Please implement feature X")
            .with_id("msg-abc123")
            .with_to("agent-alice")
            .with_thread("thread-001")
            .with_timestamp(at(10, 0));
        assert_eq!(
            msg.render(at(0, 0)),
            "---\nID: msg-abc123\nFrom: manager\nTo: agent-alice\nThread: thread-001\n\
             Type: directive\nTime: 2026-01-19T10:00:00Z\n---\nPlease implement feature X\n\n"
        );
    }

    #[test]
    fn render_omits_optional_headers_and_uses_now() {
        let msg = Message::new("", "", "body");
        assert_eq!(
            msg.render(at(9, 30)),
            "---\nFrom: \nType: \nTime: 2026-01-19T09:30:00Z\n---\nbody\n\n"
        );
    }

    #[test]
    fn parses_single_message() {
        let log = "---\nID: msg-001\nFrom: agent-1\nType: milestone\nTime: 2026-01-19T10:00:00Z\n---\nTask completed successfully\n\n";
        let msgs = parse_messages(log);
        assert_eq!(msgs.len(), 1);
        let m = &msgs[0];
        assert_eq!(m.id, "msg-001");
        assert_eq!(m.from, "agent-1");
        assert_eq!(m.kind, "milestone");
        assert_eq!(m.to, "");
        assert_eq!(m.content, "Task completed successfully");
        assert_eq!(m.timestamp, Some(at(10, 0)));
    }

    #[test]
    fn parses_multiple_messages_in_order() {
        let log = "# Outbox\n---\nFrom: agent-1\nType: milestone\nTime: 2026-01-19T10:00:00Z\n---\nFirst message\n\n\
                   ---\nFrom: agent-2\nType: question\nTime: 2026-01-19T11:00:00Z\n---\nSecond message\n\n";
        let msgs = parse_messages(log);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].from, "agent-1");
        assert_eq!(msgs[0].content, "First message");
        assert_eq!(msgs[1].kind, "question");
        assert_eq!(msgs[1].timestamp, Some(at(11, 0)));
    }

    #[test]
    fn delimiter_inside_body_is_content() {
        let msg = Message::new("a", "note", "above\n---\nbelow").with_timestamp(at(1, 0));
        let msgs = parse_messages(&msg.render(at(0, 0)));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "above\n---\nbelow");
    }

    #[test]
    fn body_may_start_with_delimiter_line() {
        let msgs = parse_messages("---\nFrom: a\nType: t\n---\n---\nafter\n\n");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "---\nafter");
    }

    #[test]
    fn blank_line_ends_body() {
        // Text after the terminating blank line is outside any block.
        let msgs = parse_messages("---\nFrom: a\nType: t\n---\npara one\n\npara two\n");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "para one");
    }

    #[test]
    fn leading_blank_lines_in_body_are_skipped() {
        let msgs = parse_messages("---\nFrom: a\nType: t\n---\n\n\n  content  \n\n");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "content");
    }

    #[test]
    fn eof_flushes_buffered_body() {
        let msgs = parse_messages("---\nFrom: a\nType: t\n---\nno trailing blank");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "no trailing blank");
    }

    #[test]
    fn unfinished_blocks_are_not_materialized() {
        assert!(parse_messages("---\nFrom: a\nType: t\n").is_empty());
        assert!(parse_messages("---\nFrom: a\n---\n\n").is_empty());
        assert!(parse_messages("").is_empty());
        assert!(parse_messages("# Inbox\n").is_empty());
    }

    #[test]
    fn bad_time_leaves_timestamp_unset() {
        let msgs = parse_messages("---\nFrom: a\nType: t\nTime: yesterday\n---\nx\n\n");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].timestamp, None);
    }

    #[test]
    fn offset_times_are_normalized_to_utc() {
        let msgs = parse_messages("---\nFrom: a\nType: t\nTime: 2026-01-19T12:00:00+02:00\n---\nx\n\n");
        assert_eq!(msgs[0].timestamp, Some(at(10, 0)));
    }

    #[test]
    fn header_field_parsing() {
        assert_eq!(
            parse_header_field("From: agent-1"),
            Some(HeaderField::From("agent-1".into()))
        );
        assert_eq!(
            parse_header_field("Thread:  t-1  "),
            Some(HeaderField::Thread("t-1".into()))
        );
        assert_eq!(
            parse_header_field("Type: a: b"),
            Some(HeaderField::Type("a: b".into()))
        );
        assert_eq!(parse_header_field("From:agent"), None);
        assert_eq!(parse_header_field("Priority: high"), None);
        assert_eq!(parse_header_field("garbage"), None);
        assert_eq!(parse_header_field("Time: nope"), None);
    }

    #[test]
    fn render_then_parse_round_trips() {
        let msg = Message::new("agent-1", "milestone", "done")
            .with_id("m-1")
            .with_to("manager")
            .with_thread("t-9")
            .with_timestamp(at(8, 15));
        let msgs = parse_messages(&msg.render(at(0, 0)));
        assert_eq!(msgs, vec![msg]);
    }
}
