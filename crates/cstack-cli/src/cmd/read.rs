//! `cstack read`: list the messages in a mailbox.

use std::io::Write;

use clap::Args;
use cstack_core::message::format_time;
use cstack_core::{Mailbox, Message, read_messages};
use serde::Serialize;

use crate::Ctx;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Mailbox to read: inbox or outbox.
    pub mailbox: Mailbox,
}

#[derive(Debug, Serialize)]
struct Listing {
    mailbox: Mailbox,
    count: usize,
    messages: Vec<Message>,
}

fn time_or_unknown(msg: &Message) -> String {
    msg.timestamp.map_or_else(|| "-".to_string(), format_time)
}

fn write_text(listing: &Listing, w: &mut dyn Write) -> std::io::Result<()> {
    for msg in &listing.messages {
        writeln!(
            w,
            "{}  {}  {}  {}",
            time_or_unknown(msg),
            msg.from,
            msg.kind,
            msg.content.replace('\n', " / ")
        )?;
    }
    Ok(())
}

fn write_pretty(listing: &Listing, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("{} ({})", listing.mailbox, listing.count))?;
    for msg in &listing.messages {
        if !msg.id.is_empty() {
            pretty_kv(w, "ID", &msg.id)?;
        }
        pretty_kv(w, "From", &msg.from)?;
        if !msg.to.is_empty() {
            pretty_kv(w, "To", &msg.to)?;
        }
        if !msg.thread.is_empty() {
            pretty_kv(w, "Thread", &msg.thread)?;
        }
        pretty_kv(w, "Type", &msg.kind)?;
        pretty_kv(w, "Time", time_or_unknown(msg))?;
        writeln!(w)?;
        for line in msg.content.lines() {
            writeln!(w, "    {line}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Execute `cstack read`.
///
/// # Errors
///
/// Returns an error if the log exists but cannot be read.
pub fn run_read(args: &ReadArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let messages = read_messages(&ctx.workspace, args.mailbox)?;
    let listing = Listing {
        mailbox: args.mailbox,
        count: messages.len(),
        messages,
    };
    render_mode(ctx.output, &listing, write_text, write_pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ReadArgs,
    }

    #[test]
    fn parses_mailbox_case_insensitively() {
        let w = Wrapper::parse_from(["test", "OUTBOX"]);
        assert_eq!(w.args.mailbox, Mailbox::Outbox);
    }

    #[test]
    fn text_row_per_message() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 19, 10, 0, 0).single().expect("ts");
        let listing = Listing {
            mailbox: Mailbox::Inbox,
            count: 2,
            messages: vec![
                Message::new("manager", "directive", "line one\nline two").with_timestamp(ts),
                Message::new("agent", "note", "untimed"),
            ],
        };
        let mut buf = Vec::new();
        write_text(&listing, &mut buf).expect("write");
        assert_eq!(
            String::from_utf8(buf).expect("utf8"),
            "2026-01-19T10:00:00Z  manager  directive  line one / line two\n\
             -  agent  note  untimed\n"
        );
    }
}
