//! `cstack send`: append one message block to a mailbox.


use clap::Args;
use cstack_core::message::format_time;
use cstack_core::{ErrorCode, Mailbox, Message, append_message_with};
use serde::Serialize;
use tracing::warn;

use crate::Ctx;
use crate::output::{CodedError, render};

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Target mailbox: inbox or outbox.
    pub mailbox: Mailbox,

    /// Sender (defaults to `messages.default_from` in .cstack/config.toml).
    #[arg(long)]
    pub from: Option<String>,

    /// Message type, e.g. milestone, question, directive.
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: String,

    /// Recipient.
    #[arg(long)]
    pub to: Option<String>,

    /// Thread identifier.
    #[arg(long)]
    pub thread: Option<String>,

    /// Message identifier.
    #[arg(long)]
    pub id: Option<String>,

    /// Message body.
    pub content: String,
}

#[derive(Debug, Serialize)]
struct Sent<'a> {
    mailbox: Mailbox,
    #[serde(flatten)]
    message: &'a Message,
}

/// Drop blank lines: a blank line ends a block in the log format.
fn body(content: &str) -> String {
    let kept: Vec<&str> = content
        .trim()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();
    if kept.len() != content.trim().lines().count() {
        warn!("blank lines removed from message body");
    }
    kept.join("\n")
}

impl SendArgs {
    fn message(&self, default_from: Option<&str>) -> Result<Message, CodedError> {
        let from = self
            .from
            .as_deref()
            .or(default_from)
            .ok_or_else(|| {
                CodedError::new(
                    ErrorCode::InvalidArgument,
                    "--from is required (or set messages.default_from)",
                )
            })?;

        let content = body(&self.content);
        if content.is_empty() {
            return Err(CodedError::new(
                ErrorCode::InvalidArgument,
                "message content is empty",
            ));
        }

        let mut msg = Message::new(from, self.kind.trim(), content);
        if let Some(id) = &self.id {
            msg = msg.with_id(id.trim());
        }
        if let Some(to) = &self.to {
            msg = msg.with_to(to.trim());
        }
        if let Some(thread) = &self.thread {
            msg = msg.with_thread(thread.trim());
        }
        Ok(msg)
    }
}

/// Execute `cstack send`.
///
/// # Errors
///
/// Returns an error if the sender is unknown, the body is empty, or the log
/// cannot be written.
pub fn run_send(args: &SendArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let messages = &ctx.config.project.messages;
    let msg = args.message(messages.default_from.as_deref())?;
    let stamped = append_message_with(
        &ctx.workspace,
        args.mailbox,
        &msg,
        messages.append_options(),
    )?;
    let msg = msg.with_timestamp(stamped);

    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    let sent = Sent {
        mailbox: args.mailbox,
        message: &msg,
    };
    render(ctx.output, &sent, |s, w| {
        writeln!(
            w,
            "✓ {} {} from {} at {}",
            s.mailbox,
            s.message.kind,
            s.message.from,
            format_time(stamped)
        )
    })
}
