#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use cstack_core::{Message, TaskStatus};
use proptest::prelude::*;

/// Single line of prose: no newline, no surrounding whitespace, never blank,
/// never a `## ` header.
pub fn arb_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]([A-Za-z0-9 .,;:!?()_/'-]{0,40}[A-Za-z0-9.!?)])?"
}

/// A header value: trimmed, may be empty.
pub fn arb_header_value() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[A-Za-z0-9][A-Za-z0-9._-]{0,20}"]
}

/// Multi-line body text where each line is non-blank.
pub fn arb_block(max_lines: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_text(), 1..=max_lines).prop_map(|lines| lines.join("\n"))
}

pub fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

/// Whole-second timestamps between 1970 and 2100.
pub fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0_i64..4_102_444_800).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .expect("in-range timestamp")
    })
}

/// Message body lines, occasionally a literal `---`.
pub fn arb_content() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![4 => arb_text(), 1 => Just("---".to_string())], 1..6)
        .prop_map(|lines| lines.join("\n"))
}

pub fn arb_message() -> impl Strategy<Value = Message> {
    (
        arb_header_value(),
        arb_header_value(),
        arb_header_value(),
        arb_header_value(),
        arb_header_value(),
        arb_content(),
        arb_timestamp(),
    )
        .prop_map(|(id, from, to, thread, kind, content, ts)| Message {
            id,
            from,
            to,
            thread,
            kind,
            content,
            timestamp: Some(ts),
        })
}
