#![no_main]

use chrono::{TimeZone, Utc};
use cstack_core::message::parse_messages;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let messages = parse_messages(text);
    let _ = serde_json::to_string(&messages);

    // Re-rendering what was parsed must not lose or invent blocks.
    let Some(epoch) = Utc.timestamp_opt(0, 0).single() else {
        return;
    };
    let rendered: String = messages
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| m.render(epoch))
        .collect();
    let kept = messages.iter().filter(|m| !m.content.is_empty()).count();
    assert_eq!(parse_messages(&rendered).len(), kept);
});
