#![no_main]

use chrono::{TimeZone, Utc};
use cstack_core::CurrentState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some(epoch) = Utc.timestamp_opt(0, 0).single() else {
        return;
    };
    let state = CurrentState::parse(text, epoch);
    let _ = CurrentState::parse(&state.render(), epoch);
});
