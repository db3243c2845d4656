#![no_main]

use cstack_core::{PlanOptions, PlanState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for notes_headers in [true, false] {
        let options = PlanOptions { notes_headers };
        let plan = PlanState::parse_with(text, options);
        let again = PlanState::parse_with(&plan.render(), options);
        assert_eq!(again.tasks, plan.tasks);
    }
});
