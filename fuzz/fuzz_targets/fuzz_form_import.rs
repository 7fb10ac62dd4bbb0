#![no_main]

use formloom_layout::FormState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(state) = FormState::from_json(text) else {
        return;
    };

    // Anything accepted must be well formed and survive a round trip.
    for page in state.pages() {
        page.tree.check_invariants().expect("imported page is well formed");
    }
    let mut ids = state.all_ids();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total, "duplicate id accepted");

    let json = state.to_json().expect("export");
    let again = FormState::from_json(&json).expect("re-import of own export");
    assert_eq!(again, state);
});
