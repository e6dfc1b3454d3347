#![no_main]
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let now = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("fixed date");
    let _ = trainsign_core::parse_timestamp(data);
    let times: Vec<&str> = data.split('\n').collect();
    if let Ok(offsets) = trainsign_core::filter_upcoming(now, &times) {
        let triple = trainsign_core::to_triple(&offsets);
        assert!(offsets.iter().all(|o| *o >= 0));
        let _ = triple.to_string();
    }
});
