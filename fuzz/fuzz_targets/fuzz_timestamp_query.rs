//! Fuzz target: `/setTime` query handling
//!
//! Feeds arbitrary query strings through the parser and, when a value comes
//! out, into the civil clock, verifying:
//! - No panics under arbitrary UTF-8 input
//! - Out-of-range values are rejected without touching the clock
//! - Accepted values always render to a canonical timestamp
//!
//! cargo fuzz run fuzz_timestamp_query

#![no_main]

use flowlogger::app::api::parse_timestamp_query;
use flowlogger::civil_time::{CENTRAL_EUROPEAN, CivilClock, MAX_LOCAL_EPOCH};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(local) = parse_timestamp_query(Some(query)) else {
        return;
    };

    let mut clock = CivilClock::new(CENTRAL_EUROPEAN);
    let before = clock.now_utc(0);
    match clock.set_from_local(local, 0) {
        Ok(_) => {
            assert!((0..=MAX_LOCAL_EPOCH).contains(&local));
            let ts = clock.timestamp(0);
            // "DD.MM.YYYY HH:MM:SS CET" or "... CEST"
            assert!(ts.len() == 23 || ts.len() == 24, "bad timestamp {}", ts);
        }
        Err(_) => {
            assert!(!(0..=MAX_LOCAL_EPOCH).contains(&local));
            assert_eq!(clock.now_utc(0), before);
        }
    }
});
