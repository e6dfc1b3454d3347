//! Arrival arithmetic: timestamp strings to signed minute offsets.
//!
//! Timestamps are interpreted naively. A UTC offset suffix is parsed and then
//! dropped; the wall-clock fields are kept as written. The sign's clock and
//! the feed both speak local New York time, so converting would shift every
//! arrival by the offset. If the feed ever starts emitting UTC this is the
//! place that has to change.
//!
//! Rounding is to the nearest minute with ties going to the even minute
//! (30 s -> 0, 90 s -> 2, -30 s -> 0).

use chrono::{DateTime, NaiveDateTime};

use crate::error::SignError;

/// Signed whole minutes between an arrival and "now". Negative means departed.
pub type ArrivalOffset = i64;

const MICROS_PER_MINUTE: i64 = 60 * 1_000_000;

/// Formats tried after RFC 3339. `%.f` accepts a missing fraction.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse an extended ISO-8601 timestamp, discarding any UTC offset.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, SignError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SignError::parse(s, "empty timestamp"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.naive_local());
        }
    }
    let mut last_err = None;
    for fmt in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(trimmed, fmt) {
            Ok(dt) => return Ok(dt),
            Err(e) => last_err = Some(e),
        }
    }
    Err(SignError::parse(
        s,
        last_err.map_or_else(|| "unrecognized format".to_string(), |e| e.to_string()),
    ))
}

/// Minutes from `now` until `arrival`, rounded half to even.
pub fn minutes_until(now: NaiveDateTime, arrival: &str) -> Result<ArrivalOffset, SignError> {
    let at = parse_timestamp(arrival)?;
    let delta = at.signed_duration_since(now);
    let micros = delta
        .num_microseconds()
        .ok_or_else(|| SignError::parse(arrival, "timestamp too far from now"))?;
    Ok(div_round_half_even(micros, MICROS_PER_MINUTE))
}

/// Integer division rounding to nearest, ties to even. `den` must be > 0.
#[inline]
fn div_round_half_even(num: i64, den: i64) -> i64 {
    debug_assert!(den > 0);
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    let twice = r.saturating_mul(2);
    if twice > den || (twice == den && q % 2 != 0) {
        q + 1
    } else {
        q
    }
}
