//! Entry-time alignment against 5-minute candle boundaries.
//!
//! Binary-option entries only make sense at the open of a fresh candle,
//! so every generated signal is pinned to a future M5 boundary with
//! enough lead time for the subscriber to react. All functions are pure
//! over an epoch-seconds clock so scheduling is testable without
//! touching wall time.

/// Candle bucket width in seconds (M5).
pub const BUCKET_SECONDS: i64 = 300;

/// Minimum seconds between signal emission and the entry boundary.
pub const MIN_LEAD_SECONDS: i64 = 120;

/// The next M5 boundary strictly after `now`.
///
/// A `now` sitting exactly on a boundary rolls to the following one;
/// an entry "right now" is already too late to act on.
pub fn next_boundary(now: i64) -> i64 {
    let remainder = now.rem_euclid(BUCKET_SECONDS);
    if remainder == 0 {
        now + BUCKET_SECONDS
    } else {
        now + (BUCKET_SECONDS - remainder)
    }
}

/// The entry boundary for a signal generated at `now`.
///
/// Skips to the following bucket when the nearest boundary is less than
/// [`MIN_LEAD_SECONDS`] away; a gap of exactly the minimum lead is
/// acceptable.
pub fn entry_time(now: i64) -> i64 {
    let boundary = next_boundary(now);
    if boundary - now < MIN_LEAD_SECONDS {
        boundary + BUCKET_SECONDS
    } else {
        boundary
    }
}

/// When the signal message should reach subscribers: two minutes before
/// entry.
pub fn send_time(entry: i64) -> i64 {
    entry - MIN_LEAD_SECONDS
}

/// Option expiry: one full candle after entry.
pub fn expiry_time(entry: i64) -> i64 {
    entry + BUCKET_SECONDS
}
