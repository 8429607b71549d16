//! Trading-calendar date adjustment.
//!
//! Rolls a date off a weekend onto a business day. The forward and
//! backward tables are intentionally different shapes: rolling forward
//! seeks the *next* business day (an expiry must land after the
//! weekend), rolling backward seeks the *most recent* one (a start
//! date must land before it). Do not unify them.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

/// Which adjacent business day to roll onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Roll {
    Forward,
    Backward,
}

/// If `date` falls on a weekend, shift it onto the nearest business
/// day in the given direction. Weekdays pass through unchanged.
pub fn roll_off_weekend(date: DateTime<Utc>, roll: Roll) -> DateTime<Utc> {
    match (date.weekday(), roll) {
        (Weekday::Sat, Roll::Forward) => date + Duration::days(2),
        (Weekday::Sun, Roll::Forward) => date + Duration::days(1),
        (Weekday::Sat, Roll::Backward) => date - Duration::days(1),
        (Weekday::Sun, Roll::Backward) => date - Duration::days(2),
        _ => date,
    }
}
