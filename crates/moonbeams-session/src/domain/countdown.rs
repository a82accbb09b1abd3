//! Countdown arithmetic.
//!
//! Remaining time is always recomputed from the absolute deadline, never
//! decremented, so late ticks cannot drift. The countdown is over exactly
//! when `now >= deadline`; before that, remaining seconds are floored.

use chrono::{DateTime, Utc};

/// Whole seconds left before `deadline`, or `None` once it has been
/// reached.
#[must_use]
pub fn remaining_seconds(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    if now >= deadline {
        return None;
    }
    Some((deadline - now).num_seconds())
}

/// Formats seconds as zero-padded `MM:SS`.
#[must_use]
pub fn format_remaining(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
