//! Narrative clock arithmetic and time-leap clamping.
//!
//! The narrative clock is a plain `NaiveDateTime`: story time has no time
//! zone. Deltas come from extraction as whole minutes.
//!
//! # Leap clamping
//!
//! Two characters each "sleeping eight hours" in the same narrative beat must
//! not be read as sixteen hours of sequential time. The clamp rule: when two
//! consecutive folded time deltas both exceed the configured threshold and
//! their messages are adjacent, the second delta is capped to the threshold.
//! The comparison uses the raw (pre-clamp) minutes of the previous delta, and
//! an absolute time reset breaks the adjacency chain.

use chrono::{Duration, NaiveDateTime};

/// The last folded time delta: `(message_id, raw advance_minutes)`.
///
/// Tracked by the projection fold and fed back into [`clamp_leap`].
pub type LastLeap = Option<(u32, i64)>;

/// Advance the clock by a number of minutes.
#[must_use]
pub fn advance(time: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    time + Duration::minutes(minutes)
}

/// Apply the leap-clamp policy to a time delta.
///
/// Returns the minutes to actually fold. `previous` is the last folded time
/// delta on the same path (raw minutes, pre-clamp); `message_id` is the
/// position of the current delta. Messages are adjacent when
/// `message_id <= previous_message + 1`.
#[must_use]
pub fn clamp_leap(
    previous: LastLeap,
    message_id: u32,
    advance_minutes: i64,
    threshold_minutes: i64,
) -> i64 {
    if advance_minutes <= threshold_minutes {
        return advance_minutes;
    }
    match previous {
        Some((prev_message, prev_minutes))
            if prev_minutes > threshold_minutes && message_id <= prev_message + 1 =>
        {
            threshold_minutes
        }
        _ => advance_minutes,
    }
}
