//! Tick and wall-clock helpers.
//!
//! The scheduler counts ticks; timing gates compare wall-clock instants.

use chrono::{DateTime, Duration, Utc};

/// Nominal server tick rate.
pub const TICKS_PER_SECOND: u32 = 20;

/// Highest full-automatic rate, whether configured or set by a hook.
pub const MAX_SHOTS_PER_SECOND: u32 = 120;

/// Milliseconds covered by one tick at the nominal rate.
pub const MILLIS_PER_TICK: i64 = 50;

/// Convert a tick count from configuration into milliseconds.
pub fn ticks_to_millis(ticks: u32) -> i64 {
    i64::from(ticks) * MILLIS_PER_TICK
}

/// Whether at least `millis` milliseconds passed since `since`.
///
/// `None` means the event never happened, which always passes. The
/// comparison is inclusive: exactly `millis` elapsed counts as passed.
pub fn has_millis_passed(since: Option<DateTime<Utc>>, now: DateTime<Utc>, millis: i64) -> bool {
    match since {
        None => true,
        Some(instant) => now.signed_duration_since(instant) >= Duration::milliseconds(millis),
    }
}
