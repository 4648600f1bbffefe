//! Shared primitive types used across the entire scoring engine.

/// Milliseconds since the unix epoch, UTC. The only time representation
/// used past ingestion.
pub type EpochMillis = i64;

/// A platform profile identifier.
pub type ProfileId = String;

/// An opaque platform metric identifier (e.g. "VMtmgm").
pub type MetricId = String;

pub const DAY_MILLIS: EpochMillis = 24 * 60 * 60 * 1000;

/// Recency in days reported when an event kind was never observed.
pub const NEVER_DAYS: i64 = 999;

/// Length of the current engagement window and of the trend baseline.
pub const WINDOW_DAYS: i64 = 30;

/// Whole days elapsed between `at` and `now`, or `NEVER_DAYS` when `at` is
/// absent. Timestamps in the future count as zero days.
pub fn days_since(at: Option<EpochMillis>, now: EpochMillis) -> i64 {
    match at {
        Some(ts) => (now.saturating_sub(ts) / DAY_MILLIS).max(0),
        None => NEVER_DAYS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_since_floors_partial_days() {
        let now = 100 * DAY_MILLIS;
        assert_eq!(days_since(Some(now - DAY_MILLIS - 1), now), 1);
        assert_eq!(days_since(Some(now - DAY_MILLIS + 1), now), 0);
    }

    #[test]
    fn days_since_missing_is_never() {
        assert_eq!(days_since(None, 0), NEVER_DAYS);
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        assert_eq!(days_since(Some(5 * DAY_MILLIS), DAY_MILLIS), 0);
    }
}
