//! Time windows over normalized timestamps.
//!
//! Windows are inclusive at both ends: `start <= t <= end`.
//! Items without a usable timestamp fall outside every window.

use crate::{
    event::Event,
    types::{EpochMillis, DAY_MILLIS},
};
use serde::{Deserialize, Serialize};

/// Anything that carries a normalized timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> Option<EpochMillis>;
}

impl Timestamped for Event {
    fn timestamp(&self) -> Option<EpochMillis> {
        self.timestamp
    }
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn timestamp(&self) -> Option<EpochMillis> {
        (**self).timestamp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: EpochMillis,
    pub end:   EpochMillis,
}

impl TimeWindow {
    pub fn new(start: EpochMillis, end: EpochMillis) -> Self {
        Self { start, end }
    }

    /// `[now - days, now]`.
    pub fn trailing_days(now: EpochMillis, days: i64) -> Self {
        Self {
            start: now.saturating_sub(days.saturating_mul(DAY_MILLIS)),
            end:   now,
        }
    }

    /// Unbounded window; still excludes items without a timestamp.
    pub fn all_time() -> Self {
        Self { start: EpochMillis::MIN, end: EpochMillis::MAX }
    }

    /// The adjacent window of equal length that ends 1 ms before this one
    /// starts. The two never share an instant.
    pub fn preceding(&self) -> Self {
        let len = self.end.saturating_sub(self.start);
        let end = self.start.saturating_sub(1);
        Self { start: self.start.saturating_sub(len), end }
    }

    pub fn contains(&self, ts: EpochMillis) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Items inside the window, in their original order.
    pub fn filter<'a, T: Timestamped>(&self, items: &'a [T]) -> Vec<&'a T> {
        items
            .iter()
            .filter(|item| item.timestamp().is_some_and(|ts| self.contains(ts)))
            .collect()
    }
}
