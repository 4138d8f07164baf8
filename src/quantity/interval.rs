use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Months, TimeZone, Utc};

/// Half-open UTC interval.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Utc>,

    /// Exclusive.
    pub end: DateTime<Utc>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The whole calendar month in UTC.
    ///
    /// # Panics
    ///
    /// On an out-of-range year or a month outside `1..=12`.
    pub fn utc_month(year: i32, month: u32) -> Self {
        let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap();
        let end = start.checked_add_months(Months::new(1)).unwrap();
        Self { start, end }
    }

    pub fn contains(self, other: DateTime<Utc>) -> bool {
        (self.start <= other) && (other < self.end)
    }
}
