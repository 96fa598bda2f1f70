//! Sunday–Saturday week boundaries.

use chrono::{Datelike, Duration, NaiveDate};
use wellness_store::DateRange;

/// The week being scored and the week it is compared against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeekWindow {
    pub current: DateRange,
    pub previous: DateRange,
}

impl WeekWindow {
    /// Window for the week containing `reference`: the Sunday on or before
    /// it through the following Saturday, plus the same span 7 days earlier.
    pub fn containing(reference: NaiveDate) -> Self {
        let current = week_containing(reference);
        let previous = DateRange::new(
            current.start - Duration::days(7),
            current.end - Duration::days(7),
        );
        Self { current, previous }
    }
}

pub fn week_containing(date: NaiveDate) -> DateRange {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
    DateRange::new(start, start + Duration::days(6))
}
