//! Day-type classification for service days.
//!
//! The classifier is a pure function over an explicit holiday table. Every
//! caller classifies a date the same way, which matters because the day type
//! selects the route/line template the backend loads for that date.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::DayType;

/// External holiday calendar keyed by date.
///
/// Holiday overrides come from the depot's holiday table; the value is the
/// holiday's display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayTable(HashMap<NaiveDate, String>);

impl HolidayTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.0.insert(date, name.into());
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains_key(&date)
    }

    /// Holiday name for a date, if listed.
    pub fn name_of(&self, date: NaiveDate) -> Option<&str> {
        self.0.get(&date).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NaiveDate, String)> for HolidayTable {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Classify a calendar date into its schedule variant.
///
/// A listed holiday wins regardless of the weekday; otherwise Saturday and
/// Sunday map to their own variants and everything else is a workday.
pub fn classify(date: NaiveDate, holidays: &HolidayTable) -> DayType {
    if holidays.contains(date) {
        return DayType::Holiday;
    }
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Workday,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_workday() {
        // 2024-03-13 is a Wednesday
        assert_eq!(
            classify(date(2024, 3, 13), &HolidayTable::new()),
            DayType::Workday
        );
    }

    #[test]
    fn test_saturday_and_sunday() {
        assert_eq!(
            classify(date(2024, 3, 16), &HolidayTable::new()),
            DayType::Saturday
        );
        assert_eq!(
            classify(date(2024, 3, 17), &HolidayTable::new()),
            DayType::Sunday
        );
    }

    #[test]
    fn test_holiday_overrides_weekday() {
        let mut holidays = HolidayTable::new();
        holidays.insert(date(2024, 3, 8), "International Women's Day");
        // A Friday
        assert_eq!(classify(date(2024, 3, 8), &holidays), DayType::Holiday);
    }

    #[test]
    fn test_holiday_overrides_saturday() {
        let mut holidays = HolidayTable::new();
        // 2024-05-04 is a Saturday
        holidays.insert(date(2024, 5, 4), "Extended May holidays");
        assert_eq!(classify(date(2024, 5, 4), &holidays), DayType::Holiday);
    }

    #[test]
    fn test_holiday_name_lookup() {
        let mut holidays = HolidayTable::new();
        holidays.insert(date(2024, 1, 1), "New Year");
        assert_eq!(holidays.name_of(date(2024, 1, 1)), Some("New Year"));
        assert_eq!(holidays.name_of(date(2024, 1, 2)), None);
    }

    proptest! {
        #[test]
        fn prop_classification_is_idempotent(days in 0u32..20000) {
            let d = NaiveDate::from_num_days_from_ce_opt(730_000 + days as i32).unwrap();
            let mut holidays = HolidayTable::new();
            // List every fifth date so both branches get exercised.
            if days % 5 == 0 {
                holidays.insert(d, "holiday");
            }
            let first = classify(d, &holidays);
            let second = classify(d, &holidays);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_listed_dates_always_holiday(days in 0u32..20000) {
            let d = NaiveDate::from_num_days_from_ce_opt(730_000 + days as i32).unwrap();
            let mut holidays = HolidayTable::new();
            holidays.insert(d, "holiday");
            prop_assert_eq!(classify(d, &holidays), DayType::Holiday);
        }
    }
}
