//! Calendar helpers for the Monday–Friday commuter service.
//!
//! Dates are plain calendar dates (`NaiveDate`). Form input is always read
//! component by component, never through an instant, so a date picked late in
//! the evening in a zone ahead of UTC stays on the day the rider picked.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::error::{AppError, AppResult};

pub const NOT_A_WORKING_DAY: &str = "Service is only available Monday to Friday for working commuters";

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First working day strictly after `from`.
pub fn next_working_day(from: NaiveDate) -> NaiveDate {
    let mut day = from;
    loop {
        day = day.succ_opt().unwrap_or(NaiveDate::MAX);
        if is_working_day(day) || day == NaiveDate::MAX {
            return day;
        }
    }
}

/// `YYYY-MM-DD` from the date's own calendar fields.
pub fn format_date_for_input(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Inverse of [`format_date_for_input`].
pub fn date_from_string(value: &str) -> AppResult<NaiveDate> {
    let invalid = || AppError::Validation(format!("Invalid date: {}", value));

    let mut parts = value.trim().splitn(3, '-');
    let mut next = || -> AppResult<u32> {
        parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)
    };
    let (year, month, day) = (next()?, next()?, next()?);

    let year = i32::try_from(year).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// All working days in `start..=end`, ascending. Empty when `start > end`.
pub fn working_days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_working_day(*day))
        .collect()
}

/// Date `weeks` whole weeks after `start`.
pub fn add_weeks(start: NaiveDate, weeks: u32) -> NaiveDate {
    start
        .checked_add_days(Days::new(u64::from(weeks) * 7))
        .unwrap_or(NaiveDate::MAX)
}

/// Banner shown above the search form.
pub fn working_day_message(today: NaiveDate) -> &'static str {
    match today.weekday() {
        Weekday::Sun => "Service resumes Monday. Book your trip for the week ahead!",
        Weekday::Sat => "Weekend break! Service resumes Monday for working commuters.",
        _ => "Book your commute for working days (Monday - Friday).",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_working_days_are_monday_to_friday() {
        // 2024-12-16 is a Monday
        let monday = date(2024, 12, 16);
        for offset in 0..7u64 {
            let day = monday + Days::new(offset);
            assert_eq!(is_working_day(day), offset < 5, "{}", day);
        }
    }

    #[test]
    fn test_next_working_day_skips_weekend() {
        let friday = date(2024, 12, 20);
        assert_eq!(next_working_day(friday), date(2024, 12, 23));

        let saturday = date(2024, 12, 21);
        assert_eq!(next_working_day(saturday), date(2024, 12, 23));

        let tuesday = date(2024, 12, 17);
        assert_eq!(next_working_day(tuesday), date(2024, 12, 18));
    }

    #[test]
    fn test_next_working_day_has_no_gap() {
        let start = date(2024, 1, 1);
        for offset in 0..60u64 {
            let from = start + Days::new(offset);
            let next = next_working_day(from);
            assert!(next > from);
            assert!(is_working_day(next));
            let between = from.iter_days().skip(1).take_while(|d| *d < next);
            assert_eq!(between.filter(|d| is_working_day(*d)).count(), 0);
        }
    }

    #[test]
    fn test_date_string_round_trip() {
        for s in ["2024-12-20", "2025-01-01", "2024-02-29", "0999-03-07"] {
            assert_eq!(format_date_for_input(date_from_string(s).unwrap()), s);
        }
    }

    #[test]
    fn test_date_from_string_rejects_garbage() {
        assert!(date_from_string("").is_err());
        assert!(date_from_string("2024-13-01").is_err());
        assert!(date_from_string("2023-02-29").is_err());
        assert!(date_from_string("20-ab-01").is_err());
    }

    #[test]
    fn test_working_days_in_range() {
        // Friday through the following Tuesday
        let days = working_days_in_range(date(2024, 12, 20), date(2024, 12, 24));
        assert_eq!(days, vec![date(2024, 12, 20), date(2024, 12, 23), date(2024, 12, 24)]);

        assert!(working_days_in_range(date(2024, 12, 24), date(2024, 12, 20)).is_empty());
    }

    #[test]
    fn test_working_day_message() {
        assert!(working_day_message(date(2024, 12, 22)).starts_with("Service resumes Monday"));
        assert!(working_day_message(date(2024, 12, 21)).starts_with("Weekend break"));
        assert!(working_day_message(date(2024, 12, 18)).starts_with("Book your commute"));
    }
}
