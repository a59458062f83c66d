//! Calendar-month periods

use crate::error::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, stored as the first day of that month.
///
/// Measurements are reported once per entity per month, so a period never
/// carries a day-of-month of its own. Any date inside the month maps to the
/// same period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period(NaiveDate);

impl Period {
    /// Create a period from a year and a 1-based month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| Error::InvalidPeriod(format!("{year}-{month:02}")))
    }

    /// The period containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Parse `YYYY-MM`, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS[ UTC]`.
    ///
    /// Anything after the date part is ignored, which covers the timestamp
    /// strings the warehouse cache writes for its `month` column.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = if s.len() >= 10 {
            s.get(..10)
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        } else {
            NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
        };
        parsed
            .map(Self::from_date)
            .ok_or_else(|| Error::InvalidPeriod(s.to_string()))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First day of the month
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Shift by a whole number of months (negative moves backwards)
    pub fn offset_months(self, months: i32) -> Result<Self> {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted.map(Self).ok_or_else(|| {
            Error::InvalidPeriod(format!("{self} offset by {months} months is out of range"))
        })
    }

    /// Number of whole months from `self` to `later` (negative if `later` is earlier)
    pub fn months_until(&self, later: &Period) -> i32 {
        (later.year() - self.year()) * 12 + later.month() as i32 - self.month() as i32
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for Period {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let expected = Period::new(2020, 3).unwrap();
        assert_eq!(Period::parse("2020-03").unwrap(), expected);
        assert_eq!(Period::parse("2020-03-01").unwrap(), expected);
        assert_eq!(Period::parse("2020-03-17").unwrap(), expected);
        assert_eq!(Period::parse("2020-03-01 00:00:00 UTC").unwrap(), expected);
        assert_eq!(" 2020-03-01 ".parse::<Period>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Period::parse("March 2020"), Err(Error::InvalidPeriod(_))));
        assert!(Period::parse("2020-13").is_err());
        assert!(Period::parse("").is_err());
        assert!(Period::new(2020, 0).is_err());
    }

    #[test]
    fn test_offset_months() {
        let jan = Period::new(2020, 1).unwrap();
        assert_eq!(jan.offset_months(2).unwrap(), Period::new(2020, 3).unwrap());
        assert_eq!(jan.offset_months(12).unwrap(), Period::new(2021, 1).unwrap());
        assert_eq!(jan.offset_months(-1).unwrap(), Period::new(2019, 12).unwrap());
        assert_eq!(jan.offset_months(0).unwrap(), jan);
    }

    #[test]
    fn test_months_until() {
        let a = Period::new(2019, 11).unwrap();
        let b = Period::new(2020, 2).unwrap();
        assert_eq!(a.months_until(&b), 3);
        assert_eq!(b.months_until(&a), -3);
    }

    #[test]
    fn test_display_and_ordering() {
        let a = Period::new(2019, 12).unwrap();
        let b = Period::new(2020, 1).unwrap();
        assert!(a < b);
        assert_eq!(b.to_string(), "2020-01-01");
    }
}
