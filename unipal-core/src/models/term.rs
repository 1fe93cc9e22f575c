//! Academic term tokens.
//!
//! The backend keys timetables by a short term token: `{year}S` for the
//! spring term, `{year}F` for the autumn term. Term boundaries follow the
//! university calendar, not the calendar year — an autumn term runs into
//! January and February of the following year.

use chrono::{Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds east of UTC for Japan Standard Time.
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Half of the academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    /// Spring term: Feb 20 through Aug 31.
    Spring,
    /// Autumn term: Sep 1 through Feb 19 of the following year.
    Autumn,
}

/// An academic term, e.g. `2025S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Academic year the term belongs to.
    pub year: i32,
    /// Which half of the year.
    pub semester: Semester,
}

impl Term {
    /// Returns the term containing the given date.
    ///
    /// Spring spans Feb 20 to Aug 31. Anything else is autumn, with the
    /// academic year rolled back by one when the date falls in January or
    /// the first part of February.
    pub fn for_date(date: NaiveDate) -> Self {
        let (year, month, day) = (date.year(), date.month(), date.day());

        if (month == 2 && day >= 20) || (3..=8).contains(&month) {
            Term {
                year,
                semester: Semester::Spring,
            }
        } else {
            let academic_year = if month >= 9 { year } else { year - 1 };
            Term {
                year: academic_year,
                semester: Semester::Autumn,
            }
        }
    }

    /// Returns the current term, evaluated in JST.
    pub fn current() -> Self {
        let jst = FixedOffset::east_opt(JST_OFFSET_SECS).expect("valid fixed offset");
        Self::for_date(Utc::now().with_timezone(&jst).date_naive())
    }

    /// Returns the short token, e.g. `"2025S"`.
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.semester {
            Semester::Spring => "S",
            Semester::Autumn => "F",
        };
        write!(f, "{}{}", self.year, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_spring_autumn_boundary_in_february() {
        assert_eq!(Term::for_date(date(2025, 2, 19)).token(), "2024F");
        assert_eq!(Term::for_date(date(2025, 2, 20)).token(), "2025S");
    }

    #[test]
    fn test_autumn_starts_in_september() {
        assert_eq!(Term::for_date(date(2025, 8, 31)).token(), "2025S");
        assert_eq!(Term::for_date(date(2025, 9, 1)).token(), "2025F");
    }

    #[test]
    fn test_january_belongs_to_previous_academic_year() {
        assert_eq!(Term::for_date(date(2026, 1, 15)).token(), "2025F");
    }

    #[test]
    fn test_midsummer_is_spring_term() {
        assert_eq!(Term::for_date(date(2025, 6, 1)).token(), "2025S");
    }
}
