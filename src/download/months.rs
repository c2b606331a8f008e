//! `YYYY-MM` reference months

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// First month published by the TLC
pub const FIRST_AVAILABLE_MONTH: Month = Month {
    year: 2009,
    month: 1,
};

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following month
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidMonth {
            value: value.to_string(),
        };

        let caps = MONTH_RE.captures(value.trim()).ok_or_else(invalid)?;
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let month: u32 = caps[2].parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(Self { year, month })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Every month from `start` to `end`, inclusive
///
/// Fails before producing anything when either bound is malformed or
/// `start` is after `end`.
pub fn month_range(start: &str, end: &str) -> Result<Vec<String>> {
    let first: Month = start.parse()?;
    let last: Month = end.parse()?;
    if first > last {
        return Err(Error::InvalidMonthRange {
            start: first.to_string(),
            end: last.to_string(),
        });
    }

    let mut months = Vec::new();
    let mut current = first;
    while current <= last {
        months.push(current.to_string());
        current = current.next();
    }
    Ok(months)
}

/// Resolve the months of a download run
///
/// - start and end: the inclusive range
/// - start only: that single month
/// - neither: full load from 2009-01 up to the month of `today`
pub fn resolve_months(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<Vec<String>> {
    match (start, end) {
        (Some(start), Some(end)) => month_range(start, end),
        (Some(start), None) => month_range(start, start),
        (None, None) => month_range(
            &FIRST_AVAILABLE_MONTH.to_string(),
            &Month::of(today).to_string(),
        ),
        (None, Some(_)) => Err(Error::missing_field("start_month")),
    }
}
