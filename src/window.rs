/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Publication windows
//!
//! `published` is stored as an ISO-8601 string, so date filters are inclusive
//! string ranges. Bounds are rendered from a parsed date, which keeps them
//! zero-padded and therefore ordered the same way as the stored timestamps.

use crate::error::InputError;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive `[start, end]` range of `published` timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    /// First day covered, used when reporting on the window
    pub first_day: NaiveDate,
    pub start: String,
    pub end: String,
}

impl DayWindow {
    /// Window covering one calendar day given as `YYYY-MM-DD`
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let trimmed = input.trim();
        // chrono also accepts unpadded fields, inner spaces and signed years
        if !has_date_shape(trimmed) {
            return Err(InputError::InvalidDate(input.to_string()));
        }

        let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map_err(|_| InputError::InvalidDate(input.to_string()))?;
        Ok(Self::between(date, date))
    }

    /// Window covering a whole calendar year
    pub fn year(year: i32) -> Self {
        // Every year has a January 1st and a December 31st
        let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();
        let last = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or_default();
        Self::between(first, last)
    }

    fn between(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            first_day: first,
            start: format!("{}T00:00:00Z", first.format(DATE_FORMAT)),
            end: format!("{}T23:59:59Z", last.format(DATE_FORMAT)),
        }
    }

    /// The first day as `YYYY-MM-DD`
    pub fn day_label(&self) -> String {
        self.first_day.format(DATE_FORMAT).to_string()
    }
}

/// Exactly four digits, a dash, two digits, a dash, two digits
fn has_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_window() {
        let window = DayWindow::parse("2015-09-21").unwrap();

        assert_eq!(window.start, "2015-09-21T00:00:00Z");
        assert_eq!(window.end, "2015-09-21T23:59:59Z");
        assert_eq!(window.day_label(), "2015-09-21");
    }

    #[test]
    fn test_invalid_dates() {
        let inputs = [
            "2015/01/01",
            "2015-13-01",
            "2015-02-30",
            "2015-1-1",
            "2015- 1-01",
            "2015-01- 1",
            "+015-01-01",
            "2015-1-011",
            "２015-01-01",
            "yesterday",
            "",
        ];
        for input in inputs {
            assert_eq!(
                DayWindow::parse(input),
                Err(InputError::InvalidDate(input.to_string())),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_year_window() {
        let window = DayWindow::year(2015);

        assert_eq!(window.start, "2015-01-01T00:00:00Z");
        assert_eq!(window.end, "2015-12-31T23:59:59Z");
        assert_eq!(window.day_label(), "2015-01-01");

        assert!("2014-12-31T23:59:59Z" < window.start.as_str());
        assert!("2015-12-31T23:59:59Z" <= window.end.as_str());
        assert!("2016-01-01T00:00:00Z" > window.end.as_str());
    }
}
