use std::iter::FusedIterator;

use chrono::{Days, NaiveDate};

use crate::DATE_FORMAT;
use crate::error::AppError;

/// Inclusive range of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::InvalidRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a `YYYY-MM-DD` pair.
    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        let start = parse_date(start)
            .ok_or_else(|| AppError::InvalidDate(format!("invalid start date: {start:?}")))?;
        let end = parse_date(end)
            .ok_or_else(|| AppError::InvalidDate(format!("invalid end date: {end:?}")))?;
        let range = Self::new(start, end)?;

        tracing::info!(
            days = range.len(),
            start = %range.start.format(DATE_FORMAT),
            end = %range.end.format(DATE_FORMAT),
            "Date range resolved"
        );
        Ok(range)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both bounds included.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Always false: a valid range holds at least one day.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ascending iterator over every day. Each call starts over.
    pub fn iter(&self) -> DateIter {
        DateIter {
            next: Some(self.start),
            end: self.end,
        }
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.iter().collect()
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

impl IntoIterator for &DateRange {
    type Item = NaiveDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

/// Iterator returned by [`DateRange::iter`].
#[derive(Debug, Clone)]
pub struct DateIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = current.checked_add_days(Days::new(1));
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .filter(|d| *d <= self.end)
            .map_or(0, |d| (self.end - d).num_days() as usize + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateIter {}

impl FusedIterator for DateIter {}

/// Strict `YYYY-MM-DD` parsing: zero-padded fields, nothing before or after.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let well_formed = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
