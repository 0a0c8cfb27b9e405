//! Date and time normalization shared by the extractor and the encoder.
//!
//! Schedules print dates as `Sep 11` (no year) and times as `11:30 AM` or
//! `8 PM`. These helpers turn those tokens into chrono values.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::Result;

/// Parser for the loosely formatted date and time tokens found in schedules
#[derive(Debug, Clone)]
pub struct ScheduleParser {
    year_regex: Regex,
    time_regex: Regex,
}

impl ScheduleParser {
    /// Compile the patterns used for year and time-token parsing
    pub fn new() -> Result<Self> {
        let year_regex = Regex::new(r"(\d{4})")?;
        let time_regex =
            Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\.?$")?;

        Ok(Self {
            year_regex,
            time_regex,
        })
    }

    /// First four-digit run in `text`, read as a year
    #[must_use]
    pub fn find_year(&self, text: &str) -> Option<i32> {
        self.year_regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Parse a `h:mm AM/PM` or `h AM/PM` token into a time of day.
    ///
    /// Matching is case-insensitive and tolerates `a.m.`/`p.m.` and a missing
    /// space before the meridiem. Returns `None` for anything else.
    #[must_use]
    pub fn parse_time(&self, token: &str) -> Option<NaiveTime> {
        let caps = self.time_regex.captures(token.trim())?;

        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if !(1..=12).contains(&hour) {
            return None;
        }

        let is_pm = caps.get(3)?.as_str().eq_ignore_ascii_case("p");
        let hour24 = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };

        NaiveTime::from_hms_opt(hour24, minute, 0)
    }
}

/// Parse a printed `<abbreviated month> <day>` date in the given year.
///
/// Newlines from multi-line layout are treated as spaces.
#[must_use]
pub fn parse_shift_date(text: &str, year: i32) -> Option<NaiveDate> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(&format!("{cleaned} {year}"), "%b %d %Y").ok()
}

/// Current year on the local clock
#[must_use]
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Join a date and a time of day into a wall-clock timestamp
#[must_use]
pub fn combine(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}
