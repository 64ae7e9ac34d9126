// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Time Windows
//!
//! Wall-clock handling for the allocator. Every instant is a timezone-free
//! [`NaiveDateTime`] and every span is a [`TimeWindow`], a non-empty
//! half-open `[start, end)` window built on [`Interval`].
//!
//! Textual date-times use the `d/MM/yyyy H:mm` layout throughout, for
//! example `1/07/2021 9:05`. Seconds are never written.

use crate::primitives::Interval;
use chrono::NaiveDateTime;
use std::fmt::Display;

/// Pattern accepted by [`parse_date_time`]. Day and hour may have one or two digits.
pub const DATE_TIME_PARSE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Pattern produced by [`format_date_time`].
pub const DATE_TIME_DISPLAY_FORMAT: &str = "%-d/%m/%Y %-H:%M";

/// Raised when a date-time string does not follow `d/MM/yyyy H:mm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    input: String,
    reason: String,
}

impl DateTimeParseError {
    #[inline]
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for DateTimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid date-time '{}' (expected d/MM/yyyy H:mm): {}",
            self.input, self.reason
        )
    }
}

impl std::error::Error for DateTimeParseError {}

/// Parses a `d/MM/yyyy H:mm` string.
///
/// ```
/// use shift_alloc_core::time::parse_date_time;
///
/// let t = parse_date_time("1/07/2021 9:05").unwrap();
/// assert_eq!(t.to_string(), "2021-07-01 09:05:00");
/// assert!(parse_date_time("2021-07-01 09:05").is_err());
/// ```
pub fn parse_date_time(input: &str) -> Result<NaiveDateTime, DateTimeParseError> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, DATE_TIME_PARSE_FORMAT)
        .map_err(|e| DateTimeParseError::new(trimmed, e.to_string()))
}

/// Formats an instant as `d/MM/yyyy H:mm`.
///
/// ```
/// use chrono::NaiveDate;
/// use shift_alloc_core::time::format_date_time;
///
/// let t = NaiveDate::from_ymd_opt(2021, 7, 1).unwrap().and_hms_opt(9, 5, 0).unwrap();
/// assert_eq!(format_date_time(t), "1/07/2021 9:05");
/// ```
#[inline]
pub fn format_date_time(t: NaiveDateTime) -> String {
    t.format(DATE_TIME_DISPLAY_FORMAT).to_string()
}

/// Raised when a window would not satisfy `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyTimeWindowError {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl EmptyTimeWindowError {
    #[inline]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

impl Display for EmptyTimeWindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Start {} is not before end {}",
            format_date_time(self.start),
            format_date_time(self.end)
        )
    }
}

impl std::error::Error for EmptyTimeWindowError {}

/// A non-empty half-open window `[start, end)` of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeWindow {
    // Field order gives the derived ordering: by start, then by end.
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a window.
    ///
    /// # Panics
    ///
    /// Panics if `start >= end`. Use [`TimeWindow::try_new`] for untrusted input.
    #[inline]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        assert!(
            start < end,
            "TimeWindow::new: start {} must be before end {}",
            start,
            end
        );
        Self { start, end }
    }

    #[inline]
    pub fn try_new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, EmptyTimeWindowError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(EmptyTimeWindowError::new(start, end))
        }
    }

    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    #[inline]
    pub fn as_interval(&self) -> Interval<NaiveDateTime> {
        Interval::new(self.start, self.end)
    }

    /// Windows overlap iff `a.start < b.end && b.start < a.end`.
    #[inline]
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.as_interval().intersects(&other.as_interval())
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            format_date_time(self.start),
            format_date_time(self.end)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_accepts_single_and_double_digit_fields() {
        assert_eq!(parse_date_time("9/07/2021 8:30").unwrap(), at(9, 8, 30));
        assert_eq!(parse_date_time("09/07/2021 08:30").unwrap(), at(9, 8, 30));
        assert_eq!(parse_date_time(" 11/07/2021 17:00 ").unwrap(), at(11, 17, 0));
    }

    #[test]
    fn test_parse_rejects_other_layouts() {
        let err = parse_date_time("2021-07-09T08:30").unwrap_err();
        assert_eq!(err.input(), "2021-07-09T08:30");
        assert!(parse_date_time("").is_err());
        assert!(parse_date_time("31/02/2021 10:00").is_err());
    }

    #[test]
    fn test_format_drops_leading_zeroes_on_day_and_hour() {
        assert_eq!(format_date_time(at(9, 8, 5)), "9/07/2021 8:05");
        assert_eq!(format_date_time(at(14, 17, 0)), "14/07/2021 17:00");
    }

    #[test]
    fn test_try_new_rejects_empty_and_inverted_windows() {
        assert!(TimeWindow::try_new(at(1, 10, 0), at(1, 10, 0)).is_err());
        let err = TimeWindow::try_new(at(1, 11, 0), at(1, 10, 0)).unwrap_err();
        assert_eq!(err.start(), at(1, 11, 0));
        assert!(TimeWindow::try_new(at(1, 10, 0), at(1, 10, 1)).is_ok());
    }

    #[test]
    #[should_panic]
    fn test_new_panics_on_empty_window() {
        let _ = TimeWindow::new(at(1, 10, 0), at(1, 10, 0));
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = TimeWindow::new(at(1, 9, 0), at(1, 12, 0));
        let b = TimeWindow::new(at(1, 12, 0), at(1, 13, 0));
        let c = TimeWindow::new(at(1, 11, 59), at(1, 13, 0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_windows_order_by_start_then_end() {
        let mut v = vec![
            TimeWindow::new(at(2, 9, 0), at(2, 10, 0)),
            TimeWindow::new(at(1, 9, 0), at(1, 12, 0)),
            TimeWindow::new(at(1, 9, 0), at(1, 10, 0)),
        ];
        v.sort();
        assert_eq!(v[0].end(), at(1, 10, 0));
        assert_eq!(v[1].end(), at(1, 12, 0));
        assert_eq!(v[2].start(), at(2, 9, 0));
    }
}
