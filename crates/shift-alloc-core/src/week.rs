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

//! # ISO Week Buckets
//!
//! Weekly shift limits are counted per ISO-8601 week. A span touches every
//! week from the ISO week of its start through the ISO week of its end,
//! inclusive, so a single shift may land in two buckets when it crosses a
//! week boundary.
//!
//! [`WeekCounts`] is the bucket table. It forms a group under addition:
//! subtracting a shift's table and adding it back restores the original,
//! counting missing keys as zero.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// An ISO week within an ISO week-based year.
///
/// Ordered by year, then week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    #[inline]
    pub const fn new(week: u32, year: i32) -> Self {
        Self { year, week }
    }

    /// The ISO week containing `date`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use shift_alloc_core::week::WeekKey;
    ///
    /// // 1 January 2021 is a Friday and still belongs to week 53 of 2020.
    /// let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    /// assert_eq!(WeekKey::of(d), WeekKey::new(53, 2020));
    /// ```
    #[inline]
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self::new(iso.week(), iso.year())
    }

    #[inline]
    pub const fn week(&self) -> u32 {
        self.week
    }

    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }
}

impl Display for WeekKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Number of ISO weeks in an ISO week-based year (52 or 53).
///
/// 28 December always falls in the last week of its ISO year.
#[inline]
pub fn iso_weeks_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 28)
        .map(|d| d.iso_week().week())
        .unwrap_or(52)
}

/// Signed shift counts keyed by ISO week.
///
/// Counts may go to zero or below while a table is being edited. Equality
/// treats a zero entry the same as a missing one.
#[derive(Debug, Clone, Default)]
pub struct WeekCounts {
    counts: BTreeMap<WeekKey, i64>,
}

impl WeekCounts {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets a span into the ISO weeks it touches, one count per week.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use shift_alloc_core::week::{WeekCounts, WeekKey};
    ///
    /// let d = |day, h| NaiveDate::from_ymd_opt(2021, 7, day).unwrap().and_hms_opt(h, 0, 0).unwrap();
    /// let counts = WeekCounts::for_span(d(10, 10), d(14, 10));
    /// assert_eq!(counts.get(WeekKey::new(27, 2021)), 1);
    /// assert_eq!(counts.get(WeekKey::new(28, 2021)), 1);
    /// assert_eq!(counts.len(), 2);
    /// ```
    pub fn for_span(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let first = WeekKey::of(start.date());
        let last = WeekKey::of(end.date());
        let mut counts = Self::new();
        for year in first.year()..=last.year() {
            let from = if year == first.year() { first.week() } else { 1 };
            let to = if year == last.year() {
                last.week()
            } else {
                iso_weeks_in_year(year)
            };
            for week in from..=to {
                counts.increment(WeekKey::new(week, year), 1);
            }
        }
        counts
    }

    #[inline]
    pub fn get(&self, key: WeekKey) -> i64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    #[inline]
    pub fn increment(&mut self, key: WeekKey, by: i64) {
        *self.counts.entry(key).or_insert(0) += by;
    }

    /// Number of stored buckets, zero entries included.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// `true` when every bucket is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&c| c == 0)
    }

    /// All stored buckets in key order, zero and negative entries included.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (WeekKey, i64)> + '_ {
        self.counts.iter().map(|(&k, &c)| (k, c))
    }

    /// Buckets with a strictly positive count.
    #[inline]
    pub fn iter_positive(&self) -> impl Iterator<Item = (WeekKey, i64)> + '_ {
        self.iter().filter(|&(_, c)| c > 0)
    }

    #[inline]
    pub fn total(&self) -> i64 {
        self.counts.values().sum()
    }

    /// Drops zero entries.
    pub fn prune(&mut self) {
        self.counts.retain(|_, c| *c != 0);
    }
}

impl PartialEq for WeekCounts {
    fn eq(&self, other: &Self) -> bool {
        let non_zero = |t: &'_ WeekCounts| {
            t.counts
                .iter()
                .filter(|&(_, &c)| c != 0)
                .map(|(&k, &c)| (k, c))
                .collect::<Vec<_>>()
        };
        non_zero(self) == non_zero(other)
    }
}

impl Eq for WeekCounts {}

impl AddAssign<&WeekCounts> for WeekCounts {
    fn add_assign(&mut self, rhs: &WeekCounts) {
        for (k, c) in rhs.iter() {
            self.increment(k, c);
        }
    }
}

impl SubAssign<&WeekCounts> for WeekCounts {
    fn sub_assign(&mut self, rhs: &WeekCounts) {
        for (k, c) in rhs.iter() {
            self.increment(k, -c);
        }
    }
}

impl Add<&WeekCounts> for &WeekCounts {
    type Output = WeekCounts;

    fn add(self, rhs: &WeekCounts) -> WeekCounts {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub<&WeekCounts> for &WeekCounts {
    type Output = WeekCounts;

    fn sub(self, rhs: &WeekCounts) -> WeekCounts {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl Neg for &WeekCounts {
    type Output = WeekCounts;

    fn neg(self) -> WeekCounts {
        WeekCounts {
            counts: self.counts.iter().map(|(&k, &c)| (k, -c)).collect(),
        }
    }
}

impl FromIterator<(WeekKey, i64)> for WeekCounts {
    fn from_iter<I: IntoIterator<Item = (WeekKey, i64)>>(iter: I) -> Self {
        let mut counts = WeekCounts::new();
        for (k, c) in iter {
            counts.increment(k, c);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_span_within_one_week_has_single_bucket() {
        let counts = WeekCounts::for_span(dt(2021, 7, 12, 9), dt(2021, 7, 12, 17));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(WeekKey::new(28, 2021)), 1);
    }

    #[test]
    fn test_span_across_sunday_midnight_hits_two_weeks() {
        let counts = WeekCounts::for_span(dt(2021, 7, 10, 10), dt(2021, 7, 14, 10));
        let expected: WeekCounts = [(WeekKey::new(27, 2021), 1), (WeekKey::new(28, 2021), 1)]
            .into_iter()
            .collect();
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_span_across_iso_year_boundary_covers_last_week_of_year() {
        // 2020 has 53 ISO weeks; 2020-12-28 is in week 53 and 2021-01-05 in week 1 of 2021.
        let counts = WeekCounts::for_span(dt(2020, 12, 28, 8), dt(2021, 1, 5, 8));
        assert_eq!(counts.get(WeekKey::new(53, 2020)), 1);
        assert_eq!(counts.get(WeekKey::new(1, 2021)), 1);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_span_over_several_weeks_counts_every_week_in_between() {
        // Monday of week 27 to Monday of week 30.
        let counts = WeekCounts::for_span(dt(2021, 7, 5, 9), dt(2021, 7, 26, 9));
        assert_eq!(counts.len(), 4);
        for week in 27..=30 {
            assert_eq!(counts.get(WeekKey::new(week, 2021)), 1);
        }
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_span_over_whole_week_years_counts_each_of_their_weeks() {
        // 2019-W51..W52, all 53 weeks of 2020, all 52 of 2021, 2022-W01..W02.
        let counts = WeekCounts::for_span(dt(2019, 12, 20, 9), dt(2022, 1, 10, 9));
        assert_eq!(counts.total(), 2 + 53 + 52 + 2);
        assert_eq!(counts.len(), 109);
        assert!(counts.iter().all(|(_, c)| c == 1));
        assert_eq!(counts.get(WeekKey::new(51, 2019)), 1);
        assert_eq!(counts.get(WeekKey::new(53, 2020)), 1);
        assert_eq!(counts.get(WeekKey::new(2, 2022)), 1);
        assert_eq!(counts.get(WeekKey::new(50, 2019)), 0);
        assert_eq!(counts.get(WeekKey::new(3, 2022)), 0);
    }

    #[test]
    fn test_iso_weeks_in_year() {
        assert_eq!(iso_weeks_in_year(2020), 53);
        assert_eq!(iso_weeks_in_year(2021), 52);
        assert_eq!(iso_weeks_in_year(2015), 53);
    }

    #[test]
    fn test_subtract_then_add_restores_table() {
        let a = &WeekCounts::for_span(dt(2021, 7, 5, 9), dt(2021, 7, 5, 17))
            + &WeekCounts::for_span(dt(2021, 7, 10, 9), dt(2021, 7, 13, 17));
        let b = WeekCounts::for_span(dt(2021, 8, 2, 9), dt(2021, 8, 2, 17));
        let roundabout = &(&a - &b) + &b;
        assert_eq!(roundabout, a);
        assert_ne!(roundabout.len(), a.len());
    }

    #[test]
    fn test_counts_may_go_negative_transiently() {
        let one = WeekCounts::for_span(dt(2021, 7, 5, 9), dt(2021, 7, 5, 17));
        let mut t = WeekCounts::new();
        t -= &one;
        assert_eq!(t.get(WeekKey::new(27, 2021)), -1);
        assert_eq!(t.iter_positive().count(), 0);
        t += &one;
        assert!(t.is_empty());
        t.prune();
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn test_week_key_display_and_order() {
        let a = WeekKey::new(52, 2020);
        let b = WeekKey::new(1, 2021);
        assert!(a < b);
        assert_eq!(b.to_string(), "2021-W01");
    }
}
