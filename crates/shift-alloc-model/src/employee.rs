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

use crate::{
    availability::{Availability, AvailabilityEntry, ShiftType, normalize},
    id::EmployeeId,
    validate::{is_valid_email, is_valid_mobile},
};
use shift_alloc_core::time::TimeWindow;
use std::fmt::Display;

/// A worker who can be bound to shifts.
///
/// The availability list is always normalized: sorted by start, no two
/// windows overlap and touching windows carry different type sets. It only
/// changes through [`Employee::add_availabilities`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    id: EmployeeId,
    name: Option<String>,
    mobile: Option<String>,
    email: String,
    importance: u32,
    max_weekly_shifts: Option<u32>,
    min_weekly_shifts: u32,
    availabilities: Vec<Availability>,
}

impl Employee {
    /// Creates an employee with default weights and no availability.
    ///
    /// # Panics
    ///
    /// Panics if `email` is not a syntactically valid address.
    pub fn new(id: EmployeeId, email: impl Into<String>) -> Self {
        let email = email.into();
        assert!(
            is_valid_email(&email),
            "Employee::new: invalid email '{}' for {}",
            email,
            id
        );
        Self {
            id,
            name: None,
            mobile: None,
            email,
            importance: 0,
            max_weekly_shifts: None,
            min_weekly_shifts: 0,
            availabilities: Vec::new(),
        }
    }

    #[inline]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.is_empty());
        self
    }

    /// # Panics
    ///
    /// Panics if `mobile` is present, non-empty and not shaped like an
    /// international number (see [`is_valid_mobile`]).
    #[inline]
    pub fn with_mobile(mut self, mobile: Option<String>) -> Self {
        if let Some(m) = &mobile {
            assert!(
                is_valid_mobile(m),
                "Employee::with_mobile: '{}' for {} is not an international mobile number",
                m,
                self.id
            );
        }
        self.mobile = mobile.filter(|m| !m.is_empty());
        self
    }

    #[inline]
    pub fn with_importance(mut self, importance: u32) -> Self {
        self.importance = importance;
        self
    }

    #[inline]
    pub fn with_max_weekly_shifts(mut self, max: Option<u32>) -> Self {
        self.max_weekly_shifts = max;
        self
    }

    #[inline]
    pub fn with_min_weekly_shifts(mut self, min: u32) -> Self {
        self.min_weekly_shifts = min;
        self
    }

    #[inline]
    pub fn id(&self) -> &EmployeeId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn mobile(&self) -> Option<&str> {
        self.mobile.as_deref()
    }

    #[inline]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[inline]
    pub fn importance(&self) -> u32 {
        self.importance
    }

    #[inline]
    pub fn max_weekly_shifts(&self) -> Option<u32> {
        self.max_weekly_shifts
    }

    #[inline]
    pub fn min_weekly_shifts(&self) -> u32 {
        self.min_weekly_shifts
    }

    #[inline]
    pub fn availabilities(&self) -> &[Availability] {
        &self.availabilities
    }

    /// Folds a batch of raw entries into the availability list.
    ///
    /// # Panics
    ///
    /// Panics if an entry belongs to another employee.
    pub fn add_availabilities<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = &'a AvailabilityEntry>,
    {
        let batch: Vec<&AvailabilityEntry> = entries
            .into_iter()
            .inspect(|e| {
                assert!(
                    e.employee() == &self.id,
                    "Employee::add_availabilities: entry for {} given to {}",
                    e.employee(),
                    self.id
                )
            })
            .collect();
        self.availabilities = normalize(&self.availabilities, batch);
    }

    /// The run of availability windows covering `window` end to end.
    ///
    /// Returns `None` unless the windows overlapping `window` are gap-free,
    /// the first starts at or before `window.start()` and the last ends at
    /// or after `window.end()`.
    pub fn covering_availabilities(&self, window: &TimeWindow) -> Option<&[Availability]> {
        let list = &self.availabilities;
        let lo = list.partition_point(|a| a.end() <= window.start());
        let hi = list.partition_point(|a| a.start() < window.end());
        if lo >= hi {
            return None;
        }
        let run = &list[lo..hi];
        let first = &run[0];
        let last = &run[run.len() - 1];
        if first.start() > window.start() || last.end() < window.end() {
            return None;
        }
        if run.windows(2).any(|p| p[0].end() != p[1].start()) {
            return None;
        }
        Some(run)
    }

    /// `true` if the availability windows cover `window` without gaps.
    #[inline]
    pub fn can_cover_time(&self, window: &TimeWindow) -> bool {
        self.covering_availabilities(window).is_some()
    }

    /// `true` if the windows cover `window` and every one of them accepts `kind`.
    #[inline]
    pub fn can_cover_type(&self, window: &TimeWindow, kind: &ShiftType) -> bool {
        self.covering_availabilities(window)
            .is_some_and(|run| run.iter().all(|a| a.accepts(kind)))
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Employee({}, importance: {}, weekly: {}..{}, availabilities: {})",
            self.id.value(),
            self.importance,
            self.min_weekly_shifts,
            self.max_weekly_shifts
                .map_or_else(|| "".to_string(), |m| m.to_string()),
            self.availabilities.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityType;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, 11)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn w(h0: u32, m0: u32, h1: u32, m1: u32) -> TimeWindow {
        TimeWindow::new(at(h0, m0), at(h1, m1))
    }

    fn employee() -> Employee {
        Employee::new(EmployeeId::new("e1"), "e1@example.com")
    }

    fn entry(kind: AvailabilityType, window: TimeWindow) -> AvailabilityEntry {
        AvailabilityEntry::new(EmployeeId::new("e1"), kind, window)
    }

    #[test]
    fn test_typed_run_followed_by_any_covers_shift_type() {
        let mut e = employee();
        e.add_availabilities(&[
            entry(AvailabilityType::only("online"), w(9, 0, 12, 0)),
            entry(AvailabilityType::Any, w(12, 0, 13, 0)),
        ]);
        let shift = w(10, 0, 13, 0);
        let online = ShiftType::new("online");
        assert!(e.can_cover_time(&shift));
        assert!(e.can_cover_type(&shift, &online));
        assert_eq!(e.covering_availabilities(&shift).map(<[_]>::len), Some(2));
        assert!(!e.can_cover_type(&shift, &ShiftType::new("in-person")));
    }

    #[test]
    fn test_gap_in_run_fails_coverage() {
        let mut e = employee();
        e.add_availabilities(&[
            entry(AvailabilityType::only("online"), w(9, 0, 12, 0)),
            entry(AvailabilityType::Any, w(12, 1, 13, 0)),
        ]);
        let shift = w(10, 0, 13, 0);
        assert!(!e.can_cover_time(&shift));
        assert!(!e.can_cover_type(&shift, &ShiftType::new("online")));
    }

    #[test]
    fn test_partial_coverage_fails_at_either_edge() {
        let mut e = employee();
        e.add_availabilities(&[entry(AvailabilityType::Any, w(10, 0, 12, 0))]);
        assert!(!e.can_cover_time(&w(9, 59, 11, 0)));
        assert!(!e.can_cover_time(&w(11, 0, 12, 1)));
        assert!(e.can_cover_time(&w(10, 0, 12, 0)));
        assert!(e.can_cover_time(&w(10, 30, 11, 30)));
    }

    #[test]
    fn test_no_overlapping_window_fails_coverage() {
        let mut e = employee();
        e.add_availabilities(&[entry(AvailabilityType::Any, w(8, 0, 9, 0))]);
        assert!(!e.can_cover_time(&w(9, 0, 10, 0)));
        assert!(employee().covering_availabilities(&w(9, 0, 10, 0)).is_none());
    }

    #[test]
    fn test_mixed_types_inside_run_require_every_window_to_accept() {
        let mut e = employee();
        e.add_availabilities(&[
            entry(AvailabilityType::only("online"), w(9, 0, 11, 0)),
            entry(AvailabilityType::only("in-person"), w(10, 0, 12, 0)),
        ]);
        // [9,10) online, [10,11) online+in-person, [11,12) in-person
        let shift = w(9, 30, 11, 30);
        assert!(e.can_cover_time(&shift));
        assert!(!e.can_cover_type(&shift, &ShiftType::new("online")));
        assert!(e.can_cover_type(&w(10, 0, 11, 0), &ShiftType::new("online")));
    }

    #[test]
    fn test_builder_style_fields() {
        let e = employee()
            .with_name(Some("Ada".into()))
            .with_mobile(Some(String::new()))
            .with_importance(3)
            .with_max_weekly_shifts(Some(5))
            .with_min_weekly_shifts(2);
        assert_eq!(e.name(), Some("Ada"));
        assert_eq!(e.mobile(), None);
        assert_eq!(e.importance(), 3);
        assert_eq!(e.max_weekly_shifts(), Some(5));
        assert_eq!(e.min_weekly_shifts(), 2);
    }

    #[test]
    #[should_panic]
    fn test_invalid_email_panics() {
        let _ = Employee::new(EmployeeId::new("e1"), "not-an-email");
    }

    #[test]
    #[should_panic]
    fn test_invalid_mobile_panics() {
        let _ = employee().with_mobile(Some("0491570006".into()));
    }

    #[test]
    #[should_panic]
    fn test_foreign_entry_panics() {
        let mut e = employee();
        let foreign = AvailabilityEntry::new(
            EmployeeId::new("e2"),
            AvailabilityType::Any,
            w(9, 0, 10, 0),
        );
        e.add_availabilities(&[foreign]);
    }
}
