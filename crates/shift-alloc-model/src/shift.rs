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

use crate::{availability::ShiftType, id::ShiftId};
use chrono::NaiveDateTime;
use shift_alloc_core::{time::TimeWindow, week::WeekCounts};
use std::fmt::Display;

/// A unit of work that needs exactly one employee.
///
/// Which employee covers the shift is not stored here; bindings live in the
/// solver state and in [`crate::sol::Allocation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shift {
    id: ShiftId,
    kind: ShiftType,
    window: TimeWindow,
}

impl Shift {
    #[inline]
    pub fn new(id: ShiftId, kind: ShiftType, window: TimeWindow) -> Self {
        Self { id, kind, window }
    }

    #[inline]
    pub fn id(&self) -> &ShiftId {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> &ShiftType {
        &self.kind
    }

    #[inline]
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.window.start()
    }

    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.window.end()
    }

    #[inline]
    pub fn overlaps(&self, other: &Shift) -> bool {
        self.window.overlaps(&other.window)
    }

    /// The ISO weeks this shift counts towards.
    #[inline]
    pub fn week_counts(&self) -> WeekCounts {
        WeekCounts::for_span(self.start(), self.end())
    }
}

impl Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Shift({}, {}, {})", self.id.value(), self.kind, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shift_alloc_core::week::WeekKey;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_shift_week_counts_span_two_weeks() {
        let s = Shift::new(
            ShiftId::new("s1"),
            ShiftType::new("online"),
            TimeWindow::new(at(10, 10), at(14, 10)),
        );
        let counts = s.week_counts();
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.get(WeekKey::new(27, 2021)), 1);
        assert_eq!(counts.get(WeekKey::new(28, 2021)), 1);
    }

    #[test]
    fn test_shift_overlap() {
        let kind = ShiftType::new("online");
        let a = Shift::new(ShiftId::new("a"), kind.clone(), TimeWindow::new(at(12, 9), at(12, 12)));
        let b = Shift::new(ShiftId::new("b"), kind.clone(), TimeWindow::new(at(12, 11), at(12, 13)));
        let c = Shift::new(ShiftId::new("c"), kind, TimeWindow::new(at(12, 12), at(12, 13)));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.to_string(), "Shift(a, online, [12/07/2021 9:00, 12/07/2021 12:00))");
    }
}
