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
    availability::ShiftType,
    id::{EmployeeId, EmployeeIndex, ShiftId, ShiftIndex},
    problem::Problem,
};
use shift_alloc_core::{
    score::Score,
    time::{TimeWindow, format_date_time},
};
use std::fmt::Display;

/// The outcome of a solve: one optional employee per shift, plus its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    bindings: Vec<Option<EmployeeIndex>>,
    score: Score,
}

impl Allocation {
    #[inline]
    pub fn new(bindings: Vec<Option<EmployeeIndex>>, score: Score) -> Self {
        Self { bindings, score }
    }

    #[inline]
    pub fn bindings(&self) -> &[Option<EmployeeIndex>] {
        &self.bindings
    }

    #[inline]
    pub fn binding(&self, shift: ShiftIndex) -> Option<EmployeeIndex> {
        self.bindings.get(shift.get()).copied().flatten()
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.score.is_feasible()
    }

    #[inline]
    pub fn bound_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_some()).count()
    }

    /// Output rows for every bound shift, in shift order.
    ///
    /// # Panics
    ///
    /// Panics if the allocation was not produced for `problem`.
    pub fn rows(&self, problem: &Problem) -> Vec<AllocationRow> {
        assert_eq!(
            self.bindings.len(),
            problem.shift_count(),
            "Allocation::rows: allocation does not match problem"
        );
        problem
            .shift_indices()
            .filter_map(|s| {
                let e = self.binding(s)?;
                let shift = problem.shift(s);
                Some(AllocationRow::new(
                    shift.id().clone(),
                    problem.employee(e).id().clone(),
                    shift.window(),
                    shift.kind().clone(),
                ))
            })
            .collect()
    }
}

impl Display for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Allocation(bound: {}/{}, score: {})",
            self.bound_count(),
            self.bindings.len(),
            self.score
        )
    }
}

/// One line of allocation output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllocationRow {
    shift_id: ShiftId,
    employee_id: EmployeeId,
    window: TimeWindow,
    kind: ShiftType,
}

impl AllocationRow {
    pub const HEADER: [&'static str; 5] = ["shiftId", "employeeId", "start", "end", "type"];

    #[inline]
    pub fn new(shift_id: ShiftId, employee_id: EmployeeId, window: TimeWindow, kind: ShiftType) -> Self {
        Self {
            shift_id,
            employee_id,
            window,
            kind,
        }
    }

    #[inline]
    pub fn shift_id(&self) -> &ShiftId {
        &self.shift_id
    }

    #[inline]
    pub fn employee_id(&self) -> &EmployeeId {
        &self.employee_id
    }

    #[inline]
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    #[inline]
    pub fn kind(&self) -> &ShiftType {
        &self.kind
    }

    /// Fields in [`AllocationRow::HEADER`] order, date-times as `d/MM/yyyy H:mm`.
    pub fn to_record(&self) -> [String; 5] {
        [
            self.shift_id.value().to_string(),
            self.employee_id.value().to_string(),
            format_date_time(self.window.start()),
            format_date_time(self.window.end()),
            self.kind.value().to_string(),
        ]
    }
}
