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

//! # Constraint Evaluation
//!
//! Scores an assignment of employees to shifts.
//!
//! Hard rules: a bound employee's availability must cover the shift in time
//! and in type, no employee works two overlapping shifts, no ISO week goes
//! above the employee's weekly maximum, and every shift is bound. The
//! medium rule fills each worked week up to the weekly minimum, weighted by
//! importance. The soft rule penalizes idle hours between two shifts on the
//! same day, again weighted by importance.
//!
//! Apart from the unassigned-shift rule every penalty is local to one
//! employee. [`employee_matches`] computes it from that employee's sorted
//! shift list and week table, which is what the incremental solver state
//! reuses after each move.

use chrono::TimeDelta;
use rayon::prelude::*;
use shift_alloc_core::{score::Score, week::WeekCounts};
use shift_alloc_model::{
    id::{EmployeeIndex, ShiftIndex},
    problem::Problem,
};
use std::fmt::Display;

/// Penalty for a shift nobody covers.
pub const UNASSIGNED_PENALTY: Score = Score::of_hard(-1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    AvailabilityTime,
    AvailabilityType,
    DoubleBooking,
    AboveMaxWeekly,
    BelowMinWeekly,
    SameDayGaps,
    UnassignedShift,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 7] = [
        ConstraintKind::AvailabilityTime,
        ConstraintKind::AvailabilityType,
        ConstraintKind::DoubleBooking,
        ConstraintKind::AboveMaxWeekly,
        ConstraintKind::BelowMinWeekly,
        ConstraintKind::SameDayGaps,
        ConstraintKind::UnassignedShift,
    ];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            ConstraintKind::AvailabilityTime => "Employee availability conflict",
            ConstraintKind::AvailabilityType => "Employee availability (type) conflict",
            ConstraintKind::DoubleBooking => "Employee shifts occurring at the same time",
            ConstraintKind::AboveMaxWeekly => "Employee above maximum shifts",
            ConstraintKind::BelowMinWeekly => "Employee below minimum shifts",
            ConstraintKind::SameDayGaps => "Employees prefer to avoid gaps",
            ConstraintKind::UnassignedShift => "Unassigned shift",
        }
    }
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether an employee's availability covers a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coverage {
    time: bool,
    kind: bool,
}

impl Coverage {
    #[inline]
    pub const fn new(time: bool, kind: bool) -> Self {
        Self { time, kind }
    }

    #[inline]
    pub const fn time(self) -> bool {
        self.time
    }

    /// Implies [`Coverage::time`].
    #[inline]
    pub const fn kind(self) -> bool {
        self.kind
    }

    #[inline]
    pub const fn is_full(self) -> bool {
        self.time && self.kind
    }
}

/// Per-problem tables that never change during a solve.
#[derive(Debug, Clone)]
pub struct ScoringContext<'p> {
    problem: &'p Problem,
    shift_weeks: Vec<WeekCounts>,
    coverage: Vec<Coverage>,
    candidates: Vec<Vec<EmployeeIndex>>,
}

impl<'p> ScoringContext<'p> {
    pub fn new(problem: &'p Problem) -> Self {
        let n_emp = problem.employee_count();
        let rows: Vec<(WeekCounts, Vec<Coverage>)> = problem
            .shifts()
            .par_iter()
            .map(|shift| {
                let window = shift.window();
                let row = problem
                    .employees()
                    .iter()
                    .map(|e| match e.covering_availabilities(&window) {
                        None => Coverage::new(false, false),
                        Some(run) => {
                            Coverage::new(true, run.iter().all(|a| a.accepts(shift.kind())))
                        }
                    })
                    .collect();
                (shift.week_counts(), row)
            })
            .collect();

        let mut shift_weeks = Vec::with_capacity(rows.len());
        let mut coverage = Vec::with_capacity(rows.len() * n_emp);
        let mut candidates = Vec::with_capacity(rows.len());
        for (weeks, row) in rows {
            candidates.push(
                row.iter()
                    .enumerate()
                    .filter(|(_, c)| c.is_full())
                    .map(|(e, _)| EmployeeIndex::new(e))
                    .collect(),
            );
            shift_weeks.push(weeks);
            coverage.extend(row);
        }

        Self {
            problem,
            shift_weeks,
            coverage,
            candidates,
        }
    }

    #[inline]
    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    #[inline]
    pub fn coverage(&self, shift: ShiftIndex, employee: EmployeeIndex) -> Coverage {
        self.coverage[shift.get() * self.problem.employee_count() + employee.get()]
    }

    #[inline]
    pub fn shift_weeks(&self, shift: ShiftIndex) -> &WeekCounts {
        &self.shift_weeks[shift.get()]
    }

    /// Employees whose availability fully covers `shift`, in index order.
    #[inline]
    pub fn candidates(&self, shift: ShiftIndex) -> &[EmployeeIndex] {
        &self.candidates[shift.get()]
    }

    /// Orders shifts by window start, then end, then index.
    #[inline]
    pub fn sort_by_window(&self, shifts: &mut [ShiftIndex]) {
        shifts.sort_by_key(|&s| self.window_key(s));
    }

    #[inline]
    pub(crate) fn window_key(
        &self,
        s: ShiftIndex,
    ) -> (chrono::NaiveDateTime, chrono::NaiveDateTime, ShiftIndex) {
        let shift = self.problem.shift(s);
        (shift.start(), shift.end(), s)
    }
}

/// Constraint matches charged to a single employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EmployeeMatches {
    pub uncovered_time: i64,
    pub uncovered_type: i64,
    pub overlapping_pairs: i64,
    pub overfull_weeks: i64,
    pub excess_shifts: i64,
    pub underfull_weeks: i64,
    pub missing_shifts: i64,
    pub gaps: i64,
    pub gap_hours: i64,
}

impl EmployeeMatches {
    #[inline]
    pub fn score(&self, importance: i64) -> Score {
        Score::of(
            -(self.uncovered_time + self.uncovered_type + self.overlapping_pairs + self.excess_shifts),
            -(self.missing_shifts * importance),
            -(self.gap_hours * importance),
        )
    }
}

/// Tallies every per-employee rule for one employee.
///
/// `shifts` must be sorted with [`ScoringContext::sort_by_window`] and
/// `weeks` must be the sum of their week tables.
pub fn employee_matches(
    ctx: &ScoringContext<'_>,
    employee: EmployeeIndex,
    shifts: &[ShiftIndex],
    weeks: &WeekCounts,
) -> EmployeeMatches {
    debug_assert!(shifts.is_sorted_by_key(|&s| ctx.window_key(s)));
    let problem = ctx.problem();
    let emp = problem.employee(employee);
    let mut m = EmployeeMatches::default();

    for &s in shifts {
        let c = ctx.coverage(s, employee);
        m.uncovered_time += i64::from(!c.time());
        m.uncovered_type += i64::from(!c.kind());
    }

    for (i, &a) in shifts.iter().enumerate() {
        let end_a = problem.shift(a).end();
        m.overlapping_pairs += shifts[i + 1..]
            .iter()
            .take_while(|&&b| problem.shift(b).start() < end_a)
            .count() as i64;
    }

    let max = emp.max_weekly_shifts().map(i64::from);
    let min = i64::from(emp.min_weekly_shifts());
    for (_, count) in weeks.iter_positive() {
        if let Some(max) = max
            && count > max
        {
            m.overfull_weeks += 1;
            m.excess_shifts += count - max;
        }
        if count < min {
            m.underfull_weeks += 1;
            m.missing_shifts += min - count;
        }
    }

    let mut idle = TimeDelta::zero();
    for pair in shifts.windows(2) {
        let gap_start = problem.shift(pair[0]).end();
        let gap_end = problem.shift(pair[1]).start();
        if gap_start < gap_end && gap_start.date() == gap_end.date() {
            idle += gap_end - gap_start;
            m.gaps += 1;
        }
    }
    m.gap_hours = idle.num_hours();

    m
}

/// Score of one employee's workload.
#[inline]
pub fn employee_score(
    ctx: &ScoringContext<'_>,
    employee: EmployeeIndex,
    shifts: &[ShiftIndex],
    weeks: &WeekCounts,
) -> Score {
    let importance = i64::from(ctx.problem().employee(employee).importance());
    employee_matches(ctx, employee, shifts, weeks).score(importance)
}

/// Sorted shift lists and week tables for every employee.
pub(crate) fn group_by_employee(
    ctx: &ScoringContext<'_>,
    bindings: &[Option<EmployeeIndex>],
) -> Vec<(Vec<ShiftIndex>, WeekCounts)> {
    let mut groups: Vec<(Vec<ShiftIndex>, WeekCounts)> =
        vec![(Vec::new(), WeekCounts::new()); ctx.problem().employee_count()];
    for (s, e) in bindings.iter().enumerate() {
        if let Some(e) = e {
            let s = ShiftIndex::new(s);
            let (list, weeks) = &mut groups[e.get()];
            list.push(s);
            *weeks += ctx.shift_weeks(s);
        }
    }
    for (list, _) in &mut groups {
        ctx.sort_by_window(list);
    }
    groups
}

/// Scores a full assignment from scratch.
///
/// # Panics
///
/// Panics if `bindings` does not have one entry per shift.
pub fn evaluate(ctx: &ScoringContext<'_>, bindings: &[Option<EmployeeIndex>]) -> Score {
    assert_eq!(bindings.len(), ctx.problem().shift_count());
    let unassigned = bindings.iter().filter(|b| b.is_none()).count() as i64;
    let employees: Score = group_by_employee(ctx, bindings)
        .iter()
        .enumerate()
        .map(|(e, (list, weeks))| employee_score(ctx, EmployeeIndex::new(e), list, weeks))
        .sum();
    employees + UNASSIGNED_PENALTY * unassigned
}

/// Total contribution of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintTotal {
    kind: ConstraintKind,
    matches: u64,
    impact: Score,
}

impl ConstraintTotal {
    #[inline]
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    #[inline]
    pub fn matches(&self) -> u64 {
        self.matches
    }

    #[inline]
    pub fn impact(&self) -> Score {
        self.impact
    }
}

impl Display for ConstraintTotal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} match(es), impact {}",
            self.kind, self.matches, self.impact
        )
    }
}

/// Per-rule breakdown of a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreExplanation {
    score: Score,
    totals: Vec<ConstraintTotal>,
}

impl ScoreExplanation {
    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    /// One entry per rule, in [`ConstraintKind::ALL`] order.
    #[inline]
    pub fn totals(&self) -> &[ConstraintTotal] {
        &self.totals
    }

    #[inline]
    pub fn total(&self, kind: ConstraintKind) -> &ConstraintTotal {
        &self.totals[kind as usize]
    }
}

impl Display for ScoreExplanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        for t in self.totals.iter().filter(|t| t.matches > 0) {
            writeln!(f, "  {}", t)?;
        }
        Ok(())
    }
}

/// Scores a full assignment and reports what each rule contributed.
pub fn explain(ctx: &ScoringContext<'_>, bindings: &[Option<EmployeeIndex>]) -> ScoreExplanation {
    assert_eq!(bindings.len(), ctx.problem().shift_count());
    let mut totals: Vec<ConstraintTotal> = ConstraintKind::ALL
        .iter()
        .map(|&kind| ConstraintTotal {
            kind,
            matches: 0,
            impact: Score::ZERO,
        })
        .collect();
    let mut add = |kind: ConstraintKind, matches: i64, impact: Score| {
        let t = &mut totals[kind as usize];
        t.matches += matches as u64;
        t.impact += impact;
    };

    for (e, (list, weeks)) in group_by_employee(ctx, bindings).iter().enumerate() {
        let employee = EmployeeIndex::new(e);
        let importance = i64::from(ctx.problem().employee(employee).importance());
        let m = employee_matches(ctx, employee, list, weeks);
        add(
            ConstraintKind::AvailabilityTime,
            m.uncovered_time,
            Score::of_hard(-m.uncovered_time),
        );
        add(
            ConstraintKind::AvailabilityType,
            m.uncovered_type,
            Score::of_hard(-m.uncovered_type),
        );
        add(
            ConstraintKind::DoubleBooking,
            m.overlapping_pairs,
            Score::of_hard(-m.overlapping_pairs),
        );
        add(
            ConstraintKind::AboveMaxWeekly,
            m.overfull_weeks,
            Score::of_hard(-m.excess_shifts),
        );
        add(
            ConstraintKind::BelowMinWeekly,
            m.underfull_weeks,
            Score::of_medium(-m.missing_shifts * importance),
        );
        add(
            ConstraintKind::SameDayGaps,
            m.gaps,
            Score::of_soft(-m.gap_hours * importance),
        );
    }
    let unassigned = bindings.iter().filter(|b| b.is_none()).count() as i64;
    add(
        ConstraintKind::UnassignedShift,
        unassigned,
        UNASSIGNED_PENALTY * unassigned,
    );

    let score = totals.iter().map(|t| t.impact).sum();
    ScoreExplanation { score, totals }
}
