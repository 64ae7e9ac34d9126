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
    constraints::UNASSIGNED_PENALTY,
    framework::{
        moves::Move,
        state::{ConstructiveSolver, Solver, SolverState},
    },
};
use shift_alloc_core::score::Score;
use shift_alloc_model::{
    id::{EmployeeIndex, ShiftIndex},
    problem::Problem,
    sol::Allocation,
};
use std::convert::Infallible;
use tracing::{debug, instrument};

/// Chronological best-fit construction.
///
/// Shifts are visited by start, end and id. Each one goes to the
/// employee with full availability coverage whose binding costs the least
/// on the hard and medium levels, ties going to the smallest employee id.
/// A shift stays unbound when every candidate would break a hard rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreedySolver;

impl Default for GreedySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GreedySolver {
    pub fn new() -> Self {
        Self
    }
}

impl ConstructiveSolver for GreedySolver {
    type SolveError = Infallible;

    #[instrument(skip_all, fields(shifts = problem.shift_count(), employees = problem.employee_count()))]
    fn build_state<'p>(
        &mut self,
        problem: &'p Problem,
    ) -> Result<SolverState<'p>, Self::SolveError> {
        let mut state = SolverState::new(problem);

        let mut order: Vec<ShiftIndex> = problem.shift_indices().collect();
        order.sort_by(|&a, &b| {
            let (sa, sb) = (problem.shift(a), problem.shift(b));
            (sa.start(), sa.end(), sa.id()).cmp(&(sb.start(), sb.end(), sb.id()))
        });

        let mut by_id: Vec<EmployeeIndex> = problem.employee_indices().collect();
        by_id.sort_by(|&a, &b| problem.employee(a).id().cmp(problem.employee(b).id()));

        for shift in order {
            let mut best: Option<(Score, EmployeeIndex)> = None;
            for &employee in &by_id {
                if !state.context().coverage(shift, employee).is_full() {
                    continue;
                }
                // Cost of the binding itself, without the relief of covering the shift.
                let cost = state.delta(&Move::reassign(shift, employee)) + UNASSIGNED_PENALTY;
                let key = Score::of(cost.hard(), cost.medium(), 0);
                if best.is_none_or(|(b, _)| key > b) {
                    best = Some((key, employee));
                }
            }
            match best {
                Some((key, employee)) if key.hard() >= 0 => {
                    state.apply(&Move::reassign(shift, employee));
                }
                _ => debug!(shift = %problem.shift(shift).id(), "Left shift unbound"),
            }
        }

        debug!(score = %state.score(), unassigned = state.unassigned_count(), "Greedy construction finished");
        Ok(state)
    }
}

impl Solver for GreedySolver {
    type SolveError = Infallible;

    fn solve(&mut self, problem: &Problem) -> Result<Allocation, Self::SolveError> {
        let state = self.build_state(problem)?;
        Ok(state.to_allocation())
    }
}
