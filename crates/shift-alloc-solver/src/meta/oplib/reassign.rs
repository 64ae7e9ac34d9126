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
    framework::{moves::Move, state::SolverState},
    meta::operator::Operator,
};
use rand::Rng;
use shift_alloc_model::id::{EmployeeIndex, ShiftIndex};

/// Moves a random shift to a random employee, or unbinds it.
pub struct ReassignOperator {
    pub attempts: usize,
    pub unbind_probability: f64,
}

impl Default for ReassignOperator {
    fn default() -> Self {
        Self {
            attempts: 16,
            unbind_probability: 0.05,
        }
    }
}

impl Operator for ReassignOperator {
    fn name(&self) -> &'static str {
        "ReassignOperator"
    }

    fn propose(
        &self,
        _: usize,
        rng: &mut rand_chacha::ChaCha8Rng,
        state: &SolverState<'_>,
    ) -> Option<Move> {
        let problem = state.problem();
        let (n_shifts, n_emp) = (problem.shift_count(), problem.employee_count());
        if n_shifts == 0 || n_emp == 0 {
            return None;
        }
        for _ in 0..self.attempts {
            let shift = ShiftIndex::new(rng.random_range(0..n_shifts));
            let to = if rng.random_bool(self.unbind_probability) {
                None
            } else {
                Some(EmployeeIndex::new(rng.random_range(0..n_emp)))
            };
            if state.binding(shift) != to {
                return Some(Move::Reassign { shift, to });
            }
        }
        None
    }
}
