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
use rand::{Rng, seq::IndexedRandom};
use shift_alloc_model::id::ShiftIndex;

/// Rebinds a troubled shift to an employee whose availability covers it.
///
/// A shift is troubled when it is unbound, its employee cannot cover it,
/// or its employee works another overlapping shift.
pub struct CoverageRepairOperator {
    pub attempts: usize,
}

impl Default for CoverageRepairOperator {
    fn default() -> Self {
        Self { attempts: 24 }
    }
}

fn is_troubled(state: &SolverState<'_>, shift: ShiftIndex) -> bool {
    let Some(employee) = state.binding(shift) else {
        return true;
    };
    if !state.context().coverage(shift, employee).is_full() {
        return true;
    }
    let problem = state.problem();
    let target = problem.shift(shift);
    state
        .employee_shifts(employee)
        .iter()
        .any(|&other| other != shift && problem.shift(other).overlaps(target))
}

impl Operator for CoverageRepairOperator {
    fn name(&self) -> &'static str {
        "CoverageRepairOperator"
    }

    fn propose(
        &self,
        _: usize,
        rng: &mut rand_chacha::ChaCha8Rng,
        state: &SolverState<'_>,
    ) -> Option<Move> {
        let n = state.problem().shift_count();
        if n == 0 {
            return None;
        }
        for _ in 0..self.attempts {
            let shift = ShiftIndex::new(rng.random_range(0..n));
            if !is_troubled(state, shift) {
                continue;
            }
            let current = state.binding(shift);
            let candidates = state.context().candidates(shift);
            let Some(&to) = candidates.choose(rng) else {
                continue;
            };
            if Some(to) != current {
                return Some(Move::reassign(shift, to));
            }
        }
        None
    }
}
