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
use shift_alloc_model::id::ShiftIndex;

/// Exchanges the employees of two shifts with different bindings.
pub struct SwapOperator {
    pub attempts: usize,
}

impl Default for SwapOperator {
    fn default() -> Self {
        Self { attempts: 32 }
    }
}

impl Operator for SwapOperator {
    fn name(&self) -> &'static str {
        "SwapOperator"
    }

    fn propose(
        &self,
        _: usize,
        rng: &mut rand_chacha::ChaCha8Rng,
        state: &SolverState<'_>,
    ) -> Option<Move> {
        let n = state.problem().shift_count();
        if n < 2 {
            return None;
        }
        for _ in 0..self.attempts {
            let a = ShiftIndex::new(rng.random_range(0..n));
            let b = ShiftIndex::new(rng.random_range(0..n));
            if state.binding(a) != state.binding(b) {
                return Some(Move::swap(a, b));
            }
        }
        None
    }
}
