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
    constraints::{
        ScoreExplanation, ScoringContext, UNASSIGNED_PENALTY, employee_score, evaluate, explain,
        group_by_employee,
    },
    framework::moves::Move,
};
use shift_alloc_core::{score::Score, week::WeekCounts};
use shift_alloc_model::{
    id::{EmployeeIndex, ShiftIndex},
    problem::Problem,
    sol::Allocation,
};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct EmployeeLoad {
    // Sorted by window.
    shifts: Vec<ShiftIndex>,
    weeks: WeekCounts,
    score: Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadEdit {
    employee: EmployeeIndex,
    remove: Option<ShiftIndex>,
    add: Option<ShiftIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MovePlan {
    edits: [Option<LoadEdit>; 2],
    unassigned_change: i64,
}

/// Bindings of every shift together with per-employee workloads, kept
/// in sync so that a [`Move`] can be scored by rescoring only the
/// employees it touches.
#[derive(Debug, Clone)]
pub struct SolverState<'p> {
    ctx: ScoringContext<'p>,
    bindings: Vec<Option<EmployeeIndex>>,
    loads: Vec<EmployeeLoad>,
    unassigned: usize,
    score: Score,
}

impl<'p> SolverState<'p> {
    /// A state with every shift unbound.
    #[inline]
    pub fn new(problem: &'p Problem) -> Self {
        Self::with_context(ScoringContext::new(problem))
    }

    pub fn with_context(ctx: ScoringContext<'p>) -> Self {
        let n = ctx.problem().shift_count();
        Self::from_bindings(ctx, vec![None; n])
    }

    /// # Panics
    ///
    /// Panics if `bindings` does not have one entry per shift or names an
    /// employee outside the problem.
    pub fn from_bindings(ctx: ScoringContext<'p>, bindings: Vec<Option<EmployeeIndex>>) -> Self {
        let problem = ctx.problem();
        assert_eq!(
            bindings.len(),
            problem.shift_count(),
            "SolverState::from_bindings: one binding per shift required"
        );
        assert!(
            bindings
                .iter()
                .flatten()
                .all(|e| e.get() < problem.employee_count()),
            "SolverState::from_bindings: unknown employee index"
        );

        let loads: Vec<EmployeeLoad> = group_by_employee(&ctx, &bindings)
            .into_iter()
            .enumerate()
            .map(|(e, (shifts, weeks))| {
                let score = employee_score(&ctx, EmployeeIndex::new(e), &shifts, &weeks);
                EmployeeLoad {
                    shifts,
                    weeks,
                    score,
                }
            })
            .collect();
        let unassigned = bindings.iter().filter(|b| b.is_none()).count();
        let score = loads.iter().map(|l| l.score).sum::<Score>()
            + UNASSIGNED_PENALTY * unassigned as i64;

        Self {
            ctx,
            bindings,
            loads,
            unassigned,
            score,
        }
    }

    #[inline]
    pub fn problem(&self) -> &'p Problem {
        self.ctx.problem()
    }

    #[inline]
    pub fn context(&self) -> &ScoringContext<'p> {
        &self.ctx
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn bindings(&self) -> &[Option<EmployeeIndex>] {
        &self.bindings
    }

    #[inline]
    pub fn binding(&self, shift: ShiftIndex) -> Option<EmployeeIndex> {
        self.bindings[shift.get()]
    }

    #[inline]
    pub fn unassigned_count(&self) -> usize {
        self.unassigned
    }

    /// Shifts bound to `employee`, sorted by window.
    #[inline]
    pub fn employee_shifts(&self, employee: EmployeeIndex) -> &[ShiftIndex] {
        &self.loads[employee.get()].shifts
    }

    #[inline]
    pub fn employee_weeks(&self, employee: EmployeeIndex) -> &WeekCounts {
        &self.loads[employee.get()].weeks
    }

    #[inline]
    pub fn employee_score(&self, employee: EmployeeIndex) -> Score {
        self.loads[employee.get()].score
    }

    fn plan(&self, mv: &Move) -> MovePlan {
        match *mv {
            Move::Reassign { shift, to } => {
                let from = self.binding(shift);
                if from == to {
                    return MovePlan {
                        edits: [None, None],
                        unassigned_change: 0,
                    };
                }
                MovePlan {
                    edits: [
                        from.map(|employee| LoadEdit {
                            employee,
                            remove: Some(shift),
                            add: None,
                        }),
                        to.map(|employee| LoadEdit {
                            employee,
                            remove: None,
                            add: Some(shift),
                        }),
                    ],
                    unassigned_change: i64::from(to.is_none()) - i64::from(from.is_none()),
                }
            }
            Move::Swap { a, b } => {
                let (ea, eb) = (self.binding(a), self.binding(b));
                if ea == eb {
                    return MovePlan {
                        edits: [None, None],
                        unassigned_change: 0,
                    };
                }
                MovePlan {
                    edits: [
                        ea.map(|employee| LoadEdit {
                            employee,
                            remove: Some(a),
                            add: Some(b),
                        }),
                        eb.map(|employee| LoadEdit {
                            employee,
                            remove: Some(b),
                            add: Some(a),
                        }),
                    ],
                    unassigned_change: 0,
                }
            }
        }
    }

    fn edited_load(&self, edit: &LoadEdit) -> (Vec<ShiftIndex>, WeekCounts) {
        let load = &self.loads[edit.employee.get()];
        let mut shifts = load.shifts.clone();
        let mut weeks = load.weeks.clone();
        if let Some(r) = edit.remove {
            let key = self.ctx.window_key(r);
            if let Ok(pos) = shifts.binary_search_by_key(&key, |&s| self.ctx.window_key(s)) {
                shifts.remove(pos);
                weeks -= self.ctx.shift_weeks(r);
            }
        }
        if let Some(a) = edit.add {
            let key = self.ctx.window_key(a);
            let pos = shifts.partition_point(|&s| self.ctx.window_key(s) < key);
            shifts.insert(pos, a);
            weeks += self.ctx.shift_weeks(a);
        }
        (shifts, weeks)
    }

    /// Score change `mv` would cause, without applying it.
    pub fn delta(&self, mv: &Move) -> Score {
        let plan = self.plan(mv);
        let mut delta = UNASSIGNED_PENALTY * plan.unassigned_change;
        for edit in plan.edits.iter().flatten() {
            let (shifts, weeks) = self.edited_load(edit);
            delta += employee_score(&self.ctx, edit.employee, &shifts, &weeks)
                - self.loads[edit.employee.get()].score;
        }
        delta
    }

    /// Applies `mv` and returns the move that undoes it.
    pub fn apply(&mut self, mv: &Move) -> Move {
        let undo = match *mv {
            Move::Reassign { shift, .. } => Move::Reassign {
                shift,
                to: self.binding(shift),
            },
            Move::Swap { a, b } => Move::Swap { a, b },
        };

        let plan = self.plan(mv);
        for edit in plan.edits.iter().flatten() {
            let (shifts, mut weeks) = self.edited_load(edit);
            weeks.prune();
            let score = employee_score(&self.ctx, edit.employee, &shifts, &weeks);
            let load = &mut self.loads[edit.employee.get()];
            self.score += score - load.score;
            *load = EmployeeLoad {
                shifts,
                weeks,
                score,
            };
        }
        self.score += UNASSIGNED_PENALTY * plan.unassigned_change;
        self.unassigned = self
            .unassigned
            .checked_add_signed(plan.unassigned_change as isize)
            .expect("SolverState::apply: unassigned count out of sync with bindings");

        match *mv {
            Move::Reassign { shift, to } => self.bindings[shift.get()] = to,
            Move::Swap { a, b } => self.bindings.swap(a.get(), b.get()),
        }
        undo
    }

    /// Full evaluation from scratch; equal to [`SolverState::score`].
    #[inline]
    pub fn recompute_score(&self) -> Score {
        evaluate(&self.ctx, &self.bindings)
    }

    #[inline]
    pub fn explain(&self) -> ScoreExplanation {
        explain(&self.ctx, &self.bindings)
    }

    #[inline]
    pub fn to_allocation(&self) -> Allocation {
        Allocation::new(self.bindings.clone(), self.score)
    }
}

impl Display for SolverState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolverState(bound: {}/{}, score: {})",
            self.bindings.len() - self.unassigned,
            self.bindings.len(),
            self.score
        )
    }
}

/// Builds a starting state for a problem.
pub trait ConstructiveSolver {
    type SolveError;

    fn build_state<'p>(&mut self, problem: &'p Problem)
    -> Result<SolverState<'p>, Self::SolveError>;
}

pub trait Solver {
    type SolveError;

    fn solve(&mut self, problem: &Problem) -> Result<Allocation, Self::SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::tests::sample_problem;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_move(rng: &mut ChaCha8Rng, state: &SolverState<'_>) -> Move {
        let n_shifts = state.problem().shift_count();
        let n_emp = state.problem().employee_count();
        let shift = ShiftIndex::new(rng.random_range(0..n_shifts));
        match rng.random_range(0..3) {
            0 => Move::unbind(shift),
            1 => Move::reassign(shift, EmployeeIndex::new(rng.random_range(0..n_emp))),
            _ => Move::swap(shift, ShiftIndex::new(rng.random_range(0..n_shifts))),
        }
    }

    #[test]
    fn test_new_state_is_all_unassigned() {
        let p = sample_problem();
        let state = SolverState::new(&p);
        assert_eq!(state.unassigned_count(), p.shift_count());
        assert_eq!(state.score(), Score::of_hard(-(p.shift_count() as i64)));
        assert_eq!(state.score(), state.recompute_score());
    }

    #[test]
    fn test_delta_matches_apply_and_full_evaluation() {
        let p = sample_problem();
        let mut state = SolverState::new(&p);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let mv = random_move(&mut rng, &state);
            let before = state.score();
            let delta = state.delta(&mv);
            state.apply(&mv);
            assert_eq!(state.score(), before + delta, "move {mv}");
            assert_eq!(state.score(), state.recompute_score(), "move {mv}");
        }
    }

    #[test]
    fn test_unassigned_count_tracks_bindings() {
        let p = sample_problem();
        let mut state = SolverState::new(&p);
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        for _ in 0..300 {
            let mv = random_move(&mut rng, &state);
            state.apply(&mv);
            let unbound = state.bindings().iter().filter(|b| b.is_none()).count();
            assert_eq!(state.unassigned_count(), unbound, "move {mv}");
        }
    }

    #[test]
    fn test_undo_restores_bindings_and_score() {
        let p = sample_problem();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut state = SolverState::new(&p);
        for _ in 0..50 {
            let mv = random_move(&mut rng, &state);
            state.apply(&mv);
        }
        let snapshot = state.bindings().to_vec();
        let score = state.score();
        for _ in 0..100 {
            let mv = random_move(&mut rng, &state);
            let undo = state.apply(&mv);
            state.apply(&undo);
            assert_eq!(state.bindings(), snapshot.as_slice());
            assert_eq!(state.score(), score);
        }
    }

    #[test]
    fn test_noop_moves_have_zero_delta() {
        let p = sample_problem();
        let mut state = SolverState::new(&p);
        let s0 = ShiftIndex::new(0);
        let e0 = EmployeeIndex::new(0);
        assert_eq!(state.delta(&Move::unbind(s0)), Score::ZERO);
        state.apply(&Move::reassign(s0, e0));
        assert_eq!(state.delta(&Move::reassign(s0, e0)), Score::ZERO);
        assert_eq!(state.delta(&Move::swap(s0, s0)), Score::ZERO);
        assert_eq!(state.employee_shifts(e0), &[s0]);
    }

    #[test]
    fn test_from_bindings_matches_incremental_build() {
        let p = sample_problem();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut state = SolverState::new(&p);
        for _ in 0..40 {
            let mv = random_move(&mut rng, &state);
            state.apply(&mv);
        }
        let rebuilt = SolverState::from_bindings(ScoringContext::new(&p), state.bindings().to_vec());
        assert_eq!(rebuilt.score(), state.score());
        assert_eq!(rebuilt.unassigned_count(), state.unassigned_count());
        for e in p.employee_indices() {
            assert_eq!(rebuilt.employee_shifts(e), state.employee_shifts(e));
            assert_eq!(rebuilt.employee_weeks(e), state.employee_weeks(e));
        }
        assert_eq!(state.to_allocation().score(), state.score());
    }
}
