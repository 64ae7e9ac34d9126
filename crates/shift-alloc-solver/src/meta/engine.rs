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
    framework::{
        moves::Move,
        state::{ConstructiveSolver, Solver, SolverState},
    },
    meta::{
        config::{AllocationConfig, MetaConfig, ScoreWeights, StatsConfig},
        operator::Operator,
        phase::SolverPhase,
    },
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use shift_alloc_core::score::Score;
use shift_alloc_model::{id::EmployeeIndex, problem::Problem, sol::Allocation};
use std::{
    fmt::{Debug, Display},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, trace};

#[inline]
fn acceptance_prob(delta: Score, weights: &ScoreWeights, temp: f64) -> f64 {
    if delta >= Score::ZERO {
        1.0
    } else {
        let f = delta.weighted(weights.hard, weights.medium, weights.soft);
        (f / temp.max(1e-12)).exp().min(1.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    op_idx: usize,
    mv: Move,
    delta: Score,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorStats {
    attempts: u64,
    accepted: u64,
    improvements: u64,
    ewma_reward: f64,
}

impl Default for OperatorStats {
    fn default() -> Self {
        Self {
            attempts: 0,
            accepted: 0,
            improvements: 0,
            ewma_reward: 0.0,
        }
    }
}

impl OperatorStats {
    #[inline]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    #[inline]
    pub fn improvements(&self) -> u64 {
        self.improvements
    }

    #[inline]
    pub fn ewma_reward(&self) -> f64 {
        self.ewma_reward
    }

    #[inline]
    pub fn success_rate(&self, bootstrap: f64) -> f64 {
        if self.attempts > 0 {
            self.accepted as f64 / self.attempts as f64
        } else {
            bootstrap
        }
    }

    #[inline]
    pub fn on_attempt(&mut self) {
        self.attempts += 1;
    }

    #[inline]
    pub fn on_accept(&mut self, delta: Score, weights: &ScoreWeights, reward_alpha: f64) {
        self.accepted += 1;
        if delta > Score::ZERO {
            self.improvements += 1;
        }
        let r = delta.weighted(weights.hard, weights.medium, weights.soft);
        self.ewma_reward = ewma(self.ewma_reward, r, reward_alpha);
    }
}

pub struct OperatorRecord {
    operator: Box<dyn Operator + Send + Sync>,
    stats: OperatorStats,
}

impl OperatorRecord {
    pub fn new(operator: Box<dyn Operator + Send + Sync>) -> Self {
        Self {
            operator,
            stats: OperatorStats::default(),
        }
    }

    #[inline]
    pub fn operator(&self) -> &dyn Operator {
        self.operator.as_ref()
    }

    #[inline]
    pub fn stats(&self) -> &OperatorStats {
        &self.stats
    }

    #[inline]
    pub fn stats_mut(&mut self) -> &mut OperatorStats {
        &mut self.stats
    }
}

/// Counters of the most recent solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatistics {
    iterations: u64,
    proposals: u64,
    accepted: u64,
    improvements: u64,
    construction_score: Score,
    best_score: Score,
    elapsed: Duration,
}

impl RunStatistics {
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    #[inline]
    pub fn proposals(&self) -> u64 {
        self.proposals
    }

    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    #[inline]
    pub fn improvements(&self) -> u64 {
        self.improvements
    }

    #[inline]
    pub fn construction_score(&self) -> Score {
        self.construction_score
    }

    #[inline]
    pub fn best_score(&self) -> Score {
        self.best_score
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Display for RunStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunStatistics(iterations: {}, proposals: {}, accepted: {}, improvements: {}, construction: {}, best: {}, elapsed: {:?})",
            self.iterations,
            self.proposals,
            self.accepted,
            self.improvements,
            self.construction_score,
            self.best_score,
            self.elapsed
        )
    }
}

pub struct MetaEngine<S>
where
    S: ConstructiveSolver,
{
    config: MetaConfig,
    operator_records: Vec<OperatorRecord>,
    construction_solver: S,
    select_rng: ChaCha8Rng,
    phase: SolverPhase,
    proposals_made: u64,
    last_run: Option<RunStatistics>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetaEngineError<E> {
    ConstructionError(E),
}

impl<E: Display> Display for MetaEngineError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaEngineError::ConstructionError(e) => write!(f, "Construction error: {e}"),
        }
    }
}

impl<E: Debug + Display> std::error::Error for MetaEngineError<E> {}

#[inline]
fn make_job_rng(base_seed: u64, op_idx: usize, k: usize, iter: usize) -> ChaCha8Rng {
    let s = base_seed
        ^ ((op_idx as u64).wrapping_mul(0x9E37_79B1_85EB_CA87))
        ^ ((k as u64).rotate_left(17))
        ^ ((iter as u64).wrapping_mul(0xD134_2543_DE82_E285));
    ChaCha8Rng::seed_from_u64(s)
}

impl<S> MetaEngine<S>
where
    S: ConstructiveSolver + Sync,
{
    pub fn new(
        config: MetaConfig,
        ops: impl IntoIterator<Item = Box<dyn Operator + Send + Sync>>,
        construction_solver: S,
    ) -> Self {
        let operator_records = ops.into_iter().map(OperatorRecord::new).collect();
        let select_rng = ChaCha8Rng::seed_from_u64(config.random.seed_base_select);
        Self {
            config,
            operator_records,
            construction_solver,
            select_rng,
            phase: SolverPhase::Unsolved,
            proposals_made: 0,
            last_run: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    #[inline]
    pub fn construction_solver(&self) -> &S {
        &self.construction_solver
    }

    #[inline]
    pub fn operator_records(&self) -> &[OperatorRecord] {
        &self.operator_records
    }

    /// Phase reached by the current or most recent solve.
    #[inline]
    pub fn phase(&self) -> SolverPhase {
        self.phase
    }

    #[inline]
    pub fn last_run(&self) -> Option<&RunStatistics> {
        self.last_run.as_ref()
    }

    fn enter_next_phase(&mut self) {
        let phase = self.phase.advance();
        info!(%phase, "Entering solver phase");
    }

    pub fn construct_initial_state<'p>(
        &mut self,
        problem: &'p Problem,
    ) -> Result<SolverState<'p>, S::SolveError> {
        self.construction_solver.build_state(problem)
    }

    /// Runs one round: generates proposals in parallel, picks the best one
    /// and applies it if the annealing test accepts. Returns the applied
    /// delta.
    #[instrument(skip_all, fields(iteration, temp, tau))]
    pub fn step(&mut self, state: &mut SolverState<'_>, iteration: usize) -> Option<Score> {
        let anneal = &self.config.anneal;
        let stats_cfg = &self.config.stats;
        let alloc_cfg = &self.config.alloc;

        let temp = anneal.temperature(iteration);
        let norm = (temp / anneal.initial_temperature).clamp(0.0, 1.0);
        let tau = alloc_cfg.softmax_tau_min
            + (alloc_cfg.softmax_tau_max - alloc_cfg.softmax_tau_min) * norm;

        tracing::Span::current().record("iteration", iteration);
        tracing::Span::current().record("temp", temp);
        tracing::Span::current().record("tau", tau);

        let alloc = softmax_alloc(
            &self
                .operator_records
                .iter()
                .map(|r| r.stats.clone())
                .collect::<Vec<_>>(),
            alloc_cfg,
            stats_cfg,
            tau,
        );

        let jobs: Vec<(usize, usize)> = alloc
            .iter()
            .enumerate()
            .flat_map(|(op_idx, &n)| (0..n).map(move |k| (op_idx, k)))
            .collect();
        if jobs.is_empty() {
            trace!("No operators selected for this round");
            return None;
        }

        let base_seed = self.config.random.seed_base_task ^ (iteration as u64);
        let records = &self.operator_records;
        let shared: &SolverState<'_> = state;

        // Job order is preserved by collect, so the outcome does not depend
        // on thread scheduling.
        let candidates: Vec<Candidate> = jobs
            .par_iter()
            .filter_map(|&(op_idx, k)| {
                let mut rng = make_job_rng(base_seed, op_idx, k, iteration);
                let mv = records[op_idx]
                    .operator
                    .propose(iteration, &mut rng, shared)?;
                Some(Candidate {
                    op_idx,
                    mv,
                    delta: shared.delta(&mv),
                })
            })
            .collect();

        if candidates.is_empty() {
            trace!("All operators came back empty");
            return None;
        }

        for c in &candidates {
            self.operator_records[c.op_idx].stats_mut().on_attempt();
        }
        self.proposals_made += candidates.len() as u64;

        // Best delta wins, earliest proposal on ties.
        let winner = candidates
            .iter()
            .skip(1)
            .fold(candidates[0], |best, c| if c.delta > best.delta { *c } else { best });

        let p = acceptance_prob(winner.delta, &self.config.weights, temp);
        if p < 1.0 && self.select_rng.random::<f64>() >= p {
            trace!(delta = %winner.delta, p, "Rejected winner");
            return None;
        }

        let op_name = self.operator_records[winner.op_idx].operator.name();
        debug!(op = op_name, mv = %winner.mv, delta = %winner.delta, "Applying move");
        state.apply(&winner.mv);
        self.operator_records[winner.op_idx].stats_mut().on_accept(
            winner.delta,
            &self.config.weights,
            self.config.stats.reward_alpha,
        );
        Some(winner.delta)
    }
}

impl<S> Solver for MetaEngine<S>
where
    S: ConstructiveSolver + Sync,
{
    type SolveError = MetaEngineError<S::SolveError>;

    #[instrument(skip_all, fields(shifts = problem.shift_count(), employees = problem.employee_count()))]
    fn solve(&mut self, problem: &Problem) -> Result<Allocation, Self::SolveError> {
        self.phase = SolverPhase::Unsolved;
        self.proposals_made = 0;
        self.select_rng = ChaCha8Rng::seed_from_u64(self.config.random.seed_base_select);
        let t0 = Instant::now();

        self.enter_next_phase();
        let mut state = self
            .construction_solver
            .build_state(problem)
            .map_err(MetaEngineError::ConstructionError)?;
        let construction_score = state.score();
        info!(score = %construction_score, "Construction finished");

        self.enter_next_phase();
        let budget = self.config.effective_time_limit();
        let max_iterations = self.config.max_iterations;
        let searchable = problem.shift_count() > 0 && problem.employee_count() > 0;

        let mut best_score = state.score();
        let mut best_bindings: Vec<Option<EmployeeIndex>> = state.bindings().to_vec();
        let mut accepted: u64 = 0;
        let mut improvements: u64 = 0;
        let mut iter: usize = 0;

        while searchable && !best_score.is_perfect() {
            if max_iterations.is_some_and(|m| iter as u64 >= m) {
                break;
            }
            if budget.is_some_and(|b| t0.elapsed() >= b) {
                break;
            }
            if self.step(&mut state, iter).is_some() {
                accepted += 1;
                if state.score() > best_score {
                    best_score = state.score();
                    best_bindings.copy_from_slice(state.bindings());
                    improvements += 1;
                    debug!(%best_score, iteration = iter, "New best score");
                }
            }
            iter += 1;
        }

        self.enter_next_phase();
        let stats = RunStatistics {
            iterations: iter as u64,
            proposals: self.proposals_made,
            accepted,
            improvements,
            construction_score,
            best_score,
            elapsed: t0.elapsed(),
        };
        info!(
            iterations = stats.iterations,
            proposals = stats.proposals,
            accepted = stats.accepted,
            temperature = self.config.anneal.temperature(iter),
            score = %best_score,
            "Meta solve finished",
        );
        self.last_run = Some(stats);

        Ok(Allocation::new(best_bindings, best_score))
    }
}

#[inline]
fn ewma(prev: f64, x: f64, alpha: f64) -> f64 {
    if prev == 0.0 {
        x
    } else {
        alpha * x + (1.0 - alpha) * prev
    }
}

fn softmax_alloc(
    stats: &[OperatorStats],
    alloc: &AllocationConfig,
    stats_cfg: &StatsConfig,
    tau: f64,
) -> Vec<usize> {
    if stats.is_empty() {
        return vec![];
    }

    let raw: Vec<f64> = stats
        .iter()
        .map(|s| s.success_rate(stats_cfg.bootstrap_success_rate))
        .collect();

    let maxv = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let t = tau.max(1e-6);
    let exps: Vec<f64> = raw.iter().map(|&v| ((v - maxv) / t).exp()).collect();
    let sum: f64 = exps.iter().sum::<f64>().max(alloc.softmax_eps);

    exps.into_iter()
        .map(|w| (w / sum) * alloc.proposals_per_round as f64)
        .map(|x| x.round() as usize)
        .map(|a| a.clamp(alloc.min_per_op, alloc.max_per_op))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constraints::tests::{any_all_month, at, sample_problem, shift},
        greedy::GreedySolver,
        meta::oplib::prelude::op_list,
    };
    use shift_alloc_model::{employee::Employee, id::EmployeeId, problem::ProblemBuilder};
    use static_assertions::assert_impl_all;

    type S = GreedySolver;

    assert_impl_all!(OperatorRecord: Send, Sync);
    assert_impl_all!(MetaEngine<S>: Send, Sync);
    assert_impl_all!(OperatorStats: Send, Sync);
    assert_impl_all!(SolverState<'static>: Send, Sync);

    fn engine(iterations: u64, problem: &Problem) -> MetaEngine<S> {
        let config = MetaConfig::default()
            .with_time_limit(None)
            .with_max_iterations(Some(iterations));
        MetaEngine::new(config, op_list(problem), GreedySolver::new())
    }

    #[test]
    fn test_acceptance_prob_accepts_improvements_and_decays_with_temperature() {
        let w = ScoreWeights::default();
        assert_eq!(acceptance_prob(Score::of_soft(1), &w, 1.0), 1.0);
        assert_eq!(acceptance_prob(Score::ZERO, &w, 1.0), 1.0);
        let hot = acceptance_prob(Score::of_soft(-1), &w, 100.0);
        let cold = acceptance_prob(Score::of_soft(-1), &w, 0.1);
        assert!(hot > cold);
        assert!(acceptance_prob(Score::of_hard(-1), &w, 1.0) < 1e-9);
    }

    #[test]
    fn test_softmax_alloc_respects_bounds() {
        let cfg = AllocationConfig::default();
        let stats = vec![OperatorStats::default(); 3];
        let out = softmax_alloc(&stats, &cfg, &StatsConfig::default(), 0.1);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&n| n >= cfg.min_per_op && n <= cfg.max_per_op));
        assert!(softmax_alloc(&[], &cfg, &StatsConfig::default(), 0.1).is_empty());
    }

    #[test]
    fn test_feasible_instance_reaches_zero_hard() {
        let p = sample_problem();
        let mut engine = engine(3_000, &p);
        let alloc = engine.solve(&p).unwrap();
        assert_eq!(alloc.score().hard(), 0, "{alloc}");
        assert_eq!(engine.phase(), SolverPhase::Terminated);
        let run = engine.last_run().unwrap();
        assert!(run.best_score() >= run.construction_score());
        let state = SolverState::from_bindings(
            crate::constraints::ScoringContext::new(&p),
            alloc.bindings().to_vec(),
        );
        assert_eq!(state.score(), alloc.score());
    }

    #[test]
    fn test_overlapping_shifts_with_one_employee_stay_infeasible_and_terminate() {
        let mut b = ProblemBuilder::new();
        b.add_employee(Employee::new(EmployeeId::new("solo"), "solo@example.com"))
            .unwrap()
            .add_availabilities(&[any_all_month("solo")])
            .unwrap()
            .add_shifts([
                shift("s1", "online", at(12, 9, 0), at(12, 11, 0)),
                shift("s2", "online", at(12, 10, 0), at(12, 12, 0)),
            ])
            .unwrap();
        let p = b.build();
        let config = MetaConfig::default().with_time_limit(Some(Duration::from_millis(200)));
        let mut engine = MetaEngine::new(config, op_list(&p), GreedySolver::new());
        let alloc = engine.solve(&p).unwrap();
        assert!(alloc.score().hard() < 0);
        assert_eq!(alloc.score(), Score::of_hard(-1));
    }

    #[test]
    fn test_same_seed_and_iterations_reproduce_the_allocation() {
        let p = sample_problem();
        let a = engine(400, &p).solve(&p).unwrap();
        let b = engine(400, &p).solve(&p).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_problem_terminates_immediately() {
        let p = Problem::new(vec![], vec![]);
        let mut engine = engine(10, &p);
        let alloc = engine.solve(&p).unwrap();
        assert_eq!(alloc.score(), Score::ZERO);
        assert_eq!(engine.last_run().unwrap().iterations(), 0);
    }
}
