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

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    pub bootstrap_success_rate: f64,
    pub reward_alpha: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            bootstrap_success_rate: 0.05,
            reward_alpha: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationConfig {
    pub proposals_per_round: usize,
    pub min_per_op: usize,
    pub max_per_op: usize,
    pub softmax_tau_min: f64,
    pub softmax_tau_max: f64,
    pub softmax_eps: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            proposals_per_round: 48,
            min_per_op: 4,
            max_per_op: 32,
            softmax_tau_min: 0.02,
            softmax_tau_max: 0.25,
            softmax_eps: 1e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub min_temperature: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 50.0,
            cooling_rate: 0.9995,
            min_temperature: 1e-3,
        }
    }
}

impl AnnealingConfig {
    #[inline]
    pub fn temperature(&self, iteration: usize) -> f64 {
        let exp = i32::try_from(iteration).unwrap_or(i32::MAX);
        (self.initial_temperature * self.cooling_rate.powi(exp)).max(self.min_temperature)
    }
}

/// Scalarization of a score for the annealing acceptance test only.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    pub hard: f64,
    pub medium: f64,
    pub soft: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hard: 10_000.0,
            medium: 100.0,
            soft: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomConfig {
    pub seed_base_task: u64,
    pub seed_base_select: u64,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            seed_base_task: 0x00C0_FFEE_D00D,
            seed_base_select: 0xDEADBEEF,
        }
    }
}

impl RandomConfig {
    /// Derives both seeds from one user-supplied value.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed_base_task: seed,
            seed_base_select: seed.rotate_left(32) ^ 0xDEADBEEF,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaConfig {
    pub time_limit: Option<Duration>,
    pub max_iterations: Option<u64>,
    pub stats: StatsConfig,
    pub alloc: AllocationConfig,
    pub anneal: AnnealingConfig,
    pub weights: ScoreWeights,
    pub random: RandomConfig,
}

impl MetaConfig {
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

    #[must_use]
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max: Option<u64>) -> Self {
        self.max_iterations = max;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random = RandomConfig::from_seed(seed);
        self
    }

    /// The wall-clock budget to enforce; the default applies when no limit
    /// of either kind is set.
    #[inline]
    pub fn effective_time_limit(&self) -> Option<Duration> {
        match (self.time_limit, self.max_iterations) {
            (None, None) => Some(Self::DEFAULT_TIME_LIMIT),
            (limit, _) => limit,
        }
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(Self::DEFAULT_TIME_LIMIT),
            max_iterations: None,
            stats: StatsConfig::default(),
            alloc: AllocationConfig::default(),
            anneal: AnnealingConfig::default(),
            weights: ScoreWeights::default(),
            random: RandomConfig::default(),
        }
    }
}
