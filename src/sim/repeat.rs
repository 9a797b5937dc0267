use rand::{RngCore, SeedableRng, rngs};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocation::IndexTable;
use crate::enrollment::{AccrualGenerator, DelayModel};
use crate::error::RarsimErr;
use crate::settings::{IndexBlockSettings, OptimalDesignSettings};
use crate::sim::driver::{simulate_index_block_trial, simulate_optimal_design_trial};
use crate::sim::types::TrialOutcome;

/// Tallies over repeated simulated trials of one design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingCharacteristics {
    pub n_sims: usize,
    /// Rejections of each treatment-vs-control hypothesis
    pub rejections: Vec<usize>,
    /// Trials rejecting at least one hypothesis
    pub any_rejections: usize,
    pub total_arm_counts: Vec<usize>,
    /// How often each arm was the final best arm; empty when trials don't
    /// report one
    pub best_arm_counts: Vec<usize>,
    pub fallbacks: usize,
}

impl OperatingCharacteristics {
    pub fn new(arms: usize) -> Self {
        Self {
            n_sims: 0,
            rejections: vec![0; arms.saturating_sub(1)],
            any_rejections: 0,
            total_arm_counts: vec![0; arms],
            best_arm_counts: Vec::new(),
            fallbacks: 0,
        }
    }

    pub fn record(&mut self, outcome: &TrialOutcome) {
        self.n_sims += 1;
        for (tally, &rejected) in self.rejections.iter_mut().zip(outcome.decisions.iter()) {
            *tally += usize::from(rejected);
        }
        self.any_rejections += usize::from(outcome.any_rejected());
        for (total, &count) in self.total_arm_counts.iter_mut().zip(outcome.arm_counts.iter()) {
            *total += count;
        }
        if let Some(best) = outcome.best_arm {
            if self.best_arm_counts.is_empty() {
                self.best_arm_counts = vec![0; self.total_arm_counts.len()];
            }
            self.best_arm_counts[best] += 1;
        }
        self.fallbacks += outcome.fallbacks;
    }

    fn per_sim(&self, count: usize) -> f64 {
        count as f64 / self.n_sims.max(1) as f64
    }

    /// Per-hypothesis rejection rates (power, or Type-I error under the null)
    pub fn rejection_rates(&self) -> Vec<f64> {
        self.rejections.iter().map(|&r| self.per_sim(r)).collect()
    }

    /// Family-wise rejection rate
    pub fn any_rejection_rate(&self) -> f64 {
        self.per_sim(self.any_rejections)
    }

    pub fn mean_arm_counts(&self) -> Vec<f64> {
        self.total_arm_counts.iter().map(|&c| self.per_sim(c)).collect()
    }

    pub fn best_arm_frequencies(&self) -> Option<Vec<f64>> {
        (!self.best_arm_counts.is_empty())
            .then(|| self.best_arm_counts.iter().map(|&c| self.per_sim(c)).collect())
    }

    pub fn mean_fallbacks(&self) -> f64 {
        self.per_sim(self.fallbacks)
    }
}

/// Simulation `i` runs on `StdRng::seed_from_u64(seed + i)`, so any single
/// trial can be replayed on its own
fn run_n_trials<F>(
    n_sims: usize,
    arms: usize,
    seed: u64,
    mut simulate: F,
) -> Result<OperatingCharacteristics, RarsimErr>
where
    F: FnMut(&mut dyn RngCore) -> Result<TrialOutcome, RarsimErr>,
{
    let mut summary = OperatingCharacteristics::new(arms);
    for i in 0..n_sims {
        let mut rng = rngs::StdRng::seed_from_u64(seed.wrapping_add(i as u64));
        summary.record(&simulate(&mut rng)?);
    }
    info!(
        n_sims,
        rejection_rates = ?summary.rejection_rates(),
        any_rejection_rate = summary.any_rejection_rate(),
        mean_arm_counts = ?summary.mean_arm_counts(),
        "simulations complete"
    );
    Ok(summary)
}

pub fn run_n_index_block_trials(
    n_sims: usize,
    settings: &IndexBlockSettings,
    table: &IndexTable,
    accrual: &dyn AccrualGenerator,
    delay: &dyn DelayModel,
    seed: u64,
) -> Result<OperatingCharacteristics, RarsimErr> {
    run_n_trials(n_sims, settings.arms(), seed, |rng| {
        simulate_index_block_trial(settings, table, accrual, delay, rng)
    })
}

pub fn run_n_optimal_design_trials(
    n_sims: usize,
    settings: &OptimalDesignSettings,
    accrual: &dyn AccrualGenerator,
    delay: &dyn DelayModel,
    seed: u64,
) -> Result<OperatingCharacteristics, RarsimErr> {
    run_n_trials(n_sims, settings.arms(), seed, |rng| {
        simulate_optimal_design_trial(settings, accrual, delay, rng)
    })
}
