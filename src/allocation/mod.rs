//----------------------------------------
// allocation mod
//----------------------------------------
pub mod index_block;
pub mod index_table;
pub mod optimal_design;

pub use index_block::IndexBlockRule;
pub use index_table::IndexTable;
pub use optimal_design::{DesignTarget, OptimalDesignRule, TailWeightedNeyman};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// What an allocation rule hands back to the driver
#[derive(Debug, Clone, PartialEq)]
pub enum Allocation {
    /// Assignment probabilities over all arms
    Probabilities(Vec<f64>),
    /// An arm already drawn by the rule
    Arm(usize),
    /// Not enough observed data; randomize equally
    Equal,
}

/// A response-adaptive allocation policy. `propose` only ever sees the
/// censored per-arm statistics, never the true response distributions.
pub trait AllocationRule {
    type Arm;

    fn propose(&self, arms: &[Self::Arm], rng: &mut dyn RngCore) -> Allocation;
}

impl Allocation {
    pub fn cut_points(&self, k: usize) -> CutPoints {
        match self {
            Allocation::Probabilities(p) => CutPoints::from_probabilities(p),
            Allocation::Arm(arm) => {
                CutPoints::from_probabilities(&(0..k).map(|i| f64::from(i == *arm)).collect::<Vec<_>>())
            }
            Allocation::Equal => CutPoints::equal(k),
        }
    }

    /// Resolves the allocation into a single arm, drawing at most one uniform
    pub fn draw(&self, k: usize, rng: &mut dyn RngCore) -> usize {
        match self {
            Allocation::Arm(arm) => *arm,
            _ => self.cut_points(k).draw(rng),
        }
    }
}

/// Cumulative probability boundaries for inverse-CDF sampling over arms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPoints(Vec<f64>);

impl CutPoints {
    pub fn from_probabilities(probs: &[f64]) -> Self {
        let total: f64 = probs.iter().sum();
        let mut acc = 0.0;
        let mut cuts: Vec<f64> = probs
            .iter()
            .map(|p| {
                acc += p / total;
                acc
            })
            .collect();
        // Last boundary is exactly 1 despite rounding
        if let Some(last) = cuts.last_mut() {
            *last = 1.0;
        }
        CutPoints(cuts)
    }

    pub fn equal(k: usize) -> Self {
        CutPoints::from_probabilities(&vec![1.0; k])
    }

    pub fn probabilities(&self) -> Vec<f64> {
        let mut prev = 0.0;
        self.0
            .iter()
            .map(|c| {
                let p = c - prev;
                prev = *c;
                p
            })
            .collect()
    }

    pub fn arm_for(&self, u: f64) -> usize {
        self.0
            .iter()
            .position(|&c| u < c)
            .unwrap_or(self.0.len().saturating_sub(1))
    }

    pub fn draw(&self, rng: &mut dyn RngCore) -> usize {
        self.arm_for(rng.r#gen::<f64>())
    }
}
