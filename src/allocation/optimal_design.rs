use rand::RngCore;

use crate::allocation::{Allocation, AllocationRule, CutPoints};
use crate::decision::std_normal::std_normal_cdf;
use crate::settings::TestSide;
use crate::tracker::types::{ArmStats, ContinuousArm};

// Floor on the tail weights so an arm that looks perfect keeps a finite share
const MIN_TAIL_WEIGHT: f64 = 1e-10;

/// Search for target allocation proportions given the current arm means.
/// Arm 0 is the control.
pub trait DesignTarget {
    fn target(&self, means: &[f64], sds: &[f64], cc: f64, side: TestSide) -> Vec<f64>;
}

/// Minimizes the expected number of patients responding on the wrong side
/// of `cc`, subject to a fixed total variance of the comparisons with control.
///
/// Each arm's share is `sd_k / sqrt(w_k)` for a tail weight `w_k`:
/// - control: the one-sided tail on the poor side of `cc`, `P(Y_0 < cc)`
///   (or `P(Y_0 > cc)` when smaller is better);
/// - treatment: the two-sided tail `2 * P(Z > |mu_k - cc| / sd_k)`, which
///   shrinks as the arm moves away from `cc` in either direction.
///
/// The control appears in all `K - 1` comparisons, so its share is also
/// inflated by `sqrt(K - 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TailWeightedNeyman;

impl TailWeightedNeyman {
    pub fn control_weight(mean: f64, sd: f64, cc: f64, side: TestSide) -> f64 {
        let z = match side {
            TestSide::Upper => (cc - mean) / sd,
            TestSide::Lower => (mean - cc) / sd,
        };
        std_normal_cdf(z).max(MIN_TAIL_WEIGHT)
    }

    pub fn treatment_weight(mean: f64, sd: f64, cc: f64) -> f64 {
        (2. * std_normal_cdf(-(mean - cc).abs() / sd)).max(MIN_TAIL_WEIGHT)
    }
}

impl DesignTarget for TailWeightedNeyman {
    fn target(&self, means: &[f64], sds: &[f64], cc: f64, side: TestSide) -> Vec<f64> {
        let comparisons = (means.len().max(2) - 1) as f64;
        let raw: Vec<f64> = means
            .iter()
            .zip(sds.iter())
            .enumerate()
            .map(|(k, (&mean, &sd))| {
                if k == 0 {
                    sd / TailWeightedNeyman::control_weight(mean, sd, cc, side).sqrt()
                        * comparisons.sqrt()
                } else {
                    sd / TailWeightedNeyman::treatment_weight(mean, sd, cc).sqrt()
                }
            })
            .collect();
        let total: f64 = raw.iter().sum();
        raw.into_iter().map(|r| r / total).collect()
    }
}

/// Per-patient optimal-design allocation for normal arms with known
/// variances. Falls back to equal randomization until every arm has at least
/// one observed response.
#[derive(Debug, Clone)]
pub struct OptimalDesignRule<T = TailWeightedNeyman> {
    cc: f64,
    side: TestSide,
    target: T,
}

impl OptimalDesignRule<TailWeightedNeyman> {
    pub fn new(cc: f64, side: TestSide) -> Self {
        OptimalDesignRule::with_target(cc, side, TailWeightedNeyman)
    }
}

impl<T: DesignTarget> OptimalDesignRule<T> {
    pub fn with_target(cc: f64, side: TestSide, target: T) -> Self {
        Self { cc, side, target }
    }

    /// Target proportions, or `None` when some arm has no observed response
    pub fn probabilities(&self, arms: &[ContinuousArm]) -> Option<Vec<f64>> {
        let means = arms.iter().map(ContinuousArm::mean).collect::<Option<Vec<f64>>>()?;
        let sds: Vec<f64> = arms.iter().map(ContinuousArm::sd).collect();
        Some(self.target.target(&means, &sds, self.cc, self.side))
    }
}

impl<T: DesignTarget> AllocationRule for OptimalDesignRule<T> {
    type Arm = ContinuousArm;

    fn propose(&self, arms: &[ContinuousArm], rng: &mut dyn RngCore) -> Allocation {
        if arms.iter().all(|a| a.n() == 0) {
            return Allocation::Equal;
        }
        match self.probabilities(arms) {
            Some(p) => Allocation::Arm(CutPoints::from_probabilities(&p).draw(rng)),
            None => Allocation::Equal,
        }
    }
}
