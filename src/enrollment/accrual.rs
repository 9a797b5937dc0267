use rand::{Rng, RngCore, distributions::Distribution};
use serde::{Deserialize, Serialize};
use statrs::distribution::Exp;

use crate::enrollment::{error::EnrollmentError, types::EnrollmentRate};
use crate::error::RarsimErr;

/// Source of patient enrollment times. Implementations return times sorted
/// ascending and at least `n` of them when they can; the caller rejects short
/// schedules.
pub trait AccrualGenerator {
    fn generate(&self, n: usize, rng: &mut dyn RngCore) -> Result<Vec<f64>, RarsimErr>;
}

/// A population arriving as a Poisson process with `pats` arrivals per unit
/// time, capped at `n_max` members. Each member enrolls independently with
/// probability `enroll_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationAccrual {
    pats: f64,
    n_max: usize,
    enroll_rate: f64,
}

impl PopulationAccrual {
    pub fn new(pats: f64, n_max: usize, enroll_rate: f64) -> Result<Self, RarsimErr> {
        if !(pats.is_finite() && pats > 0.0) {
            return Err(EnrollmentError::BadRate(pats).into());
        }
        if !(enroll_rate > 0.0 && enroll_rate <= 1.0) {
            return Err(EnrollmentError::BadEnrollProbability(enroll_rate).into());
        }
        Ok(Self {
            pats,
            n_max,
            enroll_rate,
        })
    }
}

impl AccrualGenerator for PopulationAccrual {
    fn generate(&self, n: usize, rng: &mut dyn RngCore) -> Result<Vec<f64>, RarsimErr> {
        let gap = Exp::new(self.pats).map_err(|_| EnrollmentError::BadRate(self.pats))?;
        let mut t = 0.0;
        let mut enrolled = Vec::with_capacity(n);
        for _ in 0..self.n_max {
            t += gap.sample(rng);
            let u: f64 = rng.r#gen();
            if u < self.enroll_rate {
                enrolled.push(t);
                if enrolled.len() == n {
                    break;
                }
            }
        }
        Ok(enrolled)
    }
}

/// Poisson accrual with a piecewise-constant intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseAccrual(pub EnrollmentRate);

impl AccrualGenerator for PiecewiseAccrual {
    fn generate(&self, n: usize, rng: &mut dyn RngCore) -> Result<Vec<f64>, RarsimErr> {
        // Unit-rate arrivals on the cumulative-intensity scale
        let unit = Exp::new(1.0).map_err(|_| EnrollmentError::BadRate(1.0))?;
        let mut cumulative = 0.0;
        Ok((0..n)
            .map(|_| {
                cumulative += unit.sample(rng);
                self.0.invert_cumulative(cumulative)
            })
            .collect())
    }
}
