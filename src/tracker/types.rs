use serde::{Deserialize, Serialize};

/// Running per-arm summary that can absorb one observed response at a time
pub trait ArmStats {
    fn observe(&mut self, value: f64);
    /// Number of observed responses
    fn n(&self) -> u64;
}

/// Observed successes and failures of a Bernoulli arm. The Beta(1, 1) prior
/// is added on top by the accessors, never stored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryArm {
    pub successes: u64,
    pub failures: u64,
}

impl BinaryArm {
    pub fn new(successes: u64, failures: u64) -> Self {
        Self {
            successes,
            failures,
        }
    }

    /// Posterior Beta shape parameters
    pub fn alpha(&self) -> f64 {
        self.successes as f64 + 1.
    }

    pub fn beta(&self) -> f64 {
        self.failures as f64 + 1.
    }

    /// Prior-inflated sample size
    pub fn posterior_n(&self) -> f64 {
        self.alpha() + self.beta()
    }

    pub fn posterior_mean(&self) -> f64 {
        self.alpha() / self.posterior_n()
    }
}

impl ArmStats for BinaryArm {
    fn observe(&mut self, value: f64) {
        if value > 0.5 {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }

    fn n(&self) -> u64 {
        self.successes + self.failures
    }
}

/// Normal arm with known standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousArm {
    n: u64,
    mean: f64,
    sd: f64,
}

impl ContinuousArm {
    pub fn new(sd: f64) -> Self {
        Self { n: 0, mean: 0., sd }
    }

    /// `None` until the first response is observed
    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    pub fn sd(&self) -> f64 {
        self.sd
    }
}

impl ArmStats for ContinuousArm {
    fn observe(&mut self, value: f64) {
        self.n += 1;
        self.mean += (value - self.mean) / self.n as f64;
    }

    fn n(&self) -> u64 {
        self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_posterior() {
        let mut arm = BinaryArm::default();
        [1., 1., 0., 1.].iter().for_each(|&y| arm.observe(y));
        assert_eq!(arm, BinaryArm::new(3, 1));
        assert_eq!(arm.n(), 4);
        assert_eq!(arm.posterior_n(), 6.);
        assert!((arm.posterior_mean() - 4. / 6.).abs() < 1e-12);
    }

    #[test]
    fn continuous_running_mean() {
        let mut arm = ContinuousArm::new(2.0);
        assert_eq!(arm.mean(), None);
        [1.0, 2.0, 6.0].iter().for_each(|&y| arm.observe(y));
        assert_eq!(arm.n(), 3);
        assert!((arm.mean().expect("mean should exist") - 3.0).abs() < 1e-12);
        assert_eq!(arm.sd(), 2.0);
    }
}
