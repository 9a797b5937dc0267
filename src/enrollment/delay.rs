use rand::{RngCore, distributions::Distribution};

use crate::error::RarsimErr;

/// Maps enrollment times to the times at which each patient's outcome can be
/// observed
pub trait DelayModel {
    fn observe_times(&self, enroll_times: &[f64], rng: &mut dyn RngCore)
    -> Result<Vec<f64>, RarsimErr>;
}

/// Outcomes are observed immediately at enrollment
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayModel for NoDelay {
    fn observe_times(
        &self,
        enroll_times: &[f64],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, RarsimErr> {
        Ok(enroll_times.to_vec())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub f64);

impl DelayModel for FixedDelay {
    fn observe_times(
        &self,
        enroll_times: &[f64],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, RarsimErr> {
        Ok(enroll_times.iter().map(|t| t + self.0).collect())
    }
}

/// Delay drawn independently per patient from any sampleable distribution,
/// e.g. `statrs::distribution::Exp` or `Uniform`
#[derive(Debug, Clone)]
pub struct DistributionDelay<D>(pub D);

impl<D: Distribution<f64>> DelayModel for DistributionDelay<D> {
    fn observe_times(
        &self,
        enroll_times: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, RarsimErr> {
        Ok(enroll_times
            .iter()
            .map(|t| t + self.0.sample(rng))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs};
    use statrs::distribution::{Exp, Uniform};

    #[test]
    fn no_delay_is_identity() {
        let mut rng = rngs::StdRng::seed_from_u64(1);
        let t = vec![0.5, 1.0, 2.0];
        assert_eq!(NoDelay.observe_times(&t, &mut rng), Ok(t.clone()));
    }

    #[test]
    fn uniform_delay_within_bounds() {
        let mut rng = rngs::StdRng::seed_from_u64(24601);
        let delay = DistributionDelay(Uniform::new(1.0, 3.0).expect("valid uniform"));
        let t: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let out = delay.observe_times(&t, &mut rng).expect("failed to draw delays");
        assert!(
            t.iter()
                .zip(out.iter())
                .all(|(e, o)| o - e >= 1.0 && o - e <= 3.0)
        );
    }

    #[test]
    fn exponential_delay_mean() {
        let mut rng = rngs::StdRng::seed_from_u64(3);
        let delay = DistributionDelay(Exp::new(0.5).expect("valid exp"));
        let t = vec![0.0; 4000];
        let out = delay.observe_times(&t, &mut rng).expect("failed to draw delays");
        let mean = out.iter().sum::<f64>() / out.len() as f64;
        assert!((mean - 2.0).abs() < 0.2, "mean delay {mean}");
    }
}
