use crate::decision::error::DecisionError;
use crate::decision::std_normal::std_normal_cdf;
use crate::error::RarsimErr;
use crate::settings::TestSide;
use crate::tracker::types::{ArmStats, ContinuousArm};

/// Z statistics of each treatment arm against control (arm 0) with known
/// standard deviations
pub fn continuous_z_statistics(arms: &[ContinuousArm]) -> Result<Vec<f64>, RarsimErr> {
    let Some((control, treatments)) = arms.split_first() else {
        return Ok(vec![]);
    };
    let ctrl_mean = control.mean().ok_or(DecisionError::EmptyArm(0))?;
    let ctrl_var = control.sd().powi(2) / control.n() as f64;

    treatments
        .iter()
        .enumerate()
        .map(|(i, arm)| -> Result<f64, RarsimErr> {
            let mean = arm.mean().ok_or(DecisionError::EmptyArm(i + 1))?;
            let variance = ctrl_var + arm.sd().powi(2) / arm.n() as f64;
            if !(variance.is_finite() && variance > 0.) {
                return Err(DecisionError::DegenerateVariance {
                    arm: i + 1,
                    variance,
                }
                .into());
            }
            Ok((mean - ctrl_mean) / variance.sqrt())
        })
        .collect()
}

/// Rejects when the one-sided normal p-value falls below `alpha / (K - 1)`
pub fn bonferroni_decisions(statistics: &[f64], alpha: f64, side: TestSide) -> Vec<bool> {
    let level = alpha / statistics.len().max(1) as f64;
    statistics
        .iter()
        .map(|&z| {
            let p_value = match side {
                TestSide::Upper => 1. - std_normal_cdf(z),
                TestSide::Lower => std_normal_cdf(z),
            };
            p_value < level
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(sd: f64, ys: &[f64]) -> ContinuousArm {
        let mut a = ContinuousArm::new(sd);
        ys.iter().for_each(|&y| a.observe(y));
        a
    }

    #[test]
    fn known_variance_statistic() {
        let arms = [arm(2.0, &[1.0, 3.0]), arm(1.0, &[4.0, 5.0, 6.0, 5.0])];
        let z = continuous_z_statistics(&arms).unwrap();
        let expected = (5.0 - 2.0) / (4.0 / 2.0 + 1.0 / 4.0_f64).sqrt();
        assert!((z[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_arm_error() {
        let arms = [arm(1.0, &[0.0]), arm(1.0, &[])];
        if let Err(e) = continuous_z_statistics(&arms) {
            assert_eq!(
                String::from("while computing trial decision: arm 1 has no patients"),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn bonferroni_splits_alpha() {
        // 2.1 clears 0.025 one-sided but not 0.0125
        let z = [2.1, 2.3];
        assert_eq!(bonferroni_decisions(&z, 0.025, TestSide::Upper), vec![false, true]);
        assert_eq!(bonferroni_decisions(&[2.1], 0.025, TestSide::Upper), vec![true]);
        assert_eq!(bonferroni_decisions(&[-2.3], 0.025, TestSide::Lower), vec![true]);
        assert_eq!(bonferroni_decisions(&[-2.3], 0.025, TestSide::Upper), vec![false]);
    }
}
