use crate::allocation::index_table::IndexTable;
use crate::decision::error::DecisionError;
use crate::error::RarsimErr;
use crate::settings::VarianceMode;
use crate::tracker::types::BinaryArm;

/// One-sided Z statistics of each treatment arm against control (arm 0),
/// computed on the Beta(1, 1) posterior success rates
pub fn binary_z_statistics(arms: &[BinaryArm], mode: VarianceMode) -> Result<Vec<f64>, RarsimErr> {
    let Some((control, treatments)) = arms.split_first() else {
        return Ok(vec![]);
    };
    let n_ctrl = control.posterior_n();
    let p_ctrl = control.posterior_mean();

    treatments
        .iter()
        .enumerate()
        .map(|(i, arm)| -> Result<f64, RarsimErr> {
            let n_trt = arm.posterior_n();
            let p_trt = arm.posterior_mean();
            let variance = match mode {
                VarianceMode::Unpooled => {
                    p_ctrl * (1. - p_ctrl) / n_ctrl + p_trt * (1. - p_trt) / n_trt
                }
                VarianceMode::Pooled => {
                    let pooled = (control.alpha() + arm.alpha()) / (n_ctrl + n_trt);
                    pooled * (1. - pooled) * (1. / n_ctrl + 1. / n_trt)
                }
            };
            if !(variance.is_finite() && variance > 0.) {
                return Err(DecisionError::DegenerateVariance {
                    arm: i + 1,
                    variance,
                }
                .into());
            }
            Ok((p_trt - p_ctrl) / variance.sqrt())
        })
        .collect()
}

/// Arm whose index value at its final counts is largest; ties go to the
/// lowest arm. `None` when there are no arms or the table doesn't reach some
/// arm's counts.
pub fn best_index_arm(arms: &[BinaryArm], table: &IndexTable) -> Option<usize> {
    let values = arms
        .iter()
        .map(|a| table.value(a.failures as usize, a.successes as usize))
        .collect::<Option<Vec<f64>>>()?;
    values
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (k, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((k, v)),
        })
        .map(|(k, _)| k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpooled_statistic() {
        let arms = [BinaryArm::new(48, 48), BinaryArm::new(58, 38)];
        let z = binary_z_statistics(&arms, VarianceMode::Unpooled).unwrap();
        let (p0, p1): (f64, f64) = (49. / 98., 59. / 98.);
        let expected = (p1 - p0) / (p0 * (1. - p0) / 98. + p1 * (1. - p1) / 98.).sqrt();
        assert_eq!(z.len(), 1);
        assert!((z[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn pooled_statistic() {
        let arms = [
            BinaryArm::new(10, 30),
            BinaryArm::new(20, 20),
            BinaryArm::new(5, 35),
        ];
        let z = binary_z_statistics(&arms, VarianceMode::Pooled).unwrap();
        let pooled: f64 = (11. + 21.) / 84.;
        let expected = (21. / 42. - 11. / 42.) / (pooled * (1. - pooled) * (2. / 42.)).sqrt();
        assert_eq!(z.len(), 2);
        assert!((z[0] - expected).abs() < 1e-12);
        assert!(z[1] < 0.);
    }

    #[test]
    fn identical_arms_have_zero_statistic() {
        let arms = [BinaryArm::new(7, 3), BinaryArm::new(7, 3)];
        for mode in [VarianceMode::Pooled, VarianceMode::Unpooled] {
            assert_eq!(binary_z_statistics(&arms, mode).unwrap(), vec![0.0]);
        }
    }

    #[test]
    fn best_arm_uses_index_values() {
        let table = IndexTable::posterior_mean(20);
        let arms = [BinaryArm::new(5, 5), BinaryArm::new(9, 1), BinaryArm::new(9, 1)];
        assert_eq!(best_index_arm(&arms, &table), Some(1));
        assert_eq!(best_index_arm(&[], &table), None);
    }

    #[test]
    fn best_arm_outside_table_is_none() {
        let table = IndexTable::posterior_mean(10);
        let arms = [BinaryArm::new(3, 2), BinaryArm::new(10, 0)];
        assert_eq!(best_index_arm(&arms, &table), None);
        assert_eq!(best_index_arm(&arms[..1], &table), Some(0));
    }
}
