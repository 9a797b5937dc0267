//----------------------------------------
// enrollment mod
//----------------------------------------
pub mod accrual;
pub mod delay;
pub mod error;
pub mod types;

pub use accrual::{AccrualGenerator, PiecewiseAccrual, PopulationAccrual};
pub use delay::{DelayModel, DistributionDelay, FixedDelay, NoDelay};
pub use types::EnrollmentRate;

use rand::RngCore;

use crate::enrollment::error::EnrollmentError;
use crate::error::RarsimErr;

/// Draws `n` sorted enrollment times and the matching outcome-observation
/// times. Accrual draws always come before delay draws on `rng`.
pub fn enrollment_schedule(
    n: usize,
    accrual: &dyn AccrualGenerator,
    delay: &dyn DelayModel,
    rng: &mut dyn RngCore,
) -> Result<(Vec<f64>, Vec<f64>), RarsimErr> {
    let mut enroll_times = accrual.generate(n, rng)?;
    if enroll_times.len() < n {
        return Err(EnrollmentError::InsufficientAccrual {
            enrolled: enroll_times.len(),
            needed: n,
        }
        .into());
    }
    enroll_times.truncate(n);
    enroll_times.sort_by(f64::total_cmp);

    let outcome_times = delay.observe_times(&enroll_times, rng)?;
    if outcome_times.len() != n {
        return Err(EnrollmentError::DelayLength {
            expected: n,
            got: outcome_times.len(),
        }
        .into());
    }
    if let Some((patient, (t_out, t_enroll))) = outcome_times
        .iter()
        .zip(enroll_times.iter())
        .enumerate()
        .find(|(_, (t_out, t_enroll))| !(t_out.is_finite() && t_out >= t_enroll))
    {
        return Err(EnrollmentError::BadDelay {
            patient,
            delay: t_out - t_enroll,
        }
        .into());
    }

    Ok((enroll_times, outcome_times))
}
