//----------------------------------------
// Enrollment errors
//----------------------------------------

use crate::error::RarsimErr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EnrollmentError {
    #[error(
        "lengths of enrollment times and rates don't match (times length {time_length}, \
        rates length {rate_length})"
    )]
    TimeRateLengths {
        time_length: usize,
        rate_length: usize,
    },
    #[error("no enrollment rates were given")]
    NoRates,
    #[error("enrollment times should start at or after 0 and be increasing")]
    BadTimes,
    #[error("enrollment rates should be non-negative and finite; got {0}")]
    BadRate(f64),
    #[error("final enrollment rate should be positive; got {0}")]
    BadFinalRate(f64),
    #[error("enrollment probability should be in (0, 1]; got {0}")]
    BadEnrollProbability(f64),
    #[error(
        "only {enrolled} of {needed} patients enrolled from the population; \
        increase the population cap or enrollment rate"
    )]
    InsufficientAccrual { enrolled: usize, needed: usize },
    #[error("outcome delay for patient {patient} is negative or not finite ({delay})")]
    BadDelay { patient: usize, delay: f64 },
    #[error("delay model returned {got} outcome times for {expected} patients")]
    DelayLength { expected: usize, got: usize },
}

impl From<EnrollmentError> for RarsimErr {
    fn from(e: EnrollmentError) -> Self {
        RarsimErr::Enrollment(e)
    }
}
