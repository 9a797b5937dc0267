//----------------------------------------
// decision errors
//----------------------------------------
use crate::error::RarsimErr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DecisionError {
    #[error("variance of the comparison of arm {arm} with control is degenerate ({variance})")]
    DegenerateVariance { arm: usize, variance: f64 },
    #[error("arm {0} has no patients")]
    EmptyArm(usize),
}

impl From<DecisionError> for RarsimErr {
    fn from(e: DecisionError) -> Self {
        RarsimErr::Decision(e)
    }
}
