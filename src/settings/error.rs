//----------------------------------------
// Configuration errors
//----------------------------------------
use crate::error::RarsimErr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("at least 2 arms are required; got {0}")]
    TooFewArms(usize),
    #[error("length of {name} ({got}) doesn't match number of arms ({arms})")]
    ArmCountMismatch {
        name: &'static str,
        arms: usize,
        got: usize,
    },
    #[error("{0} should be positive")]
    NonPositiveSize(&'static str),
    #[error("{name} should be in [0, 1]; got {value}")]
    ProbabilityOutOfBounds { name: &'static str, value: f64 },
    #[error("standard deviation of arm {arm} should be positive and finite; got {value}")]
    BadStandardDeviation { arm: usize, value: f64 },
    #[error("{name} should be finite; got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("burn-in size ({n1}) exceeds total sample size ({n2})")]
    BurnInTooLarge { n1: usize, n2: usize },
    #[error("index table ({rows} x {cols}) can't address success/failure counts up to {needed}")]
    IndexTableTooSmall {
        rows: usize,
        cols: usize,
        needed: usize,
    },
    #[error("index table row {row} has {got} columns; expected {expected}")]
    RaggedIndexTable {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("discount factor should be in (0, 1); got {0}")]
    BadDiscount(f64),
    #[error("controlled index rule needs at least 3 arms; got {0}")]
    ControlledRuleArms(usize),
}

impl From<ConfigError> for RarsimErr {
    fn from(e: ConfigError) -> Self {
        RarsimErr::Config(e)
    }
}
