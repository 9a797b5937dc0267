//----------------------------------------
// Crate error type
//----------------------------------------
pub use crate::decision::error::DecisionError;
pub use crate::enrollment::error::EnrollmentError;
pub use crate::settings::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RarsimErr {
    #[error("while validating trial configuration: {0}")]
    Config(ConfigError),
    #[error("while simulating enrollment: {0}")]
    Enrollment(EnrollmentError),
    #[error("while computing trial decision: {0}")]
    Decision(DecisionError),
}
