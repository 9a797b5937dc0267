//----------------------------------------
// tracker mod
//----------------------------------------
pub mod censored;
pub mod types;

pub use censored::{CensoredTracker, recount};
pub use types::{ArmStats, BinaryArm, ContinuousArm};
