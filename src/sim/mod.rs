//----------------------------------------
// sim mod
//----------------------------------------
pub mod driver;
pub mod repeat;
pub mod types;

pub use driver::{
    run_index_block_trial, run_optimal_design_trial, simulate_index_block_trial,
    simulate_optimal_design_trial,
};
pub use repeat::{OperatingCharacteristics, run_n_index_block_trials, run_n_optimal_design_trials};
pub use types::{Assignment, Outcome, PatientRecord, TrialOutcome, TrialPhase};
