//----------------------------------------
// Root lib
//----------------------------------------
//! Simulation of response-adaptive randomization in multi-arm clinical
//! trials. Two designs are supported: a forward-looking index rule for
//! binary endpoints that re-randomizes in blocks, and an optimal-design
//! rule for normally distributed endpoints with known variances that
//! re-randomizes every patient after an equal-allocation burn-in.
//!
//! Outcomes only inform allocation once they are observable, so enrollment
//! and outcome delays are simulated alongside the responses.

/// Allocation rules and the index tables they read
pub mod allocation;
/// End-of-trial test statistics and hypothesis decisions
pub mod decision;
/// Enrollment times and outcome-observation delays
pub mod enrollment;
/// This module contains error types
pub mod error;
/// Trial configuration
pub mod settings;
/// Trial driver and repeated-simulation summaries
pub mod sim;
/// Per-arm statistics restricted to observed outcomes
pub mod tracker;

pub use allocation::{Allocation, AllocationRule, IndexTable};
pub use error::RarsimErr;
pub use settings::{IndexBlockSettings, OptimalDesignSettings};
pub use sim::{
    OperatingCharacteristics, TrialOutcome, run_index_block_trial, run_n_index_block_trials,
    run_n_optimal_design_trials, run_optimal_design_trial, simulate_index_block_trial,
    simulate_optimal_design_trial,
};
