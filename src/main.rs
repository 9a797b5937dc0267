use std::error::Error;
use std::time::Instant;

use rarsim::enrollment::{EnrollmentRate, FixedDelay, NoDelay, PiecewiseAccrual, PopulationAccrual};
use rarsim::{
    IndexBlockSettings, IndexTable, OptimalDesignSettings, run_index_block_trial,
    run_n_optimal_design_trials,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Binary endpoint, two arms, blocks of 20
    let settings = IndexBlockSettings::default();
    let table = IndexTable::brezzi_lai(0.995, settings.tsize + 1)?;
    let accrual = PopulationAccrual::new(
        5000.,  // pats (population arrival rate)
        20_000, // n_max
        0.1,    // enroll_rate
    )?;
    let start = Instant::now();
    let trial = run_index_block_trial(&settings, &table, &accrual, &FixedDelay(0.01), 24601)?;
    info!(elapsed = ?start.elapsed(), "single index-block trial");
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "arm_counts": trial.arm_counts,
        "statistics": trial.statistics,
        "decisions": trial.decisions,
        "best_arm": trial.best_arm,
    }))?);

    // Continuous endpoint under the global null
    let settings = OptimalDesignSettings::default();
    let accrual = PiecewiseAccrual(EnrollmentRate::new(
        vec![0.0, 3.0, 7.0],  // times
        vec![5.0, 10.0, 20.0], // rates
    )?);
    let start = Instant::now();
    let summary = run_n_optimal_design_trials(1000, &settings, &accrual, &NoDelay, 24601)?;
    info!(elapsed = ?start.elapsed(), "1000 optimal-design trials");
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "rejection_rates": summary.rejection_rates(),
        "any_rejection_rate": summary.any_rejection_rate(),
        "mean_arm_counts": summary.mean_arm_counts(),
        "mean_fallbacks": summary.mean_fallbacks(),
    }))?);

    Ok(())
}
