use itertools::izip;
use rand::{Rng, RngCore, SeedableRng, distributions::Distribution, rngs};
use statrs::distribution::Normal;
use tracing::{debug, info, trace};

use crate::allocation::{
    Allocation, AllocationRule, CutPoints, IndexBlockRule, IndexTable, OptimalDesignRule,
};
use crate::decision::{
    best_index_arm, binary_z_statistics, bonferroni_decisions, boundary_decisions,
    continuous_z_statistics,
};
use crate::enrollment::{AccrualGenerator, DelayModel, enrollment_schedule};
use crate::error::RarsimErr;
use crate::settings::{IndexBlockSettings, OptimalDesignSettings, error::ConfigError};
use crate::sim::types::{Outcome, PatientRecord, TrialOutcome, TrialPhase};
use crate::tracker::{ArmStats, BinaryArm, CensoredTracker, ContinuousArm};

/// Everything one trial mutates while patients are being allocated
#[derive(Debug)]
pub(crate) struct TrialState<A> {
    patients: Vec<PatientRecord>,
    tracker: CensoredTracker<A>,
    arm_counts: Vec<usize>,
    fallbacks: usize,
    phase: TrialPhase,
}

impl<A: ArmStats> TrialState<A> {
    pub(crate) fn new(
        enroll_times: &[f64],
        outcome_times: &[f64],
        arms: Vec<A>,
        phase: TrialPhase,
    ) -> Self {
        let patients = izip!(1.., enroll_times, outcome_times)
            .map(|(id, &enroll, &outcome)| PatientRecord::new(id, enroll, outcome))
            .collect();
        Self {
            patients,
            arm_counts: vec![0; arms.len()],
            tracker: CensoredTracker::new(arms),
            fallbacks: 0,
            phase,
        }
    }

    /// Arm statistics from outcomes observable when patient `i` enrolls
    fn censor_to(&mut self, i: usize) -> &[A] {
        let clock = self.patients[i].enroll_time;
        self.tracker.advance_to(clock, &self.patients);
        self.tracker.arms()
    }

    fn assign(&mut self, i: usize, arm: usize, outcome: Outcome) {
        self.patients[i].assign(arm, outcome);
        self.tracker.enqueue(i, self.patients[i].outcome_time);
        self.arm_counts[arm] += 1;
    }

    /// Closes the trial with every outcome observed. Decisions are left
    /// empty for the caller to fill in from the returned arm statistics.
    fn finish(mut self) -> (Vec<A>, TrialOutcome) {
        self.tracker.advance_to(f64::INFINITY, &self.patients);
        let outcome = TrialOutcome {
            decisions: Vec::new(),
            statistics: Vec::new(),
            patients: self.patients,
            arm_counts: self.arm_counts,
            best_arm: None,
            fallbacks: self.fallbacks,
            phase: TrialPhase::Complete,
        };
        (self.tracker.into_arms(), outcome)
    }
}

/// Binary responses, allocation probabilities recomputed at the start of each
/// full block. A short last block reuses the previous probabilities.
pub(crate) fn allocate_in_blocks<R>(
    rule: &R,
    ptrue: &[f64],
    block: usize,
    mut state: TrialState<BinaryArm>,
    rng: &mut dyn RngCore,
) -> TrialState<BinaryArm>
where
    R: AllocationRule<Arm = BinaryArm> + ?Sized,
{
    let k = ptrue.len();
    let n = state.patients.len();
    let mut cut_points = CutPoints::equal(k);

    for (b, start) in (0..n).step_by(block).enumerate() {
        let end = (start + block).min(n);
        if b == 0 || end - start == block {
            let allocation = rule.propose(state.censor_to(start), rng);
            if allocation == Allocation::Equal {
                state.fallbacks += 1;
                debug!(block = b, "no usable data; randomizing block equally");
            }
            cut_points = allocation.cut_points(k);
            trace!(
                block = b,
                clock = state.patients[start].enroll_time,
                probabilities = ?cut_points.probabilities(),
                "block allocation"
            );
        }
        for i in start..end {
            let arm = cut_points.draw(rng);
            let u: f64 = rng.r#gen();
            state.assign(i, arm, Outcome::Binary(u < ptrue[arm]));
        }
    }
    state
}

/// Normal responses, one allocation per patient. The first `burn_in`
/// patients are randomized equally.
pub(crate) fn allocate_per_patient<R>(
    rule: &R,
    responses: &[Normal],
    burn_in: usize,
    mut state: TrialState<ContinuousArm>,
    rng: &mut dyn RngCore,
) -> TrialState<ContinuousArm>
where
    R: AllocationRule<Arm = ContinuousArm> + ?Sized,
{
    let k = responses.len();
    for i in 0..state.patients.len() {
        let allocation = if i < burn_in {
            Allocation::Equal
        } else {
            if state.phase == TrialPhase::BurnIn {
                debug!(patient = i + 1, "burn-in complete");
                state.phase = TrialPhase::Adaptive;
            }
            let allocation = rule.propose(state.censor_to(i), rng);
            if allocation == Allocation::Equal {
                state.fallbacks += 1;
                debug!(
                    patient = i + 1,
                    observed = state.tracker.observed(),
                    pending = state.tracker.pending(),
                    "arm without observed response; randomizing equally"
                );
            }
            allocation
        };
        let arm = allocation.draw(k, rng);
        let y = responses[arm].sample(rng);
        trace!(patient = i + 1, arm, y, "assigned");
        state.assign(i, arm, Outcome::Continuous(y));
    }
    state
}

/// Simulates one binary-endpoint trial under the forward-looking index rule
/// with block re-randomization.
///
/// Random draws happen in a fixed order on `rng`: enrollment, outcome delays,
/// then per patient the arm followed by the response.
pub fn simulate_index_block_trial(
    settings: &IndexBlockSettings,
    table: &IndexTable,
    accrual: &dyn AccrualGenerator,
    delay: &dyn DelayModel,
    rng: &mut dyn RngCore,
) -> Result<TrialOutcome, RarsimErr> {
    settings.validate()?;
    if !table.covers(settings.tsize) {
        return Err(ConfigError::IndexTableTooSmall {
            rows: table.rows(),
            cols: table.cols(),
            needed: settings.tsize,
        }
        .into());
    }
    let k = settings.arms();
    let (enroll_times, outcome_times) = enrollment_schedule(settings.tsize, accrual, delay, rng)?;
    info!(
        arms = k,
        tsize = settings.tsize,
        block = settings.block,
        rule = ?settings.rule,
        "simulating index-block trial"
    );

    let rule = IndexBlockRule::new(table, settings.rule, settings.block.min(settings.tsize));
    let state = TrialState::new(
        &enroll_times,
        &outcome_times,
        vec![BinaryArm::default(); k],
        TrialPhase::Adaptive,
    );
    let (arms, mut outcome) =
        allocate_in_blocks(&rule, &settings.ptrue, settings.block, state, rng).finish();

    outcome.statistics = binary_z_statistics(&arms, settings.variance)?;
    outcome.decisions = boundary_decisions(&outcome.statistics, settings.boundary, settings.side);
    outcome.best_arm = best_index_arm(&arms, table);
    info!(
        arm_counts = ?outcome.arm_counts,
        statistics = ?outcome.statistics,
        decisions = ?outcome.decisions,
        best_arm = ?outcome.best_arm,
        "index-block trial complete"
    );
    Ok(outcome)
}

/// Simulates one continuous-endpoint trial: equal randomization for the first
/// `n1` patients, optimal-design allocation for the rest.
pub fn simulate_optimal_design_trial(
    settings: &OptimalDesignSettings,
    accrual: &dyn AccrualGenerator,
    delay: &dyn DelayModel,
    rng: &mut dyn RngCore,
) -> Result<TrialOutcome, RarsimErr> {
    settings.validate()?;
    let responses = settings
        .mean
        .iter()
        .zip(settings.sd.iter())
        .enumerate()
        .map(|(arm, (&mean, &sd))| {
            Normal::new(mean, sd).map_err(|_| ConfigError::BadStandardDeviation { arm, value: sd })
        })
        .collect::<Result<Vec<Normal>, ConfigError>>()?;
    let k = settings.arms();
    let (enroll_times, outcome_times) = enrollment_schedule(settings.n2, accrual, delay, rng)?;
    info!(
        arms = k,
        n1 = settings.n1,
        n2 = settings.n2,
        "simulating optimal-design trial"
    );

    let rule = OptimalDesignRule::new(settings.cc, settings.side);
    let initial_phase = if settings.n1 > 0 {
        TrialPhase::BurnIn
    } else {
        TrialPhase::Adaptive
    };
    let state = TrialState::new(
        &enroll_times,
        &outcome_times,
        settings.sd.iter().map(|&sd| ContinuousArm::new(sd)).collect(),
        initial_phase,
    );
    let (arms, mut outcome) =
        allocate_per_patient(&rule, &responses, settings.n1, state, rng).finish();

    outcome.statistics = continuous_z_statistics(&arms)?;
    outcome.decisions = bonferroni_decisions(&outcome.statistics, settings.alpha, settings.side);
    info!(
        arm_counts = ?outcome.arm_counts,
        statistics = ?outcome.statistics,
        decisions = ?outcome.decisions,
        fallbacks = outcome.fallbacks,
        "optimal-design trial complete"
    );
    Ok(outcome)
}

/// [`simulate_index_block_trial`] on a fresh `StdRng` seeded with `seed`
pub fn run_index_block_trial(
    settings: &IndexBlockSettings,
    table: &IndexTable,
    accrual: &dyn AccrualGenerator,
    delay: &dyn DelayModel,
    seed: u64,
) -> Result<TrialOutcome, RarsimErr> {
    let mut rng = rngs::StdRng::seed_from_u64(seed);
    simulate_index_block_trial(settings, table, accrual, delay, &mut rng)
}

/// [`simulate_optimal_design_trial`] on a fresh `StdRng` seeded with `seed`
pub fn run_optimal_design_trial(
    settings: &OptimalDesignSettings,
    accrual: &dyn AccrualGenerator,
    delay: &dyn DelayModel,
    seed: u64,
) -> Result<TrialOutcome, RarsimErr> {
    let mut rng = rngs::StdRng::seed_from_u64(seed);
    simulate_optimal_design_trial(settings, accrual, delay, &mut rng)
}
