use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Binary(bool),
    Continuous(f64),
}

impl Outcome {
    pub fn value(&self) -> f64 {
        match self {
            Outcome::Binary(y) => f64::from(u8::from(*y)),
            Outcome::Continuous(y) => *y,
        }
    }
}

/// Arm and outcome are only ever set together
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub arm: usize,
    pub outcome: Outcome,
}

/// One trial participant. `id` is 1-based and follows enrollment order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: usize,
    pub enroll_time: f64,
    pub outcome_time: f64,
    assignment: Option<Assignment>,
}

impl PatientRecord {
    pub fn new(id: usize, enroll_time: f64, outcome_time: f64) -> Self {
        Self {
            id,
            enroll_time,
            outcome_time,
            assignment: None,
        }
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.assignment
    }

    pub fn arm(&self) -> Option<usize> {
        self.assignment.map(|a| a.arm)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.assignment.map(|a| a.outcome)
    }

    pub(crate) fn assign(&mut self, arm: usize, outcome: Outcome) {
        debug_assert!(self.assignment.is_none(), "patient {} assigned twice", self.id);
        self.assignment = Some(Assignment { arm, outcome });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialPhase {
    /// Equal randomization before the adaptive rule takes over
    BurnIn,
    Adaptive,
    Complete,
}

/// Result of one simulated trial. Comparisons are always treatment arm
/// `k` (1..K) against the control arm 0, so `decisions` and `statistics`
/// have `K - 1` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub decisions: Vec<bool>,
    pub statistics: Vec<f64>,
    pub patients: Vec<PatientRecord>,
    pub arm_counts: Vec<usize>,
    /// Arm with the largest index value at its final counts (binary trials)
    pub best_arm: Option<usize>,
    /// Allocation points that fell back to equal randomization
    pub fallbacks: usize,
    pub phase: TrialPhase,
}

impl TrialOutcome {
    pub fn any_rejected(&self) -> bool {
        self.decisions.iter().any(|&d| d)
    }
}
