use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::sim::types::PatientRecord;
use crate::tracker::types::ArmStats;

/// An assigned patient whose outcome is not yet part of the arm statistics
#[derive(Debug, Clone, Copy)]
struct Pending {
    outcome_time: f64,
    patient: usize,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the earliest outcome first
        other
            .outcome_time
            .total_cmp(&self.outcome_time)
            .then_with(|| other.patient.cmp(&self.patient))
    }
}

/// Per-arm statistics restricted to outcomes observable by the current clock.
///
/// Assigned patients wait in a min-heap keyed by outcome time; moving the
/// clock forward folds every outcome at or before it into its arm. The clock
/// only moves forward, so each outcome is absorbed exactly once.
#[derive(Debug, Clone)]
pub struct CensoredTracker<A> {
    arms: Vec<A>,
    pending: BinaryHeap<Pending>,
    observed: usize,
}

impl<A: ArmStats> CensoredTracker<A> {
    pub fn new(arms: Vec<A>) -> Self {
        Self {
            arms,
            pending: BinaryHeap::new(),
            observed: 0,
        }
    }

    /// Registers an assigned patient (index into the patient table)
    pub fn enqueue(&mut self, patient: usize, outcome_time: f64) {
        self.pending.push(Pending {
            outcome_time,
            patient,
        });
    }

    /// Absorbs every pending outcome with `outcome_time <= clock`. Returns
    /// how many were absorbed.
    pub fn advance_to(&mut self, clock: f64, patients: &[PatientRecord]) -> usize {
        let mut absorbed = 0;
        while let Some(next) = self.pending.peek()
            && next.outcome_time <= clock
        {
            let patient = next.patient;
            self.pending.pop();
            if let Some(assignment) = patients.get(patient).and_then(|p| p.assignment()) {
                self.arms[assignment.arm].observe(assignment.outcome.value());
                absorbed += 1;
            }
        }
        self.observed += absorbed;
        absorbed
    }

    pub fn arms(&self) -> &[A] {
        &self.arms
    }

    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn into_arms(self) -> Vec<A> {
        self.arms
    }
}

/// Rebuilds censored arm statistics from scratch by scanning the whole
/// patient table
pub fn recount<A: ArmStats + Clone>(empty: &[A], patients: &[PatientRecord], clock: f64) -> Vec<A> {
    let mut arms = empty.to_vec();
    patients
        .iter()
        .filter(|p| p.outcome_time <= clock)
        .filter_map(PatientRecord::assignment)
        .for_each(|a| arms[a.arm].observe(a.outcome.value()));
    arms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::Outcome;
    use crate::tracker::types::{BinaryArm, ContinuousArm};

    fn patients(times: &[(f64, f64)]) -> Vec<PatientRecord> {
        times
            .iter()
            .enumerate()
            .map(|(i, &(enroll, outcome))| PatientRecord::new(i + 1, enroll, outcome))
            .collect()
    }

    #[test]
    fn only_observable_outcomes_count() {
        let mut table = patients(&[(0., 5.), (1., 1.5), (2., 2.0), (3., 10.)]);
        let mut tracker = CensoredTracker::new(vec![BinaryArm::default(); 2]);
        for (i, (arm, y)) in [(0, true), (1, true), (0, false), (1, false)]
            .into_iter()
            .enumerate()
        {
            table[i].assign(arm, Outcome::Binary(y));
            tracker.enqueue(i, table[i].outcome_time);
        }

        assert_eq!(tracker.advance_to(1.0, &table), 0);
        assert_eq!(tracker.advance_to(2.0, &table), 2);
        assert_eq!(tracker.arms(), &[BinaryArm::new(0, 1), BinaryArm::new(1, 0)]);
        assert_eq!(tracker.pending(), 2);

        assert_eq!(tracker.advance_to(f64::INFINITY, &table), 2);
        assert_eq!(tracker.arms(), &[BinaryArm::new(1, 1), BinaryArm::new(1, 1)]);
        assert_eq!(tracker.observed(), 4);
    }

    #[test]
    fn incremental_matches_recount() {
        let mut table = patients(&[
            (0.0, 4.0),
            (0.5, 0.9),
            (1.0, 7.0),
            (1.2, 1.3),
            (2.0, 2.0),
            (2.5, 3.5),
            (3.0, 3.1),
        ]);
        let empty = vec![ContinuousArm::new(1.0); 3];
        let mut tracker = CensoredTracker::new(empty.clone());
        let ys = [0.3, -1.2, 2.2, 0.7, 1.1, -0.4, 0.05];
        for i in 0..table.len() {
            let clock = table[i].enroll_time;
            tracker.advance_to(clock, &table);
            let reference = recount(&empty, &table[..i], clock);
            for (a, b) in tracker.arms().iter().zip(reference.iter()) {
                assert_eq!(a.n(), b.n());
                match (a.mean(), b.mean()) {
                    (Some(x), Some(y)) => assert!((x - y).abs() < 1e-12),
                    (None, None) => {}
                    _ => panic!("means disagree"),
                }
            }
            table[i].assign(i % 3, Outcome::Continuous(ys[i]));
            tracker.enqueue(i, table[i].outcome_time);
        }
    }

    #[test]
    fn ties_at_clock_are_observable() {
        let mut table = patients(&[(0., 1.), (1., 1.)]);
        let mut tracker = CensoredTracker::new(vec![BinaryArm::default(); 2]);
        table[0].assign(1, Outcome::Binary(true));
        tracker.enqueue(0, table[0].outcome_time);
        assert_eq!(tracker.advance_to(table[1].enroll_time, &table), 1);
    }
}
