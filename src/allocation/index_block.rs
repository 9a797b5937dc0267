use std::collections::BTreeMap;

use rand::RngCore;

use crate::allocation::{Allocation, AllocationRule, index_table::IndexTable};
use crate::settings::{IndexRule, Lookahead};
use crate::tracker::types::{ArmStats, BinaryArm};

// Look-ahead states carrying less mass than this are dropped
const MIN_STATE_MASS: f64 = 1e-15;

/// Forward-looking index rule for Bernoulli arms, recomputed once per block.
///
/// The probability of arm k is the expected share of the next `block`
/// patients the index policy would send to k, with outcomes of those
/// imagined patients filled in from the current posterior.
#[derive(Debug, Clone)]
pub struct IndexBlockRule<'a> {
    table: &'a IndexTable,
    rule: IndexRule,
    block: usize,
}

impl<'a> IndexBlockRule<'a> {
    pub fn new(table: &'a IndexTable, rule: IndexRule, block: usize) -> Self {
        Self { table, rule, block }
    }

    /// Allocation probabilities over all arms; sums to 1. `None` when the
    /// look-ahead could step outside the index table.
    pub fn probabilities(&self, arms: &[BinaryArm]) -> Option<Vec<f64>> {
        let horizon = arms.iter().map(ArmStats::n).max().unwrap_or(0) as usize + self.block;
        if !self.table.covers(horizon) {
            return None;
        }
        Some(match self.rule {
            IndexRule::Controlled(lookahead) if arms.len() > 2 => {
                let control = 1. / (arms.len() - 1) as f64;
                let treatment = self.lookahead(&arms[1..], lookahead);
                std::iter::once(control)
                    .chain(treatment.into_iter().map(|p| p * (1. - control)))
                    .collect()
            }
            rule => self.lookahead(arms, rule.lookahead()),
        })
    }

    fn lookahead(&self, arms: &[BinaryArm], lookahead: Lookahead) -> Vec<f64> {
        let expected = match lookahead {
            Lookahead::PosteriorMean => self.posterior_mean_pulls(arms),
            Lookahead::PosteriorDistribution => self.posterior_distribution_pulls(arms),
        };
        let total: f64 = expected.iter().sum();
        expected.into_iter().map(|e| e / total).collect()
    }

    /// Imagined patients respond at the arm's posterior mean, so each arm's
    /// look-ahead state is just its number of imagined pulls
    fn posterior_mean_pulls(&self, arms: &[BinaryArm]) -> Vec<f64> {
        let means: Vec<f64> = arms.iter().map(BinaryArm::posterior_mean).collect();
        let mut expected = vec![0.; arms.len()];
        let mut states: BTreeMap<Vec<u64>, f64> = BTreeMap::from([(vec![0; arms.len()], 1.)]);

        for _ in 0..self.block {
            let mut next = BTreeMap::new();
            for (pulls, mass) in states {
                let indices: Vec<f64> = arms
                    .iter()
                    .zip(means.iter())
                    .zip(pulls.iter())
                    .map(|((arm, mean), &m)| {
                        let n = arm.n() + m;
                        let s = ((arm.successes as f64 + m as f64 * mean).round() as u64).min(n);
                        self.table.at_counts(s, n - s)
                    })
                    .collect();
                let winners = argmax_ties(&indices);
                let share = mass / winners.len() as f64;
                for w in winners {
                    expected[w] += share;
                    let mut child = pulls.clone();
                    child[w] += 1;
                    *next.entry(child).or_insert(0.) += share;
                }
            }
            states = next;
        }
        expected
    }

    /// Imagined outcomes branch on the posterior predictive; mass is carried
    /// over the joint (pulls, successes) state of every arm
    fn posterior_distribution_pulls(&self, arms: &[BinaryArm]) -> Vec<f64> {
        let mut expected = vec![0.; arms.len()];
        let mut states: BTreeMap<Vec<(u64, u64)>, f64> =
            BTreeMap::from([(vec![(0, 0); arms.len()], 1.)]);

        for _ in 0..self.block {
            let mut next = BTreeMap::new();
            for (state, mass) in states.into_iter().filter(|(_, m)| *m >= MIN_STATE_MASS) {
                let posteriors: Vec<BinaryArm> = arms
                    .iter()
                    .zip(state.iter())
                    .map(|(arm, &(m, x))| {
                        BinaryArm::new(arm.successes + x, arm.failures + (m - x))
                    })
                    .collect();
                let indices: Vec<f64> = posteriors
                    .iter()
                    .map(|p| self.table.at_counts(p.successes, p.failures))
                    .collect();
                let winners = argmax_ties(&indices);
                let share = mass / winners.len() as f64;
                for w in winners {
                    expected[w] += share;
                    let p_success = posteriors[w].posterior_mean();
                    let mut success = state.clone();
                    success[w].0 += 1;
                    success[w].1 += 1;
                    let mut failure = state.clone();
                    failure[w].0 += 1;
                    *next.entry(success).or_insert(0.) += share * p_success;
                    *next.entry(failure).or_insert(0.) += share * (1. - p_success);
                }
            }
            states = next;
        }
        expected
    }
}

impl AllocationRule for IndexBlockRule<'_> {
    type Arm = BinaryArm;

    fn propose(&self, arms: &[BinaryArm], _rng: &mut dyn RngCore) -> Allocation {
        match self.probabilities(arms) {
            Some(p) => Allocation::Probabilities(p),
            None => Allocation::Equal,
        }
    }
}

/// Positions of every maximal value
fn argmax_ties(values: &[f64]) -> Vec<usize> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == max)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums_to_one(p: &[f64]) -> bool {
        (p.iter().sum::<f64>() - 1.0).abs() < 1e-9
    }

    #[test]
    fn no_data_is_equal_allocation() {
        let table = IndexTable::brezzi_lai(0.9, 50).expect("failed to build table");
        for rule in [IndexRule::PosteriorMean, IndexRule::PosteriorDistribution] {
            let p = IndexBlockRule::new(&table, rule, 10)
                .probabilities(&[BinaryArm::default(); 2])
                .expect("table covers counts");
            assert!((p[0] - 0.5).abs() < 1e-12, "{rule:?}: {p:?}");
            assert!((p[1] - 0.5).abs() < 1e-12, "{rule:?}: {p:?}");
        }
    }

    #[test]
    fn probabilities_sum_to_one() {
        let table = IndexTable::brezzi_lai(0.95, 80).expect("failed to build table");
        let arms = [
            BinaryArm::new(3, 5),
            BinaryArm::new(7, 2),
            BinaryArm::new(0, 0),
            BinaryArm::new(12, 11),
        ];
        for rule in [
            IndexRule::PosteriorMean,
            IndexRule::PosteriorDistribution,
            IndexRule::Controlled(Lookahead::PosteriorMean),
            IndexRule::Controlled(Lookahead::PosteriorDistribution),
        ] {
            let p = IndexBlockRule::new(&table, rule, 8)
                .probabilities(&arms)
                .expect("table covers counts");
            assert_eq!(p.len(), 4);
            assert!(sums_to_one(&p), "{rule:?}: {p:?}");
            assert!(p.iter().all(|&x| (0.0..=1.0).contains(&x)));
        }
    }

    #[test]
    fn better_arm_gets_more_of_block() {
        let table = IndexTable::brezzi_lai(0.99, 100).expect("failed to build table");
        let arms = [BinaryArm::new(10, 20), BinaryArm::new(20, 10)];
        for rule in [IndexRule::PosteriorMean, IndexRule::PosteriorDistribution] {
            let p = IndexBlockRule::new(&table, rule, 20)
                .probabilities(&arms)
                .expect("table covers counts");
            assert!(p[1] > p[0], "{rule:?}: {p:?}");
        }
    }

    #[test]
    fn controlled_rule_fixes_control_share() {
        let table = IndexTable::brezzi_lai(0.95, 60).expect("failed to build table");
        let arms = [
            BinaryArm::new(2, 2),
            BinaryArm::new(5, 1),
            BinaryArm::new(1, 5),
        ];
        let rule = IndexBlockRule::new(&table, IndexRule::Controlled(Lookahead::PosteriorDistribution), 6);
        let p = rule.probabilities(&arms).expect("table covers counts");
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!(sums_to_one(&p));
        assert!(p[1] > p[2]);
    }

    #[test]
    fn posterior_mean_block_of_one_is_greedy() {
        let table = IndexTable::posterior_mean(20);
        let arms = [BinaryArm::new(1, 3), BinaryArm::new(3, 1), BinaryArm::new(2, 2)];
        let p = IndexBlockRule::new(&table, IndexRule::PosteriorMean, 1)
            .probabilities(&arms)
            .expect("table covers counts");
        assert_eq!(p, vec![0., 1., 0.]);
    }

    #[test]
    fn lookahead_past_table_edge_is_equal() {
        let table = IndexTable::posterior_mean(12);
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let rule = IndexBlockRule::new(&table, IndexRule::PosteriorDistribution, 5);
        let arms = [BinaryArm::new(4, 3), BinaryArm::new(2, 2)];
        assert_eq!(rule.probabilities(&arms), None);
        assert_eq!(rule.propose(&arms, &mut rng), Allocation::Equal);
        let arms = [BinaryArm::new(4, 2), BinaryArm::new(2, 2)];
        assert!(rule.probabilities(&arms).is_some());
    }

    #[test]
    fn propose_returns_probabilities() {
        let table = IndexTable::posterior_mean(20);
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let rule = IndexBlockRule::new(&table, IndexRule::PosteriorMean, 4);
        if let Allocation::Probabilities(p) = rule.propose(&[BinaryArm::default(); 3], &mut rng) {
            assert!(sums_to_one(&p));
        } else {
            panic!()
        }
    }
}
