//----------------------------------------
// decision mod
//----------------------------------------
pub mod binary;
pub mod continuous;
pub mod error;
pub mod std_normal;

pub use binary::{best_index_arm, binary_z_statistics};
pub use continuous::{bonferroni_decisions, continuous_z_statistics};

use crate::settings::TestSide;

/// Compares each statistic with a fixed boundary in the direction of `side`
pub fn boundary_decisions(statistics: &[f64], boundary: f64, side: TestSide) -> Vec<bool> {
    statistics
        .iter()
        .map(|&z| match side {
            TestSide::Upper => z >= boundary,
            TestSide::Lower => z <= boundary,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_direction() {
        let z = [2.5, 1.96, -2.1, 0.0];
        assert_eq!(
            boundary_decisions(&z, 1.96, TestSide::Upper),
            vec![true, true, false, false]
        );
        assert_eq!(
            boundary_decisions(&z, -1.96, TestSide::Lower),
            vec![false, false, true, false]
        );
    }
}
