use serde::{Deserialize, Serialize};

use crate::error::RarsimErr;
use crate::settings::error::ConfigError;

/// Direction of the one-sided comparison against control
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TestSide {
    /// Larger responses are better; reject when the statistic is large
    #[default]
    Upper,
    /// Smaller responses are better; reject when the statistic is small
    Lower,
}

#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum VarianceMode {
    #[default]
    Unpooled,
    Pooled,
}

/// How imagined outcomes are filled in while looking ahead over a block
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Lookahead {
    #[default]
    PosteriorMean,
    PosteriorDistribution,
}

#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum IndexRule {
    #[default]
    PosteriorMean,
    PosteriorDistribution,
    /// Control keeps a fixed 1/(K-1) share; treatment arms split the rest
    Controlled(Lookahead),
}

impl IndexRule {
    pub fn lookahead(&self) -> Lookahead {
        match self {
            IndexRule::PosteriorMean => Lookahead::PosteriorMean,
            IndexRule::PosteriorDistribution => Lookahead::PosteriorDistribution,
            IndexRule::Controlled(lookahead) => *lookahead,
        }
    }
}

/// Settings for a binary-endpoint trial allocated in blocks by an index rule.
/// Arm 0 is the control arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexBlockSettings {
    pub ptrue: Vec<f64>,
    pub block: usize,
    pub tsize: usize,
    pub rule: IndexRule,
    pub variance: VarianceMode,
    pub side: TestSide,
    pub boundary: f64,
}

impl Default for IndexBlockSettings {
    fn default() -> Self {
        Self {
            ptrue: vec![0.6, 0.7],
            block: 20,
            tsize: 992,
            rule: IndexRule::PosteriorMean,
            variance: VarianceMode::Unpooled,
            side: TestSide::Upper,
            boundary: 1.96,
        }
    }
}

impl IndexBlockSettings {
    pub fn arms(&self) -> usize {
        self.ptrue.len()
    }

    pub fn validate(&self) -> Result<(), RarsimErr> {
        let k = self.arms();
        if k < 2 {
            return Err(ConfigError::TooFewArms(k).into());
        }
        if let IndexRule::Controlled(_) = self.rule
            && k < 3
        {
            return Err(ConfigError::ControlledRuleArms(k).into());
        }
        if let Some(&p) = self.ptrue.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(ConfigError::ProbabilityOutOfBounds {
                name: "ptrue",
                value: p,
            }
            .into());
        }
        if self.block == 0 {
            return Err(ConfigError::NonPositiveSize("block").into());
        }
        if self.tsize == 0 {
            return Err(ConfigError::NonPositiveSize("tsize").into());
        }
        if !self.boundary.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "boundary",
                value: self.boundary,
            }
            .into());
        }
        Ok(())
    }
}

/// Settings for a continuous-endpoint trial with known variances, equal
/// randomization for the first `n1` patients and optimal-design allocation
/// afterwards. Arm 0 is the control arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalDesignSettings {
    pub mean: Vec<f64>,
    pub sd: Vec<f64>,
    pub n1: usize,
    pub n2: usize,
    pub cc: f64,
    pub alpha: f64,
    pub side: TestSide,
}

impl Default for OptimalDesignSettings {
    fn default() -> Self {
        Self {
            mean: vec![0.091, 0.091, 0.091],
            sd: vec![0.346, 0.346, 0.346],
            n1: 9,
            n2: 132,
            cc: 0.091,
            alpha: 0.025,
            side: TestSide::Upper,
        }
    }
}

impl OptimalDesignSettings {
    pub fn arms(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), RarsimErr> {
        let k = self.arms();
        if k < 2 {
            return Err(ConfigError::TooFewArms(k).into());
        }
        if self.sd.len() != k {
            return Err(ConfigError::ArmCountMismatch {
                name: "sd",
                arms: k,
                got: self.sd.len(),
            }
            .into());
        }
        if let Some((arm, &value)) = self
            .sd
            .iter()
            .enumerate()
            .find(|(_, sd)| !(sd.is_finite() && **sd > 0.0))
        {
            return Err(ConfigError::BadStandardDeviation { arm, value }.into());
        }
        if let Some(&value) = self.mean.iter().find(|m| !m.is_finite()) {
            return Err(ConfigError::NonFinite { name: "mean", value }.into());
        }
        if !self.cc.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "cc",
                value: self.cc,
            }
            .into());
        }
        if self.n2 == 0 {
            return Err(ConfigError::NonPositiveSize("n2").into());
        }
        if self.n1 > self.n2 {
            return Err(ConfigError::BurnInTooLarge {
                n1: self.n1,
                n2: self.n2,
            }
            .into());
        }
        if self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(ConfigError::ProbabilityOutOfBounds {
                name: "alpha",
                value: self.alpha,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(IndexBlockSettings::default().validate().is_ok());
        assert!(OptimalDesignSettings::default().validate().is_ok());
    }

    #[test]
    fn mismatched_sd_length_error() {
        let settings = OptimalDesignSettings {
            sd: vec![1.0, 1.0],
            ..Default::default()
        };
        if let Err(e) = settings.validate() {
            assert_eq!(
                String::from(
                    "while validating trial configuration: \
                     length of sd (2) doesn't match number of arms (3)"
                ),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn zero_block_error() {
        let settings = IndexBlockSettings {
            block: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(RarsimErr::Config(ConfigError::NonPositiveSize("block")))
        );
    }

    #[test]
    fn controlled_rule_needs_three_arms() {
        let settings = IndexBlockSettings {
            rule: IndexRule::Controlled(Lookahead::PosteriorMean),
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(RarsimErr::Config(ConfigError::ControlledRuleArms(2)))
        );
    }

    #[test]
    fn bad_probability_error() {
        let settings = IndexBlockSettings {
            ptrue: vec![0.5, 1.2],
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(RarsimErr::Config(ConfigError::ProbabilityOutOfBounds {
                name: "ptrue",
                value: 1.2
            }))
        );
    }

    #[test]
    fn burn_in_too_large_error() {
        let settings = OptimalDesignSettings {
            n1: 200,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(RarsimErr::Config(ConfigError::BurnInTooLarge { n1: 200, n2: 132 }))
        );
    }

    #[test]
    fn negative_sd_error() {
        let settings = OptimalDesignSettings {
            sd: vec![0.3, -0.1, 0.3],
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(RarsimErr::Config(ConfigError::BadStandardDeviation {
                arm: 1,
                value: -0.1
            }))
        );
    }
}
