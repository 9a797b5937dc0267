use serde::{Deserialize, Serialize};

use crate::enrollment::error::EnrollmentError;
use crate::error::RarsimErr;

/// Piecewise-constant accrual intensity. The rate `enrollment_rates[i]`
/// holds for `enrollment_durations[i]` time units; the final duration is
/// always infinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnrollmentRate {
    PiecewiseConstant {
        enrollment_durations: Vec<f64>,
        enrollment_rates: Vec<f64>,
    },
}

impl EnrollmentRate {
    /// `times` are the start times of each rate period
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> Result<Self, RarsimErr> {
        // Rates should have equal length
        if rates.len() != times.len() {
            return Err(EnrollmentError::TimeRateLengths {
                time_length: times.len(),
                rate_length: rates.len(),
            }
            .into());
        }
        let (Some(&first_time), Some(&last_rate)) = (times.first(), rates.last()) else {
            return Err(EnrollmentError::NoRates.into());
        };
        if first_time < 0.0 || times.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(EnrollmentError::BadTimes.into());
        }
        if let Some(&bad) = rates.iter().find(|r| !(r.is_finite() && **r >= 0.0)) {
            return Err(EnrollmentError::BadRate(bad).into());
        }
        if last_rate <= 0.0 {
            return Err(EnrollmentError::BadFinalRate(last_rate).into());
        }

        //----------------------------------------
        // If time doesn't start at 0, starting rate is implicitly zero
        let (enrollment_times, enrollment_rates) = if first_time == 0.0 {
            (times, rates)
        } else {
            ([vec![0.0], times].concat(), [vec![0.0], rates].concat())
        };

        let mut durations: Vec<f64> = enrollment_times.windows(2).map(|w| w[1] - w[0]).collect();
        // Last enrollment rate gets extended forever
        durations.push(f64::INFINITY);

        Ok(EnrollmentRate::PiecewiseConstant {
            enrollment_durations: durations,
            enrollment_rates,
        })
    }

    /// Constant accrual at `rate` patients per unit time
    pub fn constant(rate: f64) -> Result<Self, RarsimErr> {
        EnrollmentRate::new(vec![0.0], vec![rate])
    }

    /// Maps a unit-rate cumulative intensity back to calendar time
    pub(crate) fn invert_cumulative(&self, mut cumulative: f64) -> f64 {
        let EnrollmentRate::PiecewiseConstant {
            enrollment_durations,
            enrollment_rates,
        } = self;
        let mut cur_time = 0.;
        for (cur_duration, cur_rate) in enrollment_durations.iter().zip(enrollment_rates.iter()) {
            let capacity = cur_duration * cur_rate;
            if *cur_rate > 0.0 && (capacity.is_infinite() || cumulative <= capacity) {
                return cur_time + cumulative / cur_rate;
            }
            cumulative -= capacity;
            cur_time += cur_duration;
        }
        cur_time
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn basic_piecewise_enrollment() {
        let piecewise = EnrollmentRate::new(vec![0., 1., 2.], vec![4., 5., 6.]);
        if let Ok(EnrollmentRate::PiecewiseConstant {
            enrollment_durations: durations,
            enrollment_rates: rates,
        }) = piecewise
        {
            assert_eq!(durations, vec![1., 1., f64::INFINITY]);
            assert_eq!(rates, vec![4., 5., 6.]);
        } else {
            panic!()
        }
    }

    #[test]
    fn late_start_gets_zero_rate() {
        let piecewise = EnrollmentRate::new(vec![2.], vec![4.]);
        if let Ok(EnrollmentRate::PiecewiseConstant {
            enrollment_durations: durations,
            enrollment_rates: rates,
        }) = piecewise
        {
            assert_eq!(durations, vec![2., f64::INFINITY]);
            assert_eq!(rates, vec![0., 4.]);
        } else {
            panic!()
        }
    }

    #[test]
    fn mismatched_lengths_error() {
        if let Err(e) = EnrollmentRate::new(vec![0.0, 1.0], vec![1.0]) {
            assert_eq!(
                String::from(
                    "while simulating enrollment: \
                     lengths of enrollment times and rates don't match (times length 2, \
                     rates length 1)"
                ),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn zero_final_rate_error() {
        assert_eq!(
            EnrollmentRate::new(vec![0.0, 1.0], vec![1.0, 0.0]),
            Err(RarsimErr::Enrollment(EnrollmentError::BadFinalRate(0.0)))
        );
    }

    #[test]
    fn invert_cumulative_crosses_periods() {
        let er = EnrollmentRate::new(vec![0., 5., 10.], vec![10., 20., 30.])
            .expect("failed to construct EnrollmentRate");
        // 50 expected by t = 5, 150 by t = 10
        assert!((er.invert_cumulative(25.) - 2.5).abs() < 1e-12);
        assert!((er.invert_cumulative(100.) - 7.5).abs() < 1e-12);
        assert!((er.invert_cumulative(180.) - 11.).abs() < 1e-12);
    }

    #[test]
    fn invert_cumulative_skips_closed_period() {
        let er = EnrollmentRate::new(vec![3.], vec![2.]).expect("failed to construct");
        assert!((er.invert_cumulative(4.) - 5.).abs() < 1e-12);
    }
}
