use serde::{Deserialize, Serialize};

use crate::error::RarsimErr;
use crate::settings::error::ConfigError;

/// Dense table of index values for a Bernoulli arm under a Beta(1, 1) prior.
///
/// Rows are observed failures and columns observed successes, both starting
/// at 0, so cell `(f, s)` holds the index of a Beta(s + 1, f + 1) posterior.
/// Tables are built once per discount factor and only looked up during a
/// trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexTable {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl IndexTable {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RarsimErr> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(ConfigError::RaggedIndexTable {
                row,
                expected: cols,
                got: r.len(),
            }
            .into());
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let values = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| f(r, c))
            .collect();
        Self { rows, cols, values }
    }

    /// Myopic index: the posterior mean success rate
    pub fn posterior_mean(dim: usize) -> Self {
        IndexTable::from_fn(dim, dim, |f, s| (s as f64 + 1.) / (s as f64 + f as f64 + 2.))
    }

    /// Closed-form approximation of the Bernoulli Gittins index for
    /// discount factor `discount` (Brezzi & Lai, 2002)
    pub fn brezzi_lai(discount: f64, dim: usize) -> Result<Self, RarsimErr> {
        if !(discount > 0.0 && discount < 1.0) {
            return Err(ConfigError::BadDiscount(discount).into());
        }
        let c = -discount.ln();
        Ok(IndexTable::from_fn(dim, dim, |f, s| {
            let n = s as f64 + f as f64 + 2.;
            let mu = (s as f64 + 1.) / n;
            let posterior_sd = (mu * (1. - mu) / (n + 1.)).sqrt();
            mu + posterior_sd * brezzi_lai_psi(1. / ((n + 1.) * c))
        }))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    /// True when every cell with at most `n` successes and `n` failures
    /// exists
    pub fn covers(&self, n: usize) -> bool {
        self.rows > n && self.cols > n
    }

    /// Index at observed `successes` and `failures`. Callers check
    /// [`IndexTable::covers`] up front.
    pub(crate) fn at_counts(&self, successes: u64, failures: u64) -> f64 {
        self.values[failures as usize * self.cols + successes as usize]
    }
}

fn brezzi_lai_psi(s: f64) -> f64 {
    if s <= 0.2 {
        (s / 2.).sqrt()
    } else if s <= 1. {
        0.49 - 0.11 / s.sqrt()
    } else if s <= 5. {
        0.63 - 0.26 / s.sqrt()
    } else if s <= 15. {
        0.77 - 0.58 / s.sqrt()
    } else {
        (2. * s.ln() - s.ln().ln() - (16. * std::f64::consts::PI).ln()).sqrt()
    }
}
