//! Automatic pre-flagging of Q-sorts.
//!
//! A Q-sort is flagged for factor `f` when both hold:
//!
//! 1. its loading on `f` is significant: `|l| > z / sqrt(n_statements)`
//! 2. `l^2` exceeds the sum of its squared loadings on all other factors
//!
//! Flagged Q-sorts are the exemplars that define a factor's z-scores.

use nalgebra::DMatrix;
use qmethod_core::{Advisory, Error, FlagMatrix, LoadingsMatrix, Result};

use crate::config::{FlaggingConfig, SignificanceLevel};

#[derive(Debug, Clone)]
pub struct Flagging {
    pub flags: FlagMatrix,
    /// Absolute loading threshold that was applied
    pub threshold: f64,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, Default)]
pub struct Flagger {
    significance: SignificanceLevel,
}

impl Flagger {
    pub fn new(config: &FlaggingConfig) -> Self {
        Self {
            significance: config.significance,
        }
    }

    pub fn with_significance(mut self, significance: SignificanceLevel) -> Self {
        self.significance = significance;
        self
    }

    pub fn flag(&self, loadings: &LoadingsMatrix, n_statements: usize) -> Result<Flagging> {
        if n_statements == 0 {
            return Err(Error::InvalidInput(
                "flagging needs a positive statement count".into(),
            ));
        }

        let threshold = self.significance.threshold(n_statements);
        let l = loadings.as_matrix();
        let row_squares: Vec<f64> = l.row_iter().map(|row| row.norm_squared()).collect();

        let flags = DMatrix::from_fn(l.nrows(), l.ncols(), |i, f| {
            let square = l[(i, f)].powi(2);
            let others = row_squares[i] - square;
            square > others && l[(i, f)].abs() > threshold
        });
        let flags = FlagMatrix::new(flags);

        let advisories = inspect(loadings, &flags);
        for advisory in &advisories {
            tracing::warn!("{}", advisory);
        }

        tracing::debug!(
            threshold,
            flagged = ?(0..flags.n_factors()).map(|f| flags.count(f)).collect::<Vec<_>>(),
            "Pre-flagged Q-sorts"
        );

        Ok(Flagging {
            flags,
            threshold,
            advisories,
        })
    }
}

/// Situations worth a manual look; none of them invalidate the flags
fn inspect(loadings: &LoadingsMatrix, flags: &FlagMatrix) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    let negative: Vec<usize> = (0..flags.n_qsorts())
        .filter(|&i| {
            (0..flags.n_factors()).any(|f| flags.is_flagged(i, f) && loadings.get(i, f) < 0.0)
        })
        .collect();
    if !negative.is_empty() {
        advisories.push(Advisory::NegativeFlaggedLoading { qsorts: negative });
    }

    let multiple: Vec<usize> = (0..flags.n_qsorts())
        .filter(|&i| flags.factors_of(i).len() > 1)
        .collect();
    if !multiple.is_empty() {
        advisories.push(Advisory::MultipleFactorFlags { qsorts: multiple });
    }

    for factor in (0..flags.n_factors()).filter(|&f| flags.count(f) == 0) {
        advisories.push(Advisory::UnflaggedFactor { factor });
    }

    advisories
}
