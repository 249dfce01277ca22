//! Factor z-scores and factor scores.
//!
//! Only flagged Q-sorts contribute to a factor. Each contributes with the
//! weight `w = l / (1 - l^2)`, the weighted sums per statement are taken,
//! and the sums are standardized with a single mean and (n - 1) standard
//! deviation per factor, computed across all statements.

use nalgebra::{DMatrix, DVector};
use qmethod_core::{
    DistributionSpec, Error, FactorScoreMatrix, FlagMatrix, LoadingsMatrix, RankingMatrix,
    Result, ZScoreMatrix,
};

use crate::correlation::check_dimensions;

/// Check the ranking matrix against the distribution mode.
///
/// Returns the ascending q-score multiset: Q-sort 0's sorted scores in
/// forced mode, the sorted distribution in free mode.
pub fn validate_distribution(
    ranking: &RankingMatrix,
    forced: bool,
    distribution: Option<&DistributionSpec>,
) -> Result<Vec<f64>> {
    if let Some(spec) = distribution {
        spec.check_length(ranking.n_statements())?;
    }

    if forced {
        let reference = ranking.sorted_qsort(0);
        if let Some(qsort) = (1..ranking.n_qsorts()).find(|&j| ranking.sorted_qsort(j) != reference)
        {
            return Err(Error::ForcedDistributionMismatch { qsort });
        }
        Ok(reference)
    } else {
        let spec = distribution.ok_or_else(|| {
            Error::MissingOrInvalidDistribution(
                "forced is false but no distribution was provided".into(),
            )
        })?;
        Ok(spec.sorted())
    }
}

/// Z-scores plus the q-score multiset they were validated against
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub zscores: ZScoreMatrix,
    pub qscores: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreSynthesizer;

impl ZScoreSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(
        &self,
        ranking: &RankingMatrix,
        loadings: &LoadingsMatrix,
        flags: &FlagMatrix,
        forced: bool,
        distribution: Option<&DistributionSpec>,
    ) -> Result<Synthesis> {
        check_dimensions(ranking)?;
        check_shapes(ranking, loadings, flags)?;

        // Step 1: Distribution validation
        let qscores = validate_distribution(ranking, forced, distribution)?;

        // Step 2-3: Masked loadings to factor weights
        let weights = factor_weights(loadings, flags)?;

        // Step 4: Weighted sums per statement (statements x factors)
        let sums = ranking.as_matrix() * &weights;

        // Step 5-6: Standardize each factor's sums
        let n_statements = ranking.n_statements();
        let columns = (0..loadings.n_factors())
            .map(|f| {
                if flags.count(f) == 0 {
                    return None;
                }

                let column = sums.column(f);
                let mean = column.mean();
                let std = (column.map(|v| (v - mean).powi(2)).sum()
                    / (n_statements as f64 - 1.0))
                    .sqrt();

                Some(if std == 0.0 {
                    DVector::zeros(n_statements)
                } else {
                    column.map(|v| (v - mean) / std)
                })
            })
            .collect();

        tracing::debug!(
            n_statements,
            n_factors = loadings.n_factors(),
            "Synthesized factor z-scores"
        );

        Ok(Synthesis {
            zscores: ZScoreMatrix::new(n_statements, columns)?,
            qscores,
        })
    }
}

/// `w = l / (1 - l^2)` for flagged loadings, zero elsewhere
pub fn factor_weights(loadings: &LoadingsMatrix, flags: &FlagMatrix) -> Result<DMatrix<f64>> {
    let l = loadings.as_matrix();
    let mut weights = DMatrix::zeros(l.nrows(), l.ncols());

    for i in 0..l.nrows() {
        for f in 0..l.ncols() {
            if !flags.is_flagged(i, f) {
                continue;
            }
            let loading = l[(i, f)];
            let denominator = 1.0 - loading * loading;
            if denominator <= f64::EPSILON {
                return Err(Error::IllConditioned(format!(
                    "Q-sort {} has loading {} on factor {}; its factor weight is unbounded",
                    i,
                    loading,
                    f + 1
                )));
            }
            weights[(i, f)] = loading / denominator;
        }
    }

    Ok(weights)
}

/// Rank statements by z-score and deal out the sorted q-scores.
///
/// The lowest z-score receives the lowest q-score; equal z-scores keep
/// statement order.
pub fn factor_scores(zscores: &ZScoreMatrix, qscores: &[f64]) -> Result<FactorScoreMatrix> {
    let n_statements = zscores.n_statements();
    if qscores.len() != n_statements {
        return Err(Error::MissingOrInvalidDistribution(format!(
            "{} q-scores for {} statements",
            qscores.len(),
            n_statements
        )));
    }

    let columns = zscores
        .columns()
        .iter()
        .map(|column| {
            column.as_ref().map(|z| {
                let mut order: Vec<usize> = (0..n_statements).collect();
                order.sort_by(|&a, &b| z[a].total_cmp(&z[b]));

                let mut scores = vec![0.0; n_statements];
                for (rank, statement) in order.into_iter().enumerate() {
                    scores[statement] = qscores[rank];
                }
                scores
            })
        })
        .collect();

    Ok(FactorScoreMatrix::new(n_statements, columns))
}

fn check_shapes(
    ranking: &RankingMatrix,
    loadings: &LoadingsMatrix,
    flags: &FlagMatrix,
) -> Result<()> {
    if loadings.n_qsorts() != ranking.n_qsorts() {
        return Err(Error::InvalidInput(format!(
            "loadings cover {} Q-sorts but the ranking matrix has {}",
            loadings.n_qsorts(),
            ranking.n_qsorts()
        )));
    }
    if flags.n_qsorts() != loadings.n_qsorts() || flags.n_factors() != loadings.n_factors() {
        return Err(Error::InvalidInput(format!(
            "flag matrix is {}x{} but loadings are {}x{}",
            flags.n_qsorts(),
            flags.n_factors(),
            loadings.n_qsorts(),
            loadings.n_factors()
        )));
    }
    Ok(())
}
