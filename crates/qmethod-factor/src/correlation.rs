//! Pearson correlation between Q-sorts.
//!
//! Each Q-sort is a variable and each statement an observation, so the
//! result is a Q-sorts x Q-sorts matrix. Sample (n - 1) moments are used
//! throughout; the (n - 1) factors cancel in the coefficient.

use nalgebra::DMatrix;
use qmethod_core::{CorrelationMatrix, DataAxis, Error, RankingMatrix, Result};

/// Minimum number of statements and of Q-sorts for a correlation
pub const MIN_OBSERVATIONS: usize = 2;

/// Check that a ranking matrix is large enough to correlate
pub fn check_dimensions(ranking: &RankingMatrix) -> Result<()> {
    if ranking.n_statements() < MIN_OBSERVATIONS {
        return Err(Error::InsufficientData {
            axis: DataAxis::Statements,
            required: MIN_OBSERVATIONS,
            available: ranking.n_statements(),
        });
    }
    if ranking.n_qsorts() < MIN_OBSERVATIONS {
        return Err(Error::InsufficientData {
            axis: DataAxis::QSorts,
            required: MIN_OBSERVATIONS,
            available: ranking.n_qsorts(),
        });
    }
    Ok(())
}

/// Correlate every pair of Q-sorts
pub fn correlate(ranking: &RankingMatrix) -> Result<CorrelationMatrix> {
    check_dimensions(ranking)?;

    let data = ranking.as_matrix();
    let n_qsorts = ranking.n_qsorts();

    // Center each Q-sort once; a constant Q-sort has no defined correlation
    let mut centered = data.clone();
    for (j, mut column) in centered.column_iter_mut().enumerate() {
        let mean = column.mean();
        column.add_scalar_mut(-mean);
        if column.norm_squared() == 0.0 {
            return Err(Error::IllConditioned(format!(
                "Q-sort {} gives every statement the same score",
                j
            )));
        }
    }

    let norms: Vec<f64> = centered.column_iter().map(|c| c.norm()).collect();

    let mut matrix = DMatrix::identity(n_qsorts, n_qsorts);
    for i in 0..n_qsorts {
        for j in (i + 1)..n_qsorts {
            let r = centered.column(i).dot(&centered.column(j)) / (norms[i] * norms[j]);
            let r = r.clamp(-1.0, 1.0);
            matrix[(i, j)] = r;
            matrix[(j, i)] = r;
        }
    }

    tracing::debug!(
        n_statements = ranking.n_statements(),
        n_qsorts,
        "Computed Q-sort correlation matrix"
    );

    CorrelationMatrix::new(matrix)
}
