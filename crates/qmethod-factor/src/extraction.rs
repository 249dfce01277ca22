//! Principal component extraction.
//!
//! The correlation matrix is eigendecomposed, the pairs are ranked by
//! eigenvalue (descending, ties kept in solver order) and the first K
//! eigenvectors, scaled by the square root of their eigenvalue, become the
//! unrotated loadings.

use nalgebra::DMatrix;
use qmethod_core::{Advisory, CorrelationMatrix, Error, LoadingsMatrix, Result};

use crate::config::ExtractionConfig;
use crate::linalg::Decomposer;

/// Unrotated extraction result
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Q-sorts x K loadings
    pub loadings: LoadingsMatrix,
    /// All eigenvalues, in the order used to build loadings columns
    pub eigenvalues: Vec<f64>,
    pub advisories: Vec<Advisory>,
}

pub struct FactorExtractor<'a> {
    decomposer: &'a dyn Decomposer,
    negative_tolerance: f64,
}

impl<'a> FactorExtractor<'a> {
    pub fn new(decomposer: &'a dyn Decomposer) -> Self {
        Self::with_config(decomposer, &ExtractionConfig::default())
    }

    pub fn with_config(decomposer: &'a dyn Decomposer, config: &ExtractionConfig) -> Self {
        Self {
            decomposer,
            negative_tolerance: config.negative_eigenvalue_tolerance,
        }
    }

    /// Extract `n_factors` principal components
    pub fn extract(&self, correlation: &CorrelationMatrix, n_factors: usize) -> Result<Extraction> {
        let n_qsorts = correlation.dim();
        check_factor_count(n_factors, n_qsorts)?;

        let eigen = self.decomposer.eig(correlation.as_matrix())?;

        // Stable sort keeps the solver's index order for equal eigenvalues
        let mut order: Vec<usize> = (0..eigen.values.len()).collect();
        order.sort_by(|&a, &b| eigen.values[b].total_cmp(&eigen.values[a]));

        let eigenvalues: Vec<f64> = order.iter().map(|&i| eigen.values[i]).collect();

        let mut advisories = Vec::new();
        let mut loadings = DMatrix::zeros(n_qsorts, n_factors);

        for (factor, &idx) in order.iter().take(n_factors).enumerate() {
            let eigenvalue = eigen.values[idx];
            if eigenvalue < -self.negative_tolerance {
                tracing::warn!(factor, eigenvalue, "Clamping negative eigenvalue to zero");
                advisories.push(Advisory::NegativeEigenvalueClamped { factor, eigenvalue });
            }

            let scale = eigenvalue.max(0.0).sqrt();
            loadings.set_column(factor, &(eigen.vectors.column(idx) * scale));
        }

        tracing::debug!(
            n_factors,
            leading_eigenvalue = eigenvalues[0],
            backend = self.decomposer.name(),
            "Extracted principal components"
        );

        Ok(Extraction {
            loadings: LoadingsMatrix::new(loadings)?,
            eigenvalues,
            advisories,
        })
    }
}

/// K must be between 1 and the number of Q-sorts
pub fn check_factor_count(n_factors: usize, n_qsorts: usize) -> Result<()> {
    if n_factors == 0 || n_factors > n_qsorts {
        return Err(Error::InvalidFactorCount {
            requested: n_factors,
            max: n_qsorts,
        });
    }
    Ok(())
}
