//! Matrix decompositions used by the pipeline.
//!
//! Extraction needs a symmetric eigendecomposition and varimax needs the
//! SVD of a small square matrix. Both sit behind [`Decomposer`] so the
//! numeric backend can be swapped without touching pipeline logic.

use nalgebra::{DMatrix, DVector, SymmetricEigen, SVD};
use qmethod_core::{Error, Result};

use crate::config::DecompositionConfig;

/// Eigenvalues and matching eigenvectors (column `i` pairs with value `i`).
/// No ordering is implied.
#[derive(Debug, Clone)]
pub struct Eigen {
    pub values: DVector<f64>,
    pub vectors: DMatrix<f64>,
}

/// Thin singular value decomposition `A = U * diag(sigma) * Vt`
#[derive(Debug, Clone)]
pub struct Svd {
    pub u: DMatrix<f64>,
    pub singular_values: DVector<f64>,
    pub v_t: DMatrix<f64>,
}

/// Numeric backend for the two decompositions the pipeline relies on
pub trait Decomposer: Send + Sync {
    /// Backend identifier
    fn name(&self) -> &str;

    /// Eigendecomposition of a symmetric matrix
    fn eig(&self, matrix: &DMatrix<f64>) -> Result<Eigen>;

    /// Singular value decomposition
    fn svd(&self, matrix: &DMatrix<f64>) -> Result<Svd>;
}

/// Default backend on nalgebra's dense solvers
#[derive(Debug, Clone)]
pub struct NalgebraDecomposer {
    eps: f64,
    max_iterations: usize,
}

impl NalgebraDecomposer {
    pub fn new(config: &DecompositionConfig) -> Self {
        Self {
            eps: config.eps,
            max_iterations: config.max_iterations,
        }
    }
}

impl Default for NalgebraDecomposer {
    fn default() -> Self {
        Self::new(&DecompositionConfig::default())
    }
}

impl Decomposer for NalgebraDecomposer {
    fn name(&self) -> &str {
        "nalgebra"
    }

    fn eig(&self, matrix: &DMatrix<f64>) -> Result<Eigen> {
        if !matrix.is_square() {
            return Err(Error::InvalidInput(format!(
                "eigendecomposition needs a square matrix, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }

        let eigen = SymmetricEigen::try_new(matrix.clone(), self.eps, self.max_iterations)
            .ok_or_else(|| {
                Error::IllConditioned(format!(
                    "eigendecomposition did not converge within {} iterations",
                    self.max_iterations
                ))
            })?;

        if eigen.eigenvalues.iter().any(|v| !v.is_finite()) {
            return Err(Error::IllConditioned(
                "eigendecomposition produced non-finite eigenvalues".into(),
            ));
        }

        Ok(Eigen {
            values: eigen.eigenvalues,
            vectors: eigen.eigenvectors,
        })
    }

    fn svd(&self, matrix: &DMatrix<f64>) -> Result<Svd> {
        let svd = SVD::try_new(matrix.clone(), true, true, self.eps, self.max_iterations)
            .ok_or_else(|| {
                Error::IllConditioned(format!(
                    "SVD did not converge within {} iterations",
                    self.max_iterations
                ))
            })?;

        match (svd.u, svd.v_t) {
            (Some(u), Some(v_t)) => Ok(Svd {
                u,
                singular_values: svd.singular_values,
                v_t,
            }),
            _ => Err(Error::IllConditioned("SVD did not produce U and V".into())),
        }
    }
}
