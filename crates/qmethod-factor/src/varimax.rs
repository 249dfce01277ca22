//! Orthogonal varimax rotation.
//!
//! The rotation matrix `R` starts at the identity and is refined by
//! repeated SVD steps:
//!
//! 1. `L_rot = L * R`
//! 2. `m_j = mean_i(L_rot[i, j]^2)`
//! 3. `D[i, j] = L_rot[i, j]^3 - gamma * L_rot[i, j] * m_j`
//! 4. `B = L^T * D`, `B = U * S * V^T`, `R_new = U * V^T`
//!
//! until `||R_new - R||_F < tolerance` or the iteration cap is hit. The
//! result is always the unrotated loadings times the final `R`.

use nalgebra::DMatrix;
use qmethod_core::{LoadingsMatrix, Result};

use crate::config::VarimaxConfig;
use crate::linalg::Decomposer;

/// Rotated loadings plus the rotation that produced them
#[derive(Debug, Clone)]
pub struct Rotation {
    pub loadings: LoadingsMatrix,
    /// K x K orthogonal rotation matrix
    pub rotation: DMatrix<f64>,
    /// SVD updates performed
    pub iterations: usize,
    pub converged: bool,
    /// Frobenius norm of the last rotation update
    pub last_delta: f64,
}

pub struct VarimaxRotator<'a> {
    config: VarimaxConfig,
    decomposer: &'a dyn Decomposer,
}

impl<'a> VarimaxRotator<'a> {
    pub fn new(decomposer: &'a dyn Decomposer) -> Self {
        Self::with_config(decomposer, VarimaxConfig::default())
    }

    pub fn with_config(decomposer: &'a dyn Decomposer, config: VarimaxConfig) -> Self {
        Self { config, decomposer }
    }

    pub fn rotate(&self, raw: &LoadingsMatrix) -> Result<Rotation> {
        let n_factors = raw.n_factors();
        let identity = DMatrix::identity(n_factors, n_factors);

        // Nothing to rotate with a single factor
        if n_factors <= 1 {
            return Ok(Rotation {
                loadings: raw.clone(),
                rotation: identity,
                iterations: 0,
                converged: true,
                last_delta: 0.0,
            });
        }

        let loadings = raw.as_matrix();
        let n_qsorts = loadings.nrows() as f64;
        let gamma = self.config.gamma;

        let mut rotation = identity;
        let mut iterations = 0;
        let mut converged = false;
        let mut last_delta = f64::INFINITY;

        while iterations < self.config.max_iterations {
            let rotated = loadings * &rotation;

            let column_means: Vec<f64> = rotated
                .column_iter()
                .map(|c| c.norm_squared() / n_qsorts)
                .collect();

            let diff = DMatrix::from_fn(rotated.nrows(), n_factors, |i, j| {
                let l = rotated[(i, j)];
                l.powi(3) - gamma * l * column_means[j]
            });

            let b = loadings.transpose() * diff;
            let svd = self.decomposer.svd(&b)?;
            let next = svd.u * svd.v_t;

            last_delta = (&next - &rotation).norm();
            rotation = next;
            iterations += 1;

            if last_delta < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            tracing::debug!(iterations, "Varimax rotation converged");
        } else {
            tracing::debug!(iterations, last_delta, "Varimax hit the iteration cap");
        }

        Ok(Rotation {
            loadings: LoadingsMatrix::new(loadings * &rotation)?,
            rotation,
            iterations,
            converged,
            last_delta,
        })
    }
}

/// Varimax criterion: summed per-factor variance of squared loadings
pub fn varimax_criterion(loadings: &LoadingsMatrix) -> f64 {
    let n = loadings.n_qsorts() as f64;
    loadings
        .as_matrix()
        .column_iter()
        .map(|c| {
            let squares: Vec<f64> = c.iter().map(|v| v * v).collect();
            let mean = squares.iter().sum::<f64>() / n;
            squares.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n
        })
        .sum()
}
