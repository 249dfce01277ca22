//! Derived matrices produced by the analysis pipeline.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Q-sorts x Q-sorts Pearson correlation matrix (symmetric, unit diagonal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix(DMatrix<f64>);

impl CorrelationMatrix {
    pub fn new(data: DMatrix<f64>) -> Result<Self> {
        if !data.is_square() || data.is_empty() {
            return Err(Error::InvalidInput(format!(
                "correlation matrix must be square and non-empty, got {}x{}",
                data.nrows(),
                data.ncols()
            )));
        }
        Ok(Self(data))
    }

    pub fn dim(&self) -> usize {
        self.0.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.0[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.dim();
        (0..n).all(|i| (0..i).all(|j| (self.0[(i, j)] - self.0[(j, i)]).abs() <= tolerance))
    }
}

/// Q-sorts x factors loading matrix.
///
/// The same entity moves through extraction, rotation and sign
/// normalization; each stage returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingsMatrix(DMatrix<f64>);

impl LoadingsMatrix {
    pub fn new(data: DMatrix<f64>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidInput("loadings matrix is empty".into()));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(Error::IllConditioned(
                "loadings matrix contains non-finite values".into(),
            ));
        }
        Ok(Self(data))
    }

    /// Build from per-Q-sort rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_factors = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != n_factors) {
            return Err(Error::InvalidInput("loadings rows differ in length".into()));
        }
        Self::new(DMatrix::from_row_iterator(
            rows.len(),
            n_factors,
            rows.iter().flatten().copied(),
        ))
    }

    pub fn n_qsorts(&self) -> usize {
        self.0.nrows()
    }

    pub fn n_factors(&self) -> usize {
        self.0.ncols()
    }

    pub fn get(&self, qsort: usize, factor: usize) -> f64 {
        self.0[(qsort, factor)]
    }

    /// Loadings of every Q-sort on one factor
    pub fn factor(&self, factor: usize) -> Vec<f64> {
        self.0.column(factor).iter().copied().collect()
    }

    pub fn column_sums(&self) -> Vec<f64> {
        self.0.column_iter().map(|c| c.sum()).collect()
    }

    /// Sum of squared loadings per factor
    pub fn squared_column_sums(&self) -> Vec<f64> {
        self.0.column_iter().map(|c| c.norm_squared()).collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.0
    }
}

/// Q-sorts x factors significance flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagMatrix(DMatrix<bool>);

impl FlagMatrix {
    pub fn new(data: DMatrix<bool>) -> Self {
        Self(data)
    }

    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let n_factors = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != n_factors) {
            return Err(Error::InvalidInput("flag rows differ in length".into()));
        }
        Ok(Self(DMatrix::from_row_iterator(
            rows.len(),
            n_factors,
            rows.iter().flatten().copied(),
        )))
    }

    pub fn n_qsorts(&self) -> usize {
        self.0.nrows()
    }

    pub fn n_factors(&self) -> usize {
        self.0.ncols()
    }

    pub fn is_flagged(&self, qsort: usize, factor: usize) -> bool {
        self.0[(qsort, factor)]
    }

    /// Number of Q-sorts flagged for a factor
    pub fn count(&self, factor: usize) -> usize {
        self.0.column(factor).iter().filter(|&&flag| flag).count()
    }

    /// Factors a Q-sort is flagged for
    pub fn factors_of(&self, qsort: usize) -> Vec<usize> {
        (0..self.n_factors())
            .filter(|&f| self.0[(qsort, f)])
            .collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<bool> {
        &self.0
    }
}

/// Statements x factors z-scores.
///
/// A factor with no flagged Q-sort has no scoring basis; its column is
/// `None` rather than a column of zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreMatrix {
    n_statements: usize,
    columns: Vec<Option<DVector<f64>>>,
}

impl ZScoreMatrix {
    pub fn new(n_statements: usize, columns: Vec<Option<DVector<f64>>>) -> Result<Self> {
        if columns
            .iter()
            .flatten()
            .any(|c| c.len() != n_statements)
        {
            return Err(Error::InvalidInput(format!(
                "every z-score column must have {} statements",
                n_statements
            )));
        }
        Ok(Self {
            n_statements,
            columns,
        })
    }

    pub fn n_statements(&self) -> usize {
        self.n_statements
    }

    pub fn n_factors(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, statement: usize, factor: usize) -> Option<f64> {
        self.columns[factor].as_ref().map(|c| c[statement])
    }

    pub fn factor(&self, factor: usize) -> Option<&DVector<f64>> {
        self.columns[factor].as_ref()
    }

    pub fn is_scored(&self, factor: usize) -> bool {
        self.columns[factor].is_some()
    }

    pub fn columns(&self) -> &[Option<DVector<f64>>] {
        &self.columns
    }
}

/// Statements x factors idealized Q-sort scores, drawn from the distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScoreMatrix {
    n_statements: usize,
    columns: Vec<Option<Vec<f64>>>,
}

impl FactorScoreMatrix {
    pub fn new(n_statements: usize, columns: Vec<Option<Vec<f64>>>) -> Self {
        Self {
            n_statements,
            columns,
        }
    }

    pub fn n_statements(&self) -> usize {
        self.n_statements
    }

    pub fn n_factors(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, statement: usize, factor: usize) -> Option<f64> {
        self.columns[factor].as_ref().map(|c| c[statement])
    }

    pub fn factor(&self, factor: usize) -> Option<&[f64]> {
        self.columns[factor].as_deref()
    }
}
