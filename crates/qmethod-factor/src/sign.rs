//! Sign canonicalization of factors.
//!
//! A factor and its negation describe the same viewpoint. Flipping every
//! factor whose loadings sum negative makes results reproducible across
//! solvers.

use qmethod_core::{LoadingsMatrix, Result};

/// Negate each factor column whose loadings sum below zero
pub fn normalize_signs(loadings: &LoadingsMatrix) -> Result<LoadingsMatrix> {
    let mut data = loadings.as_matrix().clone();
    let mut flipped = Vec::new();

    for (factor, mut column) in data.column_iter_mut().enumerate() {
        if column.sum() < 0.0 {
            column.neg_mut();
            flipped.push(factor);
        }
    }

    if !flipped.is_empty() {
        tracing::debug!(?flipped, "Flipped factor signs");
    }

    LoadingsMatrix::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_column_flipped() {
        let loadings =
            LoadingsMatrix::from_rows(&[vec![-0.8, 0.3], vec![-0.6, -0.1], vec![0.2, 0.4]])
                .unwrap();
        let normalized = normalize_signs(&loadings).unwrap();

        assert_eq!(normalized.factor(0), vec![0.8, 0.6, -0.2]);
        assert_eq!(normalized.factor(1), vec![0.3, -0.1, 0.4]);
        assert!(normalized.column_sums().iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn test_input_untouched() {
        let loadings = LoadingsMatrix::from_rows(&[vec![-0.5], vec![-0.5]]).unwrap();
        let _ = normalize_signs(&loadings).unwrap();
        assert_eq!(loadings.factor(0), vec![-0.5, -0.5]);
    }

    #[test]
    fn test_idempotent() {
        let loadings =
            LoadingsMatrix::from_rows(&[vec![-0.8, 0.3], vec![0.1, -0.9]]).unwrap();
        let once = normalize_signs(&loadings).unwrap();
        let twice = normalize_signs(&once).unwrap();
        assert_eq!(once, twice);
    }
}
