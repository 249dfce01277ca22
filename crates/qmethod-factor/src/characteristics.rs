//! Summary statistics per factor.
//!
//! Reliability assumes the conventional average reliability coefficient of
//! 0.8 for a single Q-sort; the standard error of factor scores and of the
//! differences between factors follow from it.

use qmethod_core::{FlagMatrix, LoadingsMatrix, ZScoreMatrix};
use serde::{Deserialize, Serialize};

/// Assumed test-retest reliability of one Q-sort
pub const AVERAGE_RELIABILITY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSummary {
    /// Number of flagged Q-sorts
    pub n_loading: usize,
    /// Sum of squared loadings
    pub eigenvalue: f64,
    /// Percentage of total variance
    pub explained_variance: f64,
    /// Composite reliability of the flagged Q-sorts
    pub reliability: f64,
    /// Standard error of the factor z-scores; `None` for unscored factors
    pub se_factor_scores: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorCharacteristics {
    pub factors: Vec<FactorSummary>,
    /// Pearson correlation between factor z-score columns
    pub zscore_correlations: Vec<Vec<Option<f64>>>,
    /// Standard error of differences between factor z-scores
    pub se_differences: Vec<Vec<Option<f64>>>,
}

impl FactorCharacteristics {
    pub fn compute(loadings: &LoadingsMatrix, flags: &FlagMatrix, zscores: &ZScoreMatrix) -> Self {
        let n_qsorts = loadings.n_qsorts() as f64;
        let n_factors = loadings.n_factors();

        let factors: Vec<FactorSummary> = loadings
            .squared_column_sums()
            .into_iter()
            .enumerate()
            .map(|(f, eigenvalue)| {
                let n_loading = flags.count(f);
                let reliability = composite_reliability(n_loading);
                let se_factor_scores = zscores
                    .factor(f)
                    .map(|z| sample_std(z.as_slice()) * (1.0 - reliability).sqrt());

                FactorSummary {
                    n_loading,
                    eigenvalue,
                    explained_variance: 100.0 * eigenvalue / n_qsorts,
                    reliability,
                    se_factor_scores,
                }
            })
            .collect();

        let zscore_correlations = (0..n_factors)
            .map(|a| {
                (0..n_factors)
                    .map(|b| match (zscores.factor(a), zscores.factor(b)) {
                        (Some(x), Some(_)) if a == b => {
                            Some(1.0).filter(|_| sample_std(x.as_slice()) > 0.0)
                        }
                        (Some(x), Some(y)) => pearson(x.as_slice(), y.as_slice()),
                        _ => None,
                    })
                    .collect()
            })
            .collect();

        let se_differences = (0..n_factors)
            .map(|a| {
                (0..n_factors)
                    .map(|b| {
                        let se_a = factors[a].se_factor_scores?;
                        let se_b = factors[b].se_factor_scores?;
                        Some((se_a.powi(2) + se_b.powi(2)).sqrt())
                    })
                    .collect()
            })
            .collect();

        Self {
            factors,
            zscore_correlations,
            se_differences,
        }
    }
}

/// Spearman-Brown composite reliability of `n` Q-sorts
pub fn composite_reliability(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    AVERAGE_RELIABILITY * n / (1.0 + (n - 1.0) * AVERAGE_RELIABILITY)
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n < 2.0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let (cov, vx, vy) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0, 0.0), |(cov, vx, vy), (&xi, &yi)| {
            let dx = xi - mx;
            let dy = yi - my;
            (cov + dx * dy, vx + dx * dx, vy + dy * dy)
        });

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some((cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn create_test_inputs() -> (LoadingsMatrix, FlagMatrix, ZScoreMatrix) {
        let loadings = LoadingsMatrix::from_rows(&[
            vec![0.8, 0.1],
            vec![0.7, 0.2],
            vec![0.1, 0.9],
            vec![0.2, 0.1],
        ])
        .unwrap();
        let flags = FlagMatrix::from_rows(&[
            vec![true, false],
            vec![true, false],
            vec![false, true],
            vec![false, false],
        ])
        .unwrap();
        let zscores = ZScoreMatrix::new(
            3,
            vec![
                Some(DVector::from_vec(vec![-1.0, 0.0, 1.0])),
                Some(DVector::from_vec(vec![1.0, 0.0, -1.0])),
            ],
        )
        .unwrap();
        (loadings, flags, zscores)
    }

    #[test]
    fn test_composite_reliability() {
        assert_eq!(composite_reliability(0), 0.0);
        assert!((composite_reliability(1) - 0.8).abs() < 1e-12);
        assert!((composite_reliability(2) - 1.6 / 1.8).abs() < 1e-12);
        assert!(composite_reliability(10) < 1.0);
    }

    #[test]
    fn test_factor_summaries() {
        let (loadings, flags, zscores) = create_test_inputs();
        let chars = FactorCharacteristics::compute(&loadings, &flags, &zscores);

        let first = &chars.factors[0];
        assert_eq!(first.n_loading, 2);
        assert!((first.eigenvalue - 1.18).abs() < 1e-12);
        assert!((first.explained_variance - 29.5).abs() < 1e-9);

        let se = first.se_factor_scores.unwrap();
        assert!((se - (1.0 - 1.6 / 1.8f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cross_factor_matrices() {
        let (loadings, flags, zscores) = create_test_inputs();
        let chars = FactorCharacteristics::compute(&loadings, &flags, &zscores);

        assert_eq!(chars.zscore_correlations[0][0], Some(1.0));
        assert!((chars.zscore_correlations[0][1].unwrap() + 1.0).abs() < 1e-12);

        let se0 = chars.factors[0].se_factor_scores.unwrap();
        let se1 = chars.factors[1].se_factor_scores.unwrap();
        let sed = chars.se_differences[0][1].unwrap();
        assert!((sed - (se0 * se0 + se1 * se1).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_unscored_factor_has_no_errors() {
        let (loadings, _, _) = create_test_inputs();
        let flags = FlagMatrix::from_rows(&[
            vec![true, false],
            vec![true, false],
            vec![false, false],
            vec![false, false],
        ])
        .unwrap();
        let zscores =
            ZScoreMatrix::new(3, vec![Some(DVector::from_vec(vec![-1.0, 0.0, 1.0])), None])
                .unwrap();
        let chars = FactorCharacteristics::compute(&loadings, &flags, &zscores);

        assert_eq!(chars.factors[1].n_loading, 0);
        assert_eq!(chars.factors[1].reliability, 0.0);
        assert_eq!(chars.factors[1].se_factor_scores, None);
        assert_eq!(chars.zscore_correlations[0][1], None);
        assert_eq!(chars.se_differences[1][1], None);
    }
}
