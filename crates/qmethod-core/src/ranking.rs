//! Raw survey input: the ranking matrix and the target score distribution.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Statements x Q-sorts matrix of rank scores.
///
/// Row `s` holds every respondent's score for statement `s`; column `j`
/// is the complete Q-sort of respondent `j`. Every cell is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct RankingMatrix {
    data: DMatrix<f64>,
}

impl RankingMatrix {
    /// Build from statement rows (one inner vector per statement)
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_statements = rows.len();
        let n_qsorts = rows.first().map(Vec::len).unwrap_or(0);

        if let Some((statement, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_qsorts)
        {
            return Err(Error::InvalidInput(format!(
                "statement {} has {} scores, expected {}",
                statement,
                row.len(),
                n_qsorts
            )));
        }

        let data =
            DMatrix::from_row_iterator(n_statements, n_qsorts, rows.into_iter().flatten());
        Self::from_matrix(data)
    }

    /// Build from integer scores, the usual shape of survey submissions
    pub fn from_integer_rows(rows: &[Vec<i32>]) -> Result<Self> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|&v| f64::from(v)).collect())
                .collect(),
        )
    }

    pub fn from_matrix(data: DMatrix<f64>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidInput("ranking matrix is empty".into()));
        }

        let n_statements = data.nrows();
        if let Some((idx, value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "non-numeric score {} at statement {}, Q-sort {}",
                value,
                idx % n_statements,
                idx / n_statements
            )));
        }

        Ok(Self { data })
    }

    pub fn n_statements(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_qsorts(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, statement: usize, qsort: usize) -> f64 {
        self.data[(statement, qsort)]
    }

    /// Scores of one respondent, in statement order
    pub fn qsort(&self, qsort: usize) -> Vec<f64> {
        self.data.column(qsort).iter().copied().collect()
    }

    /// Scores of one respondent, ascending (the multiset of the Q-sort)
    pub fn sorted_qsort(&self, qsort: usize) -> Vec<f64> {
        let mut values = self.qsort(qsort);
        values.sort_by(f64::total_cmp);
        values
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for RankingMatrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<RankingMatrix> for Vec<Vec<f64>> {
    fn from(matrix: RankingMatrix) -> Self {
        matrix.to_rows()
    }
}

/// Target multiset of scores, one entry per statement.
///
/// In forced mode this is the shape every Q-sort must reproduce; in free
/// mode it is supplied by the caller and only checked against the
/// statement count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct DistributionSpec {
    values: Vec<f64>,
}

impl DistributionSpec {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::MissingOrInvalidDistribution(
                "distribution is empty".into(),
            ));
        }

        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::MissingOrInvalidDistribution(format!(
                "non-numeric value at position {}",
                position
            )));
        }

        Ok(Self { values })
    }

    /// Expand `(score, count)` pairs, e.g. `[(-2, 2), (-1, 4), (0, 7), (1, 4), (2, 2)]`
    pub fn from_counts(counts: &[(i32, usize)]) -> Result<Self> {
        Self::new(
            counts
                .iter()
                .flat_map(|&(score, count)| std::iter::repeat(f64::from(score)).take(count))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Scores in ascending order
    pub fn sorted(&self) -> Vec<f64> {
        let mut values = self.values.clone();
        values.sort_by(f64::total_cmp);
        values
    }

    /// The distribution must provide exactly one score per statement
    pub fn check_length(&self, n_statements: usize) -> Result<()> {
        if self.values.len() != n_statements {
            return Err(Error::MissingOrInvalidDistribution(format!(
                "distribution has {} values but there are {} statements",
                self.values.len(),
                n_statements
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<f64>> for DistributionSpec {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<DistributionSpec> for Vec<f64> {
    fn from(spec: DistributionSpec) -> Self {
        spec.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_layout() {
        let matrix = RankingMatrix::from_rows(vec![
            vec![1.0, -1.0, 0.0],
            vec![0.0, 1.0, -1.0],
        ])
        .unwrap();

        assert_eq!(matrix.n_statements(), 2);
        assert_eq!(matrix.n_qsorts(), 3);
        assert_eq!(matrix.get(0, 1), -1.0);
        assert_eq!(matrix.qsort(2), vec![0.0, -1.0]);
        assert_eq!(matrix.to_rows()[1], vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = RankingMatrix::from_rows(vec![vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_non_numeric_cell_rejected() {
        let result = RankingMatrix::from_rows(vec![vec![1.0, f64::NAN], vec![0.0, 1.0]]);
        match result {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("statement 0, Q-sort 1")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_matrix_rejected() {
        assert!(matches!(
            RankingMatrix::from_rows(Vec::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sorted_qsort() {
        let matrix = RankingMatrix::from_integer_rows(&[vec![2], vec![-1], vec![0]]).unwrap();
        assert_eq!(matrix.sorted_qsort(0), vec![-1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_ranking_deserialize_validates() {
        let ok: RankingMatrix = serde_json::from_str("[[1, 0], [0, 1]]").unwrap();
        assert_eq!(ok.n_qsorts(), 2);

        let ragged: std::result::Result<RankingMatrix, _> = serde_json::from_str("[[1, 0], [0]]");
        assert!(ragged.is_err());
    }

    #[test]
    fn test_distribution_from_counts() {
        let spec =
            DistributionSpec::from_counts(&[(-2, 2), (-1, 4), (0, 7), (1, 4), (2, 2)]).unwrap();
        assert_eq!(spec.len(), 19);
        assert_eq!(spec.sorted()[0], -2.0);
        assert_eq!(spec.sorted()[18], 2.0);
        assert!(spec.check_length(19).is_ok());
        assert!(matches!(
            spec.check_length(18),
            Err(Error::MissingOrInvalidDistribution(_))
        ));
    }

    #[test]
    fn test_distribution_rejects_non_numeric() {
        assert!(matches!(
            DistributionSpec::new(vec![0.0, f64::INFINITY]),
            Err(Error::MissingOrInvalidDistribution(_))
        ));
        assert!(DistributionSpec::new(Vec::new()).is_err());
    }
}
