//! Run summary attached to every analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EXTRACTION_METHOD: &str = "PCA";
pub const FLAGGING_METHOD: &str = "automatic";
pub const CORRELATION_METHOD: &str = "pearson";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBrief {
    pub finished_at: DateTime<Utc>,
    pub pkg_version: String,
    pub n_statements: usize,
    pub n_qsorts: usize,
    pub forced: bool,
    pub n_factors: usize,
    pub extraction: String,
    pub rotation: String,
    pub flagging: String,
    pub correlation: String,
    /// Human-readable summary lines
    pub info: Vec<String>,
}

impl AnalysisBrief {
    pub fn new(n_statements: usize, n_qsorts: usize, forced: bool, n_factors: usize) -> Self {
        Self::at(Utc::now(), n_statements, n_qsorts, forced, n_factors)
    }

    /// Brief stamped with an explicit completion time
    pub fn at(
        finished_at: DateTime<Utc>,
        n_statements: usize,
        n_qsorts: usize,
        forced: bool,
        n_factors: usize,
    ) -> Self {
        let pkg_version = env!("CARGO_PKG_VERSION").to_string();
        let rotation = if n_factors > 1 { "varimax" } else { "none" };

        let info = vec![
            "Q-method analysis.".to_string(),
            format!("Finished on: {}", finished_at.format("%Y-%m-%d %H:%M:%S UTC")),
            format!("'qmethod' package version: {}", pkg_version),
            format!(
                "Original data: {} statements, {} Q-sorts",
                n_statements, n_qsorts
            ),
            format!("Forced distribution: {}", forced),
            format!("Number of factors: {}", n_factors),
            format!("Extraction: {}", EXTRACTION_METHOD),
            format!("Rotation: {}", rotation),
            format!("Flagging: {}", FLAGGING_METHOD),
            format!("Correlation coefficient: {}", CORRELATION_METHOD),
        ];

        Self {
            finished_at,
            pkg_version,
            n_statements,
            n_qsorts,
            forced,
            n_factors,
            extraction: EXTRACTION_METHOD.to_string(),
            rotation: rotation.to_string(),
            flagging: FLAGGING_METHOD.to_string(),
            correlation: CORRELATION_METHOD.to_string(),
            info,
        }
    }
}
