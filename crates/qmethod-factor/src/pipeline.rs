//! End-to-end Q-method analysis.
//!
//! validate -> correlate -> extract -> rotate -> normalize -> flag ->
//! synthesize. Each stage returns a new value; any error aborts the run.

use nalgebra::DMatrix;
use qmethod_core::{
    Advisory, DistributionSpec, FactorScoreMatrix, FlagMatrix, LoadingsMatrix, RankingMatrix,
    Result, ZScoreMatrix,
};
use serde::Serialize;

use crate::brief::AnalysisBrief;
use crate::characteristics::FactorCharacteristics;
use crate::config::EngineConfig;
use crate::correlation::{check_dimensions, correlate};
use crate::extraction::{check_factor_count, FactorExtractor};
use crate::flagging::Flagger;
use crate::linalg::{Decomposer, NalgebraDecomposer};
use crate::sign::normalize_signs;
use crate::varimax::VarimaxRotator;
use crate::zscores::{factor_scores, validate_distribution, ZScoreSynthesizer};

/// Per-run inputs besides the ranking matrix
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub n_factors: usize,
    /// Every Q-sort follows the same distribution
    pub forced: bool,
    /// Required when `forced` is false
    pub distribution: Option<DistributionSpec>,
}

impl AnalysisOptions {
    /// Forced-distribution analysis with `n_factors` factors
    pub fn new(n_factors: usize) -> Self {
        Self {
            n_factors,
            forced: true,
            distribution: None,
        }
    }

    /// Free-distribution analysis scored against `distribution`
    pub fn free(n_factors: usize, distribution: DistributionSpec) -> Self {
        Self {
            n_factors,
            forced: false,
            distribution: Some(distribution),
        }
    }

    pub fn with_distribution(mut self, distribution: DistributionSpec) -> Self {
        self.distribution = Some(distribution);
        self
    }
}

/// Complete analysis output
#[derive(Debug, Clone, Serialize)]
pub struct QAnalysis {
    pub brief: AnalysisBrief,
    /// Rotated, sign-normalized loadings (Q-sorts x factors)
    pub loadings: LoadingsMatrix,
    pub flagged: FlagMatrix,
    pub zscores: ZScoreMatrix,
    pub factor_scores: FactorScoreMatrix,
    pub characteristics: FactorCharacteristics,
    /// All eigenvalues of the correlation matrix, descending
    pub eigenvalues: Vec<f64>,
    /// Varimax rotation matrix; identity for a single factor
    pub rotation: DMatrix<f64>,
    pub advisories: Vec<Advisory>,
}

impl QAnalysis {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Advisories as human-readable warnings
    pub fn advisory_messages(&self) -> Vec<String> {
        self.advisories.iter().map(ToString::to_string).collect()
    }
}

/// Runs the full pipeline with a fixed configuration and numeric backend
pub struct QAnalyzer {
    config: EngineConfig,
    decomposer: Box<dyn Decomposer>,
}

impl QAnalyzer {
    pub fn new(config: EngineConfig) -> Self {
        let decomposer = Box::new(NalgebraDecomposer::new(&config.decomposition));
        Self { config, decomposer }
    }

    /// Swap the eigen/SVD backend
    pub fn with_decomposer(mut self, decomposer: Box<dyn Decomposer>) -> Self {
        self.decomposer = decomposer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(&self, ranking: &RankingMatrix, options: &AnalysisOptions) -> Result<QAnalysis> {
        let n_statements = ranking.n_statements();
        let n_qsorts = ranking.n_qsorts();
        let distribution = options.distribution.as_ref();

        // Step 1: Input validation, before any numeric work
        check_dimensions(ranking)?;
        check_factor_count(options.n_factors, n_qsorts)?;
        validate_distribution(ranking, options.forced, distribution)?;

        // Step 2: Correlation between Q-sorts
        let correlation = correlate(ranking)?;

        // Step 3: Principal components
        let extraction =
            FactorExtractor::with_config(self.decomposer.as_ref(), &self.config.extraction)
                .extract(&correlation, options.n_factors)?;
        let mut advisories = extraction.advisories;

        // Step 4: Varimax
        let rotation =
            VarimaxRotator::with_config(self.decomposer.as_ref(), self.config.varimax.clone())
                .rotate(&extraction.loadings)?;
        if !rotation.converged {
            tracing::warn!(
                iterations = rotation.iterations,
                delta = rotation.last_delta,
                "Varimax did not converge, using last rotation"
            );
            advisories.push(Advisory::VarimaxNotConverged {
                iterations: rotation.iterations,
                delta: rotation.last_delta,
            });
        }

        // Step 5: Sign canonicalization
        let loadings = normalize_signs(&rotation.loadings)?;

        // Step 6: Automatic pre-flagging
        let flagging = Flagger::new(&self.config.flagging).flag(&loadings, n_statements)?;
        advisories.extend(flagging.advisories);

        // Step 7: Z-scores and factor scores
        let synthesis = ZScoreSynthesizer::new().synthesize(
            ranking,
            &loadings,
            &flagging.flags,
            options.forced,
            distribution,
        )?;
        let scores = factor_scores(&synthesis.zscores, &synthesis.qscores)?;

        let characteristics =
            FactorCharacteristics::compute(&loadings, &flagging.flags, &synthesis.zscores);

        tracing::info!(
            n_statements,
            n_qsorts,
            n_factors = options.n_factors,
            iterations = rotation.iterations,
            advisories = advisories.len(),
            "Q-method analysis complete"
        );

        Ok(QAnalysis {
            brief: AnalysisBrief::new(n_statements, n_qsorts, options.forced, options.n_factors),
            loadings,
            flagged: flagging.flags,
            zscores: synthesis.zscores,
            factor_scores: scores,
            characteristics,
            eigenvalues: extraction.eigenvalues,
            rotation: rotation.rotation,
            advisories,
        })
    }
}

impl Default for QAnalyzer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Analyze with the default configuration
pub fn analyze(ranking: &RankingMatrix, options: &AnalysisOptions) -> Result<QAnalysis> {
    QAnalyzer::default().analyze(ranking, options)
}
