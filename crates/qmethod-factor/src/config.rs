//! Engine configuration.
//!
//! Defaults reproduce the reference Q-method behaviour: 20 varimax
//! iterations at tolerance 1e-6 with gamma = 1, and automatic flagging at
//! p < .05 (z = 1.96).

use std::path::Path;

use qmethod_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Principal component extraction
    pub extraction: ExtractionConfig,

    /// Varimax rotation
    pub varimax: VarimaxConfig,

    /// Automatic pre-flagging
    pub flagging: FlaggingConfig,

    /// Eigen/SVD backend limits
    pub decomposition: DecompositionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Retained eigenvalues below `-tolerance` raise an advisory before clamping
    pub negative_eigenvalue_tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarimaxConfig {
    /// Maximum number of SVD updates of the rotation matrix
    pub max_iterations: usize,

    /// Frobenius-norm change of the rotation matrix that counts as converged
    pub tolerance: f64,

    /// 1.0 = varimax
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlaggingConfig {
    pub significance: SignificanceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Convergence threshold handed to the eigen/SVD solvers
    pub eps: f64,

    /// Solver iteration cap; a solver that does not converge is an error
    pub max_iterations: usize,
}

/// Two-tailed significance level for flagging a loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignificanceLevel {
    /// p < .05
    #[default]
    P05,
    /// p < .01
    P01,
}

impl SignificanceLevel {
    /// Critical value of the standard normal distribution
    pub fn z_critical(&self) -> f64 {
        match self {
            SignificanceLevel::P05 => 1.96,
            SignificanceLevel::P01 => 2.58,
        }
    }

    /// Loading threshold for a study with `n_statements` statements
    pub fn threshold(&self, n_statements: usize) -> f64 {
        self.z_critical() / (n_statements as f64).sqrt()
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            negative_eigenvalue_tolerance: 1e-10,
        }
    }
}

impl Default for VarimaxConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-6,
            gamma: 1.0,
        }
    }
}

impl Default for FlaggingConfig {
    fn default() -> Self {
        Self {
            significance: SignificanceLevel::P05,
        }
    }
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            eps: f64::EPSILON,
            max_iterations: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file, with `QMETHOD_*` environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables, e.g. `QMETHOD_VARIMAX__MAX_ITERATIONS=50`
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("QMETHOD")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.varimax.max_iterations == 0 {
            return Err(Error::Config("varimax.max_iterations must be at least 1".into()));
        }
        if !(self.varimax.tolerance > 0.0) {
            return Err(Error::Config("varimax.tolerance must be positive".into()));
        }
        if !self.varimax.gamma.is_finite() {
            return Err(Error::Config("varimax.gamma must be finite".into()));
        }
        if !(self.extraction.negative_eigenvalue_tolerance >= 0.0) {
            return Err(Error::Config(
                "extraction.negative_eigenvalue_tolerance must be non-negative".into(),
            ));
        }
        if !(self.decomposition.eps > 0.0) {
            return Err(Error::Config("decomposition.eps must be positive".into()));
        }
        Ok(())
    }
}

fn config_error(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.varimax.max_iterations, 20);
        assert_eq!(config.varimax.tolerance, 1e-6);
        assert_eq!(config.varimax.gamma, 1.0);
        assert_eq!(config.flagging.significance, SignificanceLevel::P05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_significance_threshold() {
        let threshold = SignificanceLevel::P05.threshold(19);
        assert!((threshold - 1.96 / 19f64.sqrt()).abs() < 1e-12);
        assert!(SignificanceLevel::P01.threshold(19) > threshold);
    }

    #[test]
    fn test_from_file_partial_override() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[varimax]\nmax_iterations = 50\n\n[flagging]\nsignificance = \"p01\"")
            .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.varimax.max_iterations, 50);
        assert_eq!(config.varimax.tolerance, 1e-6);
        assert_eq!(config.flagging.significance, SignificanceLevel::P01);
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[varimax]\nmax_iterations = 0").unwrap();

        assert!(matches!(
            EngineConfig::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::from_file("/nonexistent/qmethod.toml");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
