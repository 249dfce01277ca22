//! Error types for the Q-methodology engine.

use std::fmt;

use thiserror::Error;

/// Which axis of the ranking matrix is too small
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAxis {
    Statements,
    QSorts,
}

impl fmt::Display for DataAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataAxis::Statements => write!(f, "statements"),
            DataAxis::QSorts => write!(f, "Q-sorts"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: need at least {required} {axis}, have {available}")]
    InsufficientData {
        axis: DataAxis,
        required: usize,
        available: usize,
    },

    #[error("Invalid factor count: requested {requested}, must be between 1 and {max}")]
    InvalidFactorCount { requested: usize, max: usize },

    #[error("Ill-conditioned input: {0}")]
    IllConditioned(String),

    #[error(
        "Forced distribution mismatch: Q-sort {qsort} does not follow the same distribution as Q-sort 0"
    )]
    ForcedDistributionMismatch { qsort: usize },

    #[error("Missing or invalid distribution: {0}")]
    MissingOrInvalidDistribution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Caller-contract violations, as opposed to configuration or encoding failures
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::Config(_) | Error::Serialization(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
