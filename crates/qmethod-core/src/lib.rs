//! # QMethod-Core
//!
//! Core types for Q-methodology factor analysis.
//!
//! A Q-sort is one respondent's ranking of a fixed set of statements on a
//! discrete scale (e.g. -2..+2), usually under a forced, quasi-normal
//! distribution. Q-sorts are stored column-wise in a [`RankingMatrix`]
//! (statements x respondents); every derived artifact of the analysis
//! (correlations, loadings, flags, z-scores) is a separate typed matrix.

pub mod advisory;
pub mod error;
pub mod ranking;
pub mod types;

pub use advisory::*;
pub use error::{DataAxis, Error, Result};
pub use ranking::*;
pub use types::*;
