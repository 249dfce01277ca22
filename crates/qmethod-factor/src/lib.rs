//! # QMethod-Factor
//!
//! Q-methodology factor analysis: from a matrix of Q-sorts to the
//! idealized statement rankings of each shared viewpoint.
//!
//! ## Pipeline
//!
//! 1. **Correlation** - Pearson correlation between every pair of Q-sorts
//! 2. **Extraction** - principal components of the correlation matrix
//! 3. **Rotation** - orthogonal varimax by repeated SVD
//! 4. **Sign normalization** - each factor's loadings sum non-negative
//! 5. **Flagging** - significant, factor-pure Q-sorts become exemplars
//! 6. **Synthesis** - weighted z-scores and factor scores per statement
//!
//! ## Flagging
//!
//! A loading is significant when `|l| > 1.96 / sqrt(N)` for N statements
//! (2.58 at p < .01), and a Q-sort is only flagged on a factor whose
//! squared loading outweighs all its other squared loadings combined.
//!
//! ## Usage
//!
//! ```no_run
//! use qmethod_core::RankingMatrix;
//! use qmethod_factor::{analyze, AnalysisOptions};
//!
//! # fn main() -> qmethod_core::Result<()> {
//! let ranking = RankingMatrix::from_integer_rows(&[
//!     vec![-1, -1, 1],
//!     vec![0, 1, 0],
//!     vec![1, 0, -1],
//!     vec![0, 0, 0],
//! ])?;
//! let analysis = analyze(&ranking, &AnalysisOptions::new(1))?;
//! for warning in analysis.advisory_messages() {
//!     println!("{}", warning);
//! }
//! # Ok(())
//! # }
//! ```

pub mod brief;
pub mod characteristics;
pub mod config;
pub mod correlation;
pub mod extraction;
pub mod flagging;
pub mod linalg;
pub mod pipeline;
pub mod sign;
pub mod varimax;
pub mod zscores;

pub use brief::*;
pub use characteristics::*;
pub use config::*;
pub use correlation::*;
pub use extraction::*;
pub use flagging::*;
pub use linalg::*;
pub use pipeline::*;
pub use sign::*;
pub use varimax::*;
pub use zscores::*;
