//! Non-fatal findings returned alongside a successful analysis.
//!
//! Automatic flagging and rotation can land in situations a researcher
//! should double check by hand. These never abort the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Q-sorts flagged on a factor they load negatively on
    NegativeFlaggedLoading { qsorts: Vec<usize> },

    /// Q-sorts flagged for two or more factors
    MultipleFactorFlags { qsorts: Vec<usize> },

    /// No Q-sort flagged for the factor; it has no z-scores
    UnflaggedFactor { factor: usize },

    /// Varimax stopped at the iteration cap; the last rotation is used
    VarimaxNotConverged { iterations: usize, delta: f64 },

    /// A retained eigenvalue was negative and clamped to zero
    NegativeEigenvalueClamped { factor: usize, eigenvalue: f64 },
}

impl Advisory {
    /// Whether the advisory concerns the automatic pre-flagging
    pub fn is_flagging(&self) -> bool {
        matches!(
            self,
            Advisory::NegativeFlaggedLoading { .. }
                | Advisory::MultipleFactorFlags { .. }
                | Advisory::UnflaggedFactor { .. }
        )
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NegativeFlaggedLoading { qsorts } => write!(
                f,
                "One or more Q-sorts with negative loadings are flagged through the automatic \
                 pre-flagging (Q-sorts {:?}). This is not necessarily an issue, but double \
                 check the flags manually.",
                qsorts
            ),
            Advisory::MultipleFactorFlags { qsorts } => write!(
                f,
                "One or more Q-sorts is flagged for two or more factors through the automatic \
                 pre-flagging (Q-sorts {:?}). This is not necessarily an issue, but double \
                 check the flags manually.",
                qsorts
            ),
            Advisory::UnflaggedFactor { factor } => write!(
                f,
                "Factor {} has no flagged Q-sorts; its z-scores are undefined.",
                factor + 1
            ),
            Advisory::VarimaxNotConverged { iterations, delta } => write!(
                f,
                "Varimax rotation did not converge after {} iterations (last change {:.3e}); \
                 the last rotation was used.",
                iterations, delta
            ),
            Advisory::NegativeEigenvalueClamped { factor, eigenvalue } => write!(
                f,
                "Eigenvalue {:.3e} of factor {} is negative and was clamped to zero; the \
                 correlation matrix is ill-conditioned.",
                eigenvalue,
                factor + 1
            ),
        }
    }
}
