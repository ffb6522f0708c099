use std::fmt;

use thiserror::Error;

use crate::candidate::Candidate;

/// Which dataframe an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSide {
    Source,
    Target,
}

impl fmt::Display for FrameSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("source and target dataframes must be provided")]
    MissingDataFrames,
    #[error("column {column} not found in the {side} dataframe")]
    ColumnNotFound { side: FrameSide, column: String },
    #[error("operation {0} not supported")]
    UnsupportedOperation(String),
    #[error("unknown matcher: {0}")]
    UnknownMatcher(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Every matcher invocation failed; `partial` holds what was assembled anyway.
    #[error("all matchers failed ({} failures)", failures.len())]
    AllMatchersFailed {
        failures: Vec<String>,
        partial: Vec<Candidate>,
    },
    #[error("session lock poisoned")]
    LockPoisoned,
    #[error("dataframe error: {0}")]
    Frame(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MatchError {
    pub fn column_not_found(side: FrameSide, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            side,
            column: column.into(),
        }
    }

    /// Candidates assembled before the failure, if any.
    pub fn partial_candidates(&self) -> Option<&[Candidate]> {
        match self {
            Self::AllMatchersFailed { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
