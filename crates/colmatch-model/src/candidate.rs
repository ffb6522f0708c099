//! Candidate mappings between a source column and a target column.
//!
//! A candidate is always attributed to the matcher that produced it. Records
//! from different matchers for the same column pair are kept side by side and
//! never merged, so each matcher's contribution stays identifiable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Matcher name attached to candidates emitted by the quadrant shortcut.
pub const EASY_MATCHER: &str = "candidate_quadrants";

/// Review status of a candidate.
///
/// Operations only move a record away from `Idle`; undo is the only way back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Idle,
    Accepted,
    Rejected,
    Discarded,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Discarded => "discarded",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "discarded" => Ok(Self::Discarded),
            other => Err(MatchError::InvalidConfig(format!(
                "unknown candidate status: {other}"
            ))),
        }
    }
}

/// A proposed mapping from one source column to one target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Column name in the source dataframe.
    pub source_column: String,
    /// Column name in the target schema.
    pub target_column: String,
    /// Matcher score in `[0, 1]`.
    pub score: f64,
    /// Name of the matcher that produced this record.
    pub matcher: String,
    #[serde(default)]
    pub status: CandidateStatus,
}

impl Candidate {
    /// Creates an idle candidate.
    pub fn new(
        source_column: impl Into<String>,
        target_column: impl Into<String>,
        score: f64,
        matcher: impl Into<String>,
    ) -> Self {
        Self {
            source_column: source_column.into(),
            target_column: target_column.into(),
            score,
            matcher: matcher.into(),
            status: CandidateStatus::Idle,
        }
    }

    /// Creates a finalized quadrant match: score 1.0, accepted.
    pub fn easy(source_column: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self::new(source_column, target_column, 1.0, EASY_MATCHER)
            .with_status(CandidateStatus::Accepted)
    }

    #[must_use]
    pub fn with_status(mut self, status: CandidateStatus) -> Self {
        self.status = status;
        self
    }

    /// True if this record maps the given column pair.
    pub fn is_pair(&self, source_column: &str, target_column: &str) -> bool {
        self.source_column == source_column && self.target_column == target_column
    }

    /// True if this record has the same pair and matcher as `other`.
    pub fn same_record(&self, other: &Candidate) -> bool {
        self.is_pair(&other.source_column, &other.target_column) && self.matcher == other.matcher
    }

    /// True if this record came from the quadrant shortcut.
    pub fn is_easy(&self) -> bool {
        self.matcher == EASY_MATCHER
    }
}
