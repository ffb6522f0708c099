//! Matcher variants and the name-keyed registry that runs them.
//!
//! Every variant turns a (source, target) dataframe pair into scored
//! [`Candidate`] records attributed to the registry name it runs under.

mod embedding;
mod fuzzy_name;
mod groundtruth;
mod jaccard;
mod registry;
mod value_distribution;

use std::cmp::Ordering;

use anyhow::Result;
use colmatch_model::{Candidate, TargetSchema};
use polars::prelude::DataFrame;

pub use embedding::EmbeddingMatcher;
pub use fuzzy_name::{NEAR_EXACT_CUTOFF, name_scores};
pub use groundtruth::GroundTruthMatcher;
pub use jaccard::{JACCARD_VALUE_CUTOFF, jaccard_scores};
pub use registry::{MatcherRegistry, RegisteredMatcher};
pub use value_distribution::value_scores;

pub const FUZZY_NAME: &str = "fuzzy_name";
pub const VALUE_DISTRIBUTION: &str = "value_distribution";
pub const JACCARD_DISTANCE: &str = "jaccard_distance";
pub const EMBEDDING_COSINE: &str = "embedding_cosine";
pub const GROUNDTRUTH: &str = "groundtruth";

/// Names accepted in a matcher list.
pub const KNOWN_MATCHERS: &[&str] = &[
    FUZZY_NAME,
    VALUE_DISTRIBUTION,
    JACCARD_DISTANCE,
    EMBEDDING_COSINE,
    GROUNDTRUTH,
];

/// Dataframes a matcher scores, plus the target dictionary when known.
#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    pub source: &'a DataFrame,
    pub target: &'a DataFrame,
    pub target_schema: Option<&'a TargetSchema>,
}

impl<'a> MatchInput<'a> {
    pub fn new(source: &'a DataFrame, target: &'a DataFrame) -> Self {
        Self {
            source,
            target,
            target_schema: None,
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Option<&'a TargetSchema>) -> Self {
        self.target_schema = schema;
        self
    }
}

/// Targets scored for one source column, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceScores {
    pub source_column: String,
    pub targets: Vec<(String, f64)>,
}

impl SourceScores {
    /// Keeps positive scores, sorted descending, truncated to `top_k`.
    ///
    /// The sort is stable so equal scores keep target column order.
    pub fn ranked(source_column: String, mut targets: Vec<(String, f64)>, top_k: usize) -> Self {
        targets.retain(|(_, score)| *score > 0.0);
        targets.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        targets.truncate(top_k);
        Self {
            source_column,
            targets,
        }
    }

    pub fn score(&self, target_column: &str) -> Option<f64> {
        self.targets
            .iter()
            .find(|(name, _)| name == target_column)
            .map(|(_, score)| *score)
    }
}

/// Flattens per-source scores into idle candidates for `matcher`.
pub fn layer_candidates(scores: &[SourceScores], matcher: &str) -> Vec<Candidate> {
    scores
        .iter()
        .flat_map(|source| {
            source.targets.iter().map(|(target, score)| {
                Candidate::new(source.source_column.clone(), target.clone(), *score, matcher)
            })
        })
        .collect()
}

/// The closed set of matcher kinds.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Weighted string similarity of column names.
    FuzzyName,
    /// Type compatibility plus value overlap of string columns.
    ValueDistribution,
    /// Jaccard similarity of fuzzily-equal unique values.
    Jaccard,
    /// Cosine similarity of column embeddings.
    Embedding(EmbeddingMatcher),
    /// Fixed known mappings, always accepted.
    GroundTruth(GroundTruthMatcher),
}

impl Matcher {
    /// Scores the input and returns candidates labelled with `name`.
    pub fn top_matches(&self, name: &str, input: &MatchInput<'_>, top_k: usize) -> Result<Vec<Candidate>> {
        match self {
            Self::FuzzyName => Ok(layer_candidates(&name_scores(input, top_k), name)),
            Self::ValueDistribution => Ok(layer_candidates(&value_scores(input, top_k)?, name)),
            Self::Jaccard => Ok(layer_candidates(&jaccard_scores(input, top_k)?, name)),
            Self::Embedding(matcher) => matcher.top_matches(name, input, top_k),
            Self::GroundTruth(matcher) => Ok(matcher.top_matches(name, input)),
        }
    }
}
