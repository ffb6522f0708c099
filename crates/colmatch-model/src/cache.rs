//! Persisted candidate cache document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidateStatus};

/// Value-match table entry for one source column.
///
/// `targets[t][i]` is the best matching value of target column `t` for
/// `source_unique_values[i]`, or an empty string when nothing cleared the cutoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMatchEntry {
    pub source_unique_values: Vec<String>,
    #[serde(default)]
    pub targets: BTreeMap<String, Vec<String>>,
}

impl ValueMatchEntry {
    pub fn new(source_unique_values: Vec<String>) -> Self {
        Self {
            source_unique_values,
            targets: BTreeMap::new(),
        }
    }

    pub fn has_target(&self, target_column: &str) -> bool {
        self.targets.contains_key(target_column)
    }
}

/// Everything derived from one (source, target) pair of dataframes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub source_hash: Option<String>,
    pub target_hash: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Source column → nearest source columns (itself included).
    #[serde(default)]
    pub source_clusters: BTreeMap<String, Vec<String>>,
    /// Groups of target columns.
    #[serde(default)]
    pub target_clusters: Vec<Vec<String>>,
    #[serde(default)]
    pub value_matches: BTreeMap<String, ValueMatchEntry>,
}

impl CacheEntry {
    /// True when this entry was computed from dataframes with these hashes.
    pub fn is_valid_for(&self, source_hash: &str, target_hash: &str) -> bool {
        self.source_hash.as_deref() == Some(source_hash)
            && self.target_hash.as_deref() == Some(target_hash)
    }

    pub fn accepted(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .filter(|c| c.status == CandidateStatus::Accepted)
    }

    /// Records for `source_column`, in cache order.
    pub fn for_source<'a>(&'a self, source_column: &'a str) -> impl Iterator<Item = &'a Candidate> {
        self.candidates
            .iter()
            .filter(move |c| c.source_column == source_column)
    }
}
