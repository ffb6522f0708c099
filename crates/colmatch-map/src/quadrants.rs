//! Quadrant partition of candidate target columns.
//!
//! Every (source, target) pair that shows up in the name or value top-k lists
//! lands in one of four buckets, indexed `2 * name_high + value_high`:
//!
//! | index | name | value | meaning                              |
//! |-------|------|-------|--------------------------------------|
//! | 0     | low  | low   | unrelated                            |
//! | 1     | low  | high  | potential when the source has values |
//! | 2     | high | low   | potential                            |
//! | 3     | high | high  | easy when a high tier is also met    |
//!
//! A second, stricter tier (base threshold plus an offset) separates the easy
//! matches, which are accepted outright, from the merely potential ones.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use colmatch_common::column_names;
use colmatch_model::{Candidate, ColumnType};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matcher::{MatchInput, SourceScores, name_scores, value_scores};
use crate::profile::{ColumnProfile, profile_source, profile_target};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadrantThresholds {
    pub column_name: f64,
    pub value: f64,
    pub name_high_offset: f64,
    pub value_high_offset: f64,
}

impl Default for QuadrantThresholds {
    fn default() -> Self {
        Self {
            column_name: 0.7,
            value: 0.4,
            name_high_offset: 0.25,
            value_high_offset: 0.2,
        }
    }
}

impl QuadrantThresholds {
    pub fn name_high(&self) -> f64 {
        self.column_name + self.name_high_offset
    }

    pub fn value_high(&self) -> f64 {
        self.value + self.value_high_offset
    }
}

pub fn quadrant_index(name_high: bool, value_high: bool) -> usize {
    2 * usize::from(name_high) + usize::from(value_high)
}

/// Name and value score of one target for one source column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairScores {
    pub name: f64,
    pub value: f64,
}

/// What the partition needs to know about a source column.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFacts {
    pub name: String,
    pub column_type: ColumnType,
    pub has_values: bool,
}

impl From<&ColumnProfile> for SourceFacts {
    fn from(profile: &ColumnProfile) -> Self {
        Self {
            name: profile.name.clone(),
            column_type: profile.column_type,
            has_values: profile.has_values,
        }
    }
}

#[derive(Debug, Clone)]
struct SourceQuadrants {
    facts: SourceFacts,
    buckets: [Vec<String>; 4],
    scores: HashMap<String, PairScores>,
}

impl SourceQuadrants {
    fn contains(&self, index: usize, target: &str) -> bool {
        self.buckets[index].iter().any(|t| t == target)
    }

    fn score(&self, target: &str) -> PairScores {
        self.scores.get(target).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct CandidateQuadrants {
    thresholds: QuadrantThresholds,
    target_order: Vec<String>,
    numeric_targets: Vec<String>,
    sources: BTreeMap<String, SourceQuadrants>,
    source_order: Vec<String>,
}

impl CandidateQuadrants {
    /// Scores every column pair with the name and value scorers and partitions
    /// the results.
    pub fn build(input: &MatchInput<'_>, top_k: usize, thresholds: QuadrantThresholds) -> Result<Self> {
        let names = name_scores(input, top_k);
        let values = value_scores(input, top_k)?;
        let sources: Vec<SourceFacts> = profile_source(input.source)?
            .iter()
            .map(SourceFacts::from)
            .collect();
        let targets = profile_target(input.target, input.target_schema)?;
        let numeric_targets = targets
            .iter()
            .filter(|t| t.column_type.is_numeric())
            .map(|t| t.name.clone())
            .collect();

        let quadrants = Self::from_scores(
            sources,
            column_names(input.target),
            numeric_targets,
            &names,
            &values,
            thresholds,
        );
        debug!(
            sources = quadrants.source_order.len(),
            targets = quadrants.target_order.len(),
            "built candidate quadrants"
        );
        Ok(quadrants)
    }

    /// Partitions precomputed name and value scores.
    ///
    /// A target missing from one of the lists scores 0 on that axis.
    pub fn from_scores(
        sources: Vec<SourceFacts>,
        target_order: Vec<String>,
        numeric_targets: Vec<String>,
        name_scores: &[SourceScores],
        value_scores: &[SourceScores],
        thresholds: QuadrantThresholds,
    ) -> Self {
        let lookup = |scores: &[SourceScores], source: &str| -> HashMap<String, f64> {
            scores
                .iter()
                .find(|s| s.source_column == source)
                .map(|s| s.targets.iter().cloned().collect())
                .unwrap_or_default()
        };

        let mut by_source = BTreeMap::new();
        let mut source_order = Vec::with_capacity(sources.len());
        for facts in sources {
            let names = lookup(name_scores, &facts.name);
            let values = lookup(value_scores, &facts.name);

            let mut buckets: [Vec<String>; 4] = Default::default();
            let mut scores = HashMap::new();
            for target in &target_order {
                if !names.contains_key(target) && !values.contains_key(target) {
                    continue;
                }
                let pair = PairScores {
                    name: names.get(target).copied().unwrap_or(0.0),
                    value: values.get(target).copied().unwrap_or(0.0),
                };
                let index = quadrant_index(
                    pair.name >= thresholds.column_name,
                    pair.value >= thresholds.value,
                );
                buckets[index].push(target.clone());
                scores.insert(target.clone(), pair);
            }

            source_order.push(facts.name.clone());
            by_source.insert(
                facts.name.clone(),
                SourceQuadrants {
                    facts,
                    buckets,
                    scores,
                },
            );
        }

        Self {
            thresholds,
            target_order,
            numeric_targets,
            sources: by_source,
            source_order,
        }
    }

    pub fn thresholds(&self) -> &QuadrantThresholds {
        &self.thresholds
    }

    /// Source columns in dataframe order.
    pub fn source_columns(&self) -> &[String] {
        &self.source_order
    }

    pub fn source_facts(&self, source_column: &str) -> Option<&SourceFacts> {
        self.sources.get(source_column).map(|s| &s.facts)
    }

    /// Targets in the quadrant, in target column order.
    pub fn get_quadrant(&self, source_column: &str, name_high: bool, value_high: bool) -> &[String] {
        match self.sources.get(source_column) {
            Some(source) => &source.buckets[quadrant_index(name_high, value_high)],
            None => &[],
        }
    }

    pub fn pair_scores(&self, source_column: &str, target_column: &str) -> Option<PairScores> {
        self.sources
            .get(source_column)
            .and_then(|s| s.scores.get(target_column).copied())
    }

    /// Targets confident enough to accept without running any matcher.
    ///
    /// With `very_high` the stricter tier applies. A target qualifies by name
    /// (high-name quadrant and name score at the tier) or, for string source
    /// columns with values, by value (high/high quadrant and value score at
    /// the tier).
    pub fn get_easy_matches(&self, source_column: &str, very_high: bool) -> Vec<String> {
        let Some(source) = self.sources.get(source_column) else {
            return Vec::new();
        };
        let (name_tier, value_tier) = if very_high {
            (self.thresholds.name_high(), self.thresholds.value_high())
        } else {
            (self.thresholds.column_name, self.thresholds.value)
        };
        let value_signal =
            source.facts.has_values && source.facts.column_type == ColumnType::String;

        self.target_order
            .iter()
            .filter(|target| {
                let scores = source.score(target);
                let by_name = (source.contains(2, target) || source.contains(3, target))
                    && scores.name >= name_tier;
                let by_value = value_signal && source.contains(3, target) && scores.value >= value_tier;
                by_name || by_value
            })
            .cloned()
            .collect()
    }

    /// Targets worth running the matchers on: the high-name quadrants, plus
    /// the low-name/high-value quadrant when the source has values, minus the
    /// easy matches.
    pub fn get_potential_matches(&self, source_column: &str) -> Vec<String> {
        let Some(source) = self.sources.get(source_column) else {
            return Vec::new();
        };
        let easy = self.get_easy_matches(source_column, true);
        self.target_order
            .iter()
            .filter(|target| {
                let in_potential = source.contains(2, target)
                    || source.contains(3, target)
                    || (source.facts.has_values && source.contains(1, target));
                in_potential && !easy.contains(target)
            })
            .cloned()
            .collect()
    }

    pub fn get_unrelated_columns(&self, source_column: &str) -> Vec<String> {
        self.get_quadrant(source_column, false, false).to_vec()
    }

    /// Numeric target columns, the comparison set for numeric sources.
    pub fn potential_numeric_targets(&self) -> &[String] {
        &self.numeric_targets
    }

    pub fn get_potential_target_df(&self, source_column: &str, target: &DataFrame) -> PolarsResult<DataFrame> {
        target.select(self.get_potential_matches(source_column))
    }

    pub fn get_potential_numeric_target_df(&self, target: &DataFrame) -> PolarsResult<DataFrame> {
        target.select(self.numeric_targets.iter().map(String::as_str))
    }

    /// Easy matches as finalized candidates.
    pub fn easy_candidates(&self, source_column: &str) -> Vec<Candidate> {
        self.get_easy_matches(source_column, true)
            .into_iter()
            .map(|target| Candidate::easy(source_column, target))
            .collect()
    }
}
