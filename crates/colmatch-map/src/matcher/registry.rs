use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use colmatch_model::{Candidate, MatchError, MatcherWeight};
use tracing::debug;

use super::{
    EMBEDDING_COSINE, EmbeddingMatcher, FUZZY_NAME, GROUNDTRUTH, GroundTruthMatcher, JACCARD_DISTANCE,
    MatchInput, Matcher, VALUE_DISTRIBUTION,
};
use crate::embedding::EmbeddingClusterer;

/// A matcher with its registry name and reliability weight.
#[derive(Debug, Clone)]
pub struct RegisteredMatcher {
    pub name: String,
    pub matcher: Matcher,
    pub weight: f64,
}

impl RegisteredMatcher {
    pub fn top_matches(&self, input: &MatchInput<'_>, top_k: usize) -> Result<Vec<Candidate>> {
        self.matcher.top_matches(&self.name, input, top_k)
    }

    /// Matchers that ignore quadrant pruning and run once on the full frames.
    pub fn is_unconditional(&self) -> bool {
        matches!(self.matcher, Matcher::GroundTruth(_))
    }
}

/// Matchers keyed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct MatcherRegistry {
    entries: Vec<RegisteredMatcher>,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from matcher names.
    ///
    /// Ground-truth pairs add the `groundtruth` matcher even when it is not
    /// listed; listing it without pairs is a configuration error.
    pub fn from_names(
        names: &[String],
        clusterer: Arc<EmbeddingClusterer>,
        groundtruth: Option<Vec<(String, String)>>,
    ) -> colmatch_model::Result<Self> {
        let mut registry = Self::new();
        let mut groundtruth = groundtruth;
        for name in names {
            let matcher = match name.as_str() {
                FUZZY_NAME => Matcher::FuzzyName,
                VALUE_DISTRIBUTION => Matcher::ValueDistribution,
                JACCARD_DISTANCE => Matcher::Jaccard,
                EMBEDDING_COSINE => Matcher::Embedding(EmbeddingMatcher::new(clusterer.clone())),
                GROUNDTRUTH => {
                    let pairs = groundtruth.take().ok_or_else(|| {
                        MatchError::InvalidConfig(
                            "groundtruth matcher requires a ground-truth file".to_string(),
                        )
                    })?;
                    Matcher::GroundTruth(GroundTruthMatcher::new(pairs))
                }
                other => return Err(MatchError::UnknownMatcher(other.to_string())),
            };
            registry.register(name, matcher)?;
        }
        if let Some(pairs) = groundtruth {
            registry.register(GROUNDTRUTH, Matcher::GroundTruth(GroundTruthMatcher::new(pairs)))?;
        }
        debug!(matchers = ?registry.names(), "matcher registry built");
        Ok(registry)
    }

    /// Adds a matcher with weight 1.
    pub fn register(&mut self, name: impl Into<String>, matcher: Matcher) -> colmatch_model::Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(MatchError::InvalidConfig(format!(
                "matcher {name} registered twice"
            )));
        }
        self.entries.push(RegisteredMatcher {
            name,
            matcher,
            weight: 1.0,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredMatcher> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Looks a matcher up, failing for names not in the registry.
    pub fn require(&self, name: &str) -> colmatch_model::Result<&RegisteredMatcher> {
        self.get(name)
            .ok_or_else(|| MatchError::UnknownMatcher(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMatcher> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight(&self, name: &str) -> Option<f64> {
        self.get(name).map(|e| e.weight)
    }

    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.weight))
            .collect()
    }

    /// Overwrites weights by name. Names not in the registry are ignored.
    pub fn set_weights(&mut self, weights: &BTreeMap<String, f64>) {
        for entry in &mut self.entries {
            if let Some(weight) = weights.get(&entry.name) {
                entry.weight = *weight;
            }
        }
    }

    /// Adds `delta` to a matcher's weight. Returns false for unknown names.
    pub fn adjust_weight(&mut self, name: &str, delta: f64) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.weight += delta;
                true
            }
            None => false,
        }
    }

    /// Rescales weights to sum to 1.
    ///
    /// Negative weights are floored at 0 first. When nothing positive remains
    /// every matcher gets the same share.
    pub fn normalize_weights(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        for entry in &mut self.entries {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                entry.weight = 0.0;
            }
        }
        let total: f64 = self.entries.iter().map(|e| e.weight).sum();
        if total > 0.0 {
            for entry in &mut self.entries {
                entry.weight /= total;
            }
        } else {
            let share = 1.0 / self.entries.len() as f64;
            for entry in &mut self.entries {
                entry.weight = share;
            }
        }
    }

    pub fn matcher_weights(&self) -> Vec<MatcherWeight> {
        self.entries
            .iter()
            .map(|e| MatcherWeight {
                name: e.name.clone(),
                weight: e.weight,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingSettings, HashingEmbedder};

    fn clusterer() -> Arc<EmbeddingClusterer> {
        Arc::new(EmbeddingClusterer::new(
            Arc::new(HashingEmbedder::default()),
            EmbeddingSettings::default(),
        ))
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_known_matchers_in_order() {
        let registry = MatcherRegistry::from_names(
            &names(&["fuzzy_name", "embedding_cosine"]),
            clusterer(),
            None,
        )
        .unwrap();
        assert_eq!(registry.names(), ["fuzzy_name", "embedding_cosine"]);
        assert_eq!(registry.weight("fuzzy_name"), Some(1.0));
    }

    #[test]
    fn unknown_matcher_is_rejected() {
        let err = MatcherRegistry::from_names(&names(&["magic"]), clusterer(), None).unwrap_err();
        assert!(matches!(err, MatchError::UnknownMatcher(name) if name == "magic"));
    }

    #[test]
    fn groundtruth_pairs_add_matcher() {
        let registry = MatcherRegistry::from_names(
            &names(&["fuzzy_name"]),
            clusterer(),
            Some(vec![("Gender".to_string(), "gender".to_string())]),
        )
        .unwrap();
        assert!(registry.contains("groundtruth"));
        assert!(registry.require("groundtruth").is_ok());
        assert!(registry.require("nope").is_err());
    }

    #[test]
    fn listed_groundtruth_without_pairs_fails() {
        let err = MatcherRegistry::from_names(&names(&["groundtruth"]), clusterer(), None).unwrap_err();
        assert!(matches!(err, MatchError::InvalidConfig(_)));
    }

    #[test]
    fn normalization_floors_and_falls_back_to_uniform() {
        let mut registry = MatcherRegistry::new();
        registry.register("a", Matcher::FuzzyName).unwrap();
        registry.register("b", Matcher::ValueDistribution).unwrap();
        registry.adjust_weight("a", -5.0);
        registry.normalize_weights();
        assert_eq!(registry.weight("a"), Some(0.0));
        assert_eq!(registry.weight("b"), Some(1.0));

        registry.adjust_weight("b", -2.0);
        registry.normalize_weights();
        assert_eq!(registry.weight("a"), Some(0.5));
        assert_eq!(registry.weight("b"), Some(0.5));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = MatcherRegistry::new();
        registry.register("a", Matcher::FuzzyName).unwrap();
        assert!(registry.register("a", Matcher::Jaccard).is_err());
    }
}
