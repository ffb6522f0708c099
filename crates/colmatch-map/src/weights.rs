//! Online matcher reliability weights driven by accept/reject feedback.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use colmatch_model::{Candidate, Operation};
use tracing::debug;

use crate::matcher::MatcherRegistry;

/// One matcher's candidate, as `(source, target, score)`.
type RankedPair = (String, String, f64);

/// Adjusts registry weights from user feedback.
///
/// Each matcher's own candidates are ranked best first; a decision on a pair
/// moves that matcher's weight by `rate * score / (rank + 1)`.
#[derive(Debug, Clone)]
pub struct WeightUpdater {
    alpha: f64,
    beta: f64,
    ranked: BTreeMap<String, Vec<RankedPair>>,
}

impl WeightUpdater {
    /// Indexes `candidates` by matcher and normalizes the registry's weights.
    pub fn new(registry: &mut MatcherRegistry, candidates: &[Candidate], alpha: f64, beta: f64) -> Self {
        let mut ranked: BTreeMap<String, Vec<RankedPair>> = BTreeMap::new();
        for candidate in candidates {
            ranked.entry(candidate.matcher.clone()).or_default().push((
                candidate.source_column.clone(),
                candidate.target_column.clone(),
                candidate.score,
            ));
        }
        for pairs in ranked.values_mut() {
            pairs.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
        }
        registry.normalize_weights();
        Self { alpha, beta, ranked }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Rank of the pair in `matcher`'s list and its score.
    pub fn rank_of(&self, matcher: &str, source_column: &str, target_column: &str) -> Option<(usize, f64)> {
        self.ranked.get(matcher)?.iter().enumerate().find_map(|(rank, (s, t, score))| {
            (s == source_column && t == target_column).then_some((rank, *score))
        })
    }

    /// Applies one feedback event and renormalizes.
    ///
    /// Discard carries no signal about a specific pair and leaves weights as
    /// they are. Matchers that are no longer registered are skipped.
    pub fn update_weights(
        &self,
        registry: &mut MatcherRegistry,
        operation: Operation,
        source_column: &str,
        target_column: &str,
    ) {
        let rate = match operation {
            Operation::Accept => self.alpha,
            Operation::Reject => -self.beta,
            Operation::Discard => return,
        };
        for matcher in self.ranked.keys() {
            let Some((rank, score)) = self.rank_of(matcher, source_column, target_column) else {
                continue;
            };
            let delta = rate * score / (rank + 1) as f64;
            if registry.adjust_weight(matcher, delta) {
                debug!(matcher = %matcher, rank, delta, "matcher weight adjusted");
            }
        }
        registry.normalize_weights();
    }
}
