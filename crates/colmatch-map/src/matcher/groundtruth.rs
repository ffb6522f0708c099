use colmatch_common::column_names;
use colmatch_model::{Candidate, CandidateStatus};

use super::MatchInput;

/// Emits known mappings as accepted candidates, bypassing all thresholds.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthMatcher {
    pairs: Vec<(String, String)>,
}

impl GroundTruthMatcher {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Known mappings whose source column is part of this input.
    pub fn top_matches(&self, name: &str, input: &MatchInput<'_>) -> Vec<Candidate> {
        let sources = column_names(input.source);
        self.pairs
            .iter()
            .filter(|(source, _)| sources.contains(source))
            .map(|(source, target)| {
                Candidate::new(source.clone(), target.clone(), 1.0, name)
                    .with_status(CandidateStatus::Accepted)
            })
            .collect()
    }
}
