use std::sync::Arc;

use anyhow::Result;
use colmatch_common::column_names;
use colmatch_model::Candidate;

use super::{MatchInput, SourceScores, layer_candidates};
use crate::cluster::cosine_similarity;
use crate::embedding::EmbeddingClusterer;

/// Ranks targets by cosine similarity of column embeddings.
#[derive(Debug, Clone)]
pub struct EmbeddingMatcher {
    clusterer: Arc<EmbeddingClusterer>,
}

impl EmbeddingMatcher {
    pub fn new(clusterer: Arc<EmbeddingClusterer>) -> Self {
        Self { clusterer }
    }

    pub fn top_matches(&self, name: &str, input: &MatchInput<'_>, top_k: usize) -> Result<Vec<Candidate>> {
        let (source_vectors, target_vectors) =
            self.clusterer.get_embeddings(input.source, input.target)?;
        let target_names = column_names(input.target);

        let scores: Vec<SourceScores> = column_names(input.source)
            .into_iter()
            .zip(&source_vectors)
            .map(|(source, source_vector)| {
                let scored = target_names
                    .iter()
                    .zip(&target_vectors)
                    .map(|(target, target_vector)| {
                        let score = f64::from(cosine_similarity(source_vector, target_vector));
                        (target.clone(), score.clamp(0.0, 1.0))
                    })
                    .collect();
                SourceScores::ranked(source, scored, top_k)
            })
            .collect();
        Ok(layer_candidates(&scores, name))
    }
}
