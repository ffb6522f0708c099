use anyhow::Result;

use super::{MatchInput, SourceScores};
use crate::profile::{profile_source, profile_target, value_similarity};

/// Value similarity of every source column against every target column.
pub fn value_scores(input: &MatchInput<'_>, top_k: usize) -> Result<Vec<SourceScores>> {
    let sources = profile_source(input.source)?;
    let targets = profile_target(input.target, input.target_schema)?;

    Ok(sources
        .iter()
        .map(|source| {
            let scored = targets
                .iter()
                .map(|target| (target.name.clone(), value_similarity(source, target)))
                .collect();
            SourceScores::ranked(source.name.clone(), scored, top_k)
        })
        .collect())
}
