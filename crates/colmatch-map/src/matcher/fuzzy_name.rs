use colmatch_common::{column_names, default_process};

use super::{MatchInput, SourceScores};
use crate::similarity::weighted_ratio;

/// Name similarity at or above this cutoff is promoted to an exact 1.0.
pub const NEAR_EXACT_CUTOFF: f64 = 0.95;

/// Column-name similarity of every source column against every target column.
pub fn name_scores(input: &MatchInput<'_>, top_k: usize) -> Vec<SourceScores> {
    let targets: Vec<(String, String)> = column_names(input.target)
        .into_iter()
        .map(|name| {
            let processed = default_process(&name);
            (name, processed)
        })
        .collect();

    column_names(input.source)
        .into_iter()
        .map(|source| {
            let processed = default_process(&source);
            let scored = targets
                .iter()
                .map(|(target, target_processed)| {
                    let score = weighted_ratio(&processed, target_processed);
                    let score = if score >= NEAR_EXACT_CUTOFF { 1.0 } else { score };
                    (target.clone(), score)
                })
                .collect();
            SourceScores::ranked(source, scored, top_k)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    fn frame(names: &[&str]) -> DataFrame {
        DataFrame::new(
            names
                .iter()
                .map(|name| Series::new((*name).into(), vec![None::<&str>]).into_column())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn case_only_difference_is_exact() {
        let source = frame(&["Gender"]);
        let target = frame(&["gender", "race"]);
        let scores = name_scores(&MatchInput::new(&source, &target), 20);
        assert_eq!(scores[0].score("gender"), Some(1.0));
    }

    #[test]
    fn respects_top_k_and_order() {
        let source = frame(&["age"]);
        let target = frame(&["stage", "age_at_diagnosis", "age"]);
        let scores = name_scores(&MatchInput::new(&source, &target), 2);
        assert_eq!(scores[0].targets.len(), 2);
        assert_eq!(scores[0].targets[0].0, "age");
        assert_eq!(scores[0].targets[0].1, 1.0);
    }
}
