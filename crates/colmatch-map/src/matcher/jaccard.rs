use anyhow::Result;
use colmatch_common::{column_names, column_unique_values, default_process};
use polars::prelude::DataFrame;
use rapidfuzz::distance::levenshtein;

use super::{MatchInput, SourceScores};

/// Two values count as equal at or above this normalized Levenshtein similarity.
pub const JACCARD_VALUE_CUTOFF: f64 = 0.8;

/// Distinct values considered per column.
const MAX_VALUES: usize = 500;

fn values_equal(a: &str, b: &str) -> bool {
    a == b || levenshtein::normalized_similarity(a.chars(), b.chars()) >= JACCARD_VALUE_CUTOFF
}

fn jaccard(source: &[String], target: &[String]) -> f64 {
    if source.is_empty() || target.is_empty() {
        return 0.0;
    }
    let matched = source
        .iter()
        .filter(|s| target.iter().any(|t| values_equal(s, t)))
        .count();
    let union = source.len() + target.len() - matched.min(target.len());
    if union == 0 {
        0.0
    } else {
        (matched as f64 / union as f64).min(1.0)
    }
}

fn processed_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    let mut values: Vec<String> = column_unique_values(column, Some(MAX_VALUES))?
        .iter()
        .map(|v| default_process(v))
        .filter(|v| !v.is_empty())
        .collect();
    values.sort();
    values.dedup();
    Ok(values)
}

/// Jaccard similarity of the unique value sets of every column pair.
pub fn jaccard_scores(input: &MatchInput<'_>, top_k: usize) -> Result<Vec<SourceScores>> {
    let target_names = column_names(input.target);
    let target_values = target_names
        .iter()
        .map(|name| processed_values(input.target, name))
        .collect::<Result<Vec<_>>>()?;

    column_names(input.source)
        .into_iter()
        .map(|source| {
            let values = processed_values(input.source, &source)?;
            let scored = target_names
                .iter()
                .zip(&target_values)
                .map(|(target, target_values)| (target.clone(), jaccard(&values, target_values)))
                .collect();
            Ok(SourceScores::ranked(source, scored, top_k))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn identical_sets_score_one() {
        let a = strings(&["alive", "dead"]);
        assert!((jaccard(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn near_equal_values_count_as_shared() {
        let a = strings(&["stage iia", "stage iib"]);
        let b = strings(&["stage ii a", "stage ii b", "stage iii"]);
        let score = jaccard(&a, &b);
        assert!((score - 2.0 / 3.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn disjoint_sets_score_zero() {
        assert_eq!(jaccard(&strings(&["x"]), &strings(&["completely different"])), 0.0);
        assert_eq!(jaccard(&[], &strings(&["a"])), 0.0);
    }
}
