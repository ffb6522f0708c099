//! String similarity scorers built on indel ratio.
//!
//! All scorers return values in `[0, 1]` and expect already processed input
//! (see [`colmatch_common::default_process`]).

use std::collections::BTreeSet;

use rapidfuzz::fuzz;

/// Normalized indel similarity of two strings. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    fuzz::ratio(a.chars(), b.chars())
}

/// Best ratio of the shorter string against any same-length window of the
/// longer one, including windows clipped at either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_chars: Vec<char> = short.chars().collect();
    let long_chars: Vec<char> = long.chars().collect();
    let m = short_chars.len();
    let n = long_chars.len();
    if m == 0 {
        return 0.0;
    }
    if m == n {
        return ratio(short, long);
    }

    let score_window = |window: &[char]| fuzz::ratio(short_chars.iter().copied(), window.iter().copied());

    let mut best = 0.0_f64;
    for end in 1..m {
        best = best.max(score_window(&long_chars[..end]));
        best = best.max(score_window(&long_chars[n - end..]));
    }
    for start in 0..=(n - m) {
        best = best.max(score_window(&long_chars[start..start + m]));
        if best >= 1.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 1.0;
    }

    let sect = intersection.join(" ");
    let join = |diff: &[&str]| {
        if sect.is_empty() {
            diff.join(" ")
        } else {
            format!("{sect} {}", diff.join(" "))
        }
    };
    let combined_ab = join(&diff_ab);
    let combined_ba = join(&diff_ba);

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    if tokens_a.intersection(&tokens_b).next().is_some() {
        return 1.0;
    }
    partial_ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

/// Weighted ratio: picks the most appropriate scorer for the two lengths.
///
/// Similar-length strings compare whole and by token order and set. When one
/// string is much longer, partial scorers take over with a length penalty.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let base = ratio(a, b);
    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;

    if len_ratio < 1.5 {
        let token = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return base.max(token * 0.95);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * 0.95 * partial_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((weighted_ratio("gender", "gender") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_strings_score_zero() {
        assert_eq!(weighted_ratio("", "gender"), 0.0);
        assert_eq!(ratio("", ""), 0.0);
    }

    #[test]
    fn partial_ratio_finds_substring() {
        assert!((partial_ratio("age", "age at diagnosis") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn long_containing_name_is_penalized() {
        let score = weighted_ratio("age", "age at diagnosis");
        assert!((score - 0.9).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn token_order_does_not_matter() {
        assert!((token_sort_ratio("site primary", "primary site") - 1.0).abs() < 1e-9);
        assert!(weighted_ratio("site primary", "primary site") >= 0.95);
    }

    #[test]
    fn token_subset_scores_one() {
        assert!((token_set_ratio("tumor grade", "tumor grade code") - 1.0).abs() < 1e-9);
    }
}
