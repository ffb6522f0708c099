//! Value-level views of columns: value-match rows and histogram bins.

use std::collections::HashMap;

use colmatch_common::{any_to_f64, any_to_string};
use colmatch_map::dtype_column_type;
use colmatch_model::{ColumnType, ValueBin};
use polars::prelude::*;
use similar::TextDiff;
use tracing::warn;

/// Minimum character-diff ratio for a value to count as matching.
pub const VALUE_MATCH_CUTOFF: f32 = 0.1;
/// Categories reported for string and boolean columns.
pub const CATEGORY_BIN_LIMIT: usize = 10;
/// Histogram bins for numeric columns (ten edges).
pub const NUMERIC_BIN_COUNT: usize = 9;

/// Closest choice by character-diff ratio, or `None` when nothing reaches
/// `cutoff`. The first of equally close choices wins.
pub fn closest_value<'a>(value: &str, choices: &'a [String], cutoff: f32) -> Option<&'a String> {
    let mut best: Option<(&String, f32)> = None;
    for choice in choices {
        let ratio = TextDiff::from_chars(value, choice.as_str()).ratio();
        if ratio < cutoff {
            continue;
        }
        if best.is_none_or(|(_, score)| ratio > score) {
            best = Some((choice, ratio));
        }
    }
    best.map(|(choice, _)| choice)
}

/// Best target value for each source value, `""` where none qualifies.
pub fn match_values(source_values: &[String], target_values: &[String]) -> Vec<String> {
    source_values
        .iter()
        .map(|value| {
            closest_value(value, target_values, VALUE_MATCH_CUTOFF)
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

/// Histogram of a column for display.
///
/// String and boolean columns report their most frequent values seen more
/// than once. Numeric columns report counts over evenly spaced ranges.
pub fn value_bins(column: &Column) -> PolarsResult<Vec<ValueBin>> {
    match dtype_column_type(column.dtype()) {
        ColumnType::String | ColumnType::Boolean => category_bins(column),
        ColumnType::Numeric => numeric_bins(column),
        ColumnType::Unknown => {
            warn!(column = %column.name(), dtype = %column.dtype(), "no value bins for column type");
            Ok(Vec::new())
        }
    }
}

fn category_bins(column: &Column) -> PolarsResult<Vec<ValueBin>> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for idx in 0..column.len() {
        let value = column.get(idx)?;
        if matches!(value, AnyValue::Null) {
            continue;
        }
        let text = any_to_string(value);
        match index.get(&text) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                index.insert(text.clone(), counts.len());
                counts.push((text, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts
        .into_iter()
        .take(CATEGORY_BIN_LIMIT)
        .filter(|(_, count)| *count > 1)
        .map(|(value, count)| ValueBin { value, count })
        .collect())
}

fn numeric_bins(column: &Column) -> PolarsResult<Vec<ValueBin>> {
    let mut values = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        if let Some(v) = any_to_f64(column.get(idx)?)
            && v.is_finite()
        {
            values.push(v);
        }
    }
    Ok(histogram(&values))
}

/// Counts over `NUMERIC_BIN_COUNT` equal-width ranges between the minimum
/// and maximum. The last range includes the maximum. Labels truncate the
/// edges to integers.
pub fn histogram(values: &[f64]) -> Vec<ValueBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / NUMERIC_BIN_COUNT as f64;
    let edges: Vec<f64> = (0..=NUMERIC_BIN_COUNT)
        .map(|i| if i == NUMERIC_BIN_COUNT { max } else { min + step * i as f64 })
        .collect();

    let mut counts = [0usize; NUMERIC_BIN_COUNT];
    for value in values {
        let bin = if step > 0.0 {
            (((value - min) / step).floor() as usize).min(NUMERIC_BIN_COUNT - 1)
        } else {
            // Zero-width range: everything sits on the closing edge.
            NUMERIC_BIN_COUNT - 1
        };
        counts[bin] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, count)| ValueBin {
            value: format!("{}-{}", edges[i] as i64, edges[i + 1] as i64),
            count: *count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn closest_value_prefers_first_of_ties() {
        let choices = strings(&["female", "male"]);
        assert_eq!(closest_value("Female", &choices, 0.1).unwrap(), "female");
        let tied = strings(&["ab", "ba"]);
        assert_eq!(closest_value("a", &tied, 0.1).unwrap(), "ab");
    }

    #[test]
    fn unmatched_values_map_to_empty() {
        let row = match_values(&strings(&["xyz", "Male"]), &strings(&["male"]));
        assert_eq!(row, ["", "male"]);
    }

    #[test]
    fn category_bins_drop_singletons() {
        let column = Series::new("stage".into(), ["I", "II", "II", "III", "III", "III"]).into_column();
        let bins = value_bins(&column).unwrap();
        assert_eq!(
            bins,
            vec![
                ValueBin { value: "III".to_string(), count: 3 },
                ValueBin { value: "II".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn numeric_bins_cover_range_inclusively() {
        let values: Vec<f64> = vec![0.0, 9.0, 18.0, 27.0, 36.0, 45.0, 54.0, 63.0, 72.0, 81.0];
        let bins = histogram(&values);
        assert_eq!(bins.len(), NUMERIC_BIN_COUNT);
        assert_eq!(bins[0].value, "0-9");
        assert_eq!(bins[8].value, "72-81");
        assert_eq!(bins[8].count, 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
    }

    #[test]
    fn constant_numeric_column_lands_in_last_bin() {
        let bins = histogram(&[5.0, 5.0, 5.0]);
        assert_eq!(bins[8].count, 3);
        assert_eq!(bins[0].value, "5-5");
    }

    #[test]
    fn numeric_column_with_nulls() {
        let column = Series::new("age".into(), [Some(10i64), None, Some(20)]).into_column();
        let bins = value_bins(&column).unwrap();
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(value_bins(&Series::new_null("n".into(), 3).into_column()).unwrap().is_empty());
    }
}
