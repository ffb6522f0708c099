//! Per-column type classification and value-based similarity.

use anyhow::Result;
use colmatch_common::{column_unique_values, default_process};
use colmatch_model::{ColumnType, TargetSchema};
use polars::prelude::*;

use crate::similarity::ratio;

/// Maximum number of target values compared against each source value.
pub const TARGET_VALUE_SAMPLE: usize = 50;

/// Semantic type of a column from its dtype.
pub fn dtype_column_type(dtype: &DataType) -> ColumnType {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ColumnType::Numeric,
        DataType::String => ColumnType::String,
        DataType::Boolean => ColumnType::Boolean,
        _ => ColumnType::Unknown,
    }
}

/// What the value signals need to know about one column.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub column_type: ColumnType,
    /// True when at least one cell is non-null.
    pub has_values: bool,
    /// Distinct values, collected for string columns only.
    pub unique_values: Vec<String>,
}

impl ColumnProfile {
    fn build(column: &Column, column_type: ColumnType) -> Result<Self> {
        let unique_values = if column_type == ColumnType::String {
            column_unique_values(column, None)?
        } else {
            Vec::new()
        };
        Ok(Self {
            name: column.name().to_string(),
            column_type,
            has_values: column.null_count() < column.len(),
            unique_values,
        })
    }
}

/// Profiles every source column, typed by dtype.
pub fn profile_source(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
    df.get_columns()
        .iter()
        .map(|column| ColumnProfile::build(column, dtype_column_type(column.dtype())))
        .collect()
}

/// Profiles every target column. A declared dictionary type wins over dtype.
pub fn profile_target(df: &DataFrame, schema: Option<&TargetSchema>) -> Result<Vec<ColumnProfile>> {
    df.get_columns()
        .iter()
        .map(|column| {
            let declared = schema
                .and_then(|s| s.property(column.name().as_str()))
                .map(|p| p.column_type());
            let column_type = declared.unwrap_or_else(|| dtype_column_type(column.dtype()));
            ColumnProfile::build(column, column_type)
        })
        .collect()
}

/// Evenly strided sample of at most `limit` values, first value included.
pub fn stride_sample(values: &[String], limit: usize) -> Vec<&String> {
    if values.len() <= limit {
        return values.iter().collect();
    }
    (0..limit).map(|i| &values[i * values.len() / limit]).collect()
}

/// Mean over source values of the best ratio against the sampled target values.
pub fn string_value_score(source_values: &[String], target_values: &[String]) -> f64 {
    if source_values.is_empty() || target_values.is_empty() {
        return 0.0;
    }
    let targets: Vec<String> = stride_sample(target_values, TARGET_VALUE_SAMPLE)
        .into_iter()
        .map(|v| default_process(v))
        .collect();

    let total: f64 = source_values
        .iter()
        .map(|source| {
            let source = default_process(source);
            targets
                .iter()
                .map(|target| ratio(&source, target))
                .fold(0.0, f64::max)
        })
        .sum();
    total / source_values.len() as f64
}

/// Value similarity of two columns in `[0, 1]`.
///
/// Mismatched or unknown types score 0. Matching non-string types score 1 on
/// type compatibility alone.
pub fn value_similarity(source: &ColumnProfile, target: &ColumnProfile) -> f64 {
    if source.column_type != target.column_type {
        return 0.0;
    }
    match source.column_type {
        ColumnType::Unknown => 0.0,
        ColumnType::Numeric | ColumnType::Boolean => 1.0,
        ColumnType::String => string_value_score(&source.unique_values, &target.unique_values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(column_type: ColumnType, values: &[&str]) -> ColumnProfile {
        ColumnProfile {
            name: "c".to_string(),
            column_type,
            has_values: !values.is_empty(),
            unique_values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn same_values_up_to_case_score_one() {
        let source = profile(ColumnType::String, &["Female", "Male"]);
        let target = profile(ColumnType::String, &["female", "male"]);
        assert!((value_similarity(&source, &target) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn type_mismatch_scores_zero() {
        let source = profile(ColumnType::Numeric, &[]);
        let target = profile(ColumnType::String, &["a"]);
        assert_eq!(value_similarity(&source, &target), 0.0);
    }

    #[test]
    fn numeric_compatibility_scores_one() {
        let source = profile(ColumnType::Numeric, &[]);
        let target = profile(ColumnType::Numeric, &[]);
        assert_eq!(value_similarity(&source, &target), 1.0);
    }

    #[test]
    fn unknown_types_score_zero() {
        let source = profile(ColumnType::Unknown, &[]);
        let target = profile(ColumnType::Unknown, &[]);
        assert_eq!(value_similarity(&source, &target), 0.0);
    }

    #[test]
    fn stride_sample_is_bounded_and_deterministic() {
        let values: Vec<String> = (0..120).map(|i| i.to_string()).collect();
        let sample = stride_sample(&values, 50);
        assert_eq!(sample.len(), 50);
        assert_eq!(sample[0], "0");
        assert_eq!(sample, stride_sample(&values, 50));
    }

    #[test]
    fn source_profile_uses_dtype() {
        let df = DataFrame::new(vec![
            Series::new("Age".into(), vec![Some(30i64), None]).into_column(),
            Series::new("Gender".into(), vec![Some("F"), Some("M")]).into_column(),
            Series::new("Empty".into(), vec![None::<&str>, None]).into_column(),
        ])
        .unwrap();
        let profiles = profile_source(&df).unwrap();
        assert_eq!(profiles[0].column_type, ColumnType::Numeric);
        assert!(profiles[0].unique_values.is_empty());
        assert_eq!(profiles[1].unique_values, vec!["F", "M"]);
        assert!(!profiles[2].has_values);
    }
}
