//! Target data-dictionary loading.
//!
//! A dictionary is a JSON document `{"properties": [...]}` where each property
//! carries a `name`, a declared `type` and, for enumerations, its permissible
//! values. The target dataframe built from it has one column per property in
//! declaration order.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colmatch_model::{ColumnType, TargetSchema};
use polars::prelude::*;

/// Load a target dictionary from a JSON file.
pub fn load_target_schema(path: impl AsRef<Path>) -> Result<TargetSchema> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read target dictionary: {}", path.display()))?;
    parse_target_schema(&text)
        .with_context(|| format!("Failed to parse target dictionary: {}", path.display()))
}

pub fn parse_target_schema(text: &str) -> Result<TargetSchema> {
    let schema: TargetSchema = serde_json::from_str(text)?;
    Ok(schema)
}

/// Build the target dataframe for a dictionary.
///
/// Enumerated properties hold their permissible values, padded with nulls to
/// the longest enumeration. Numeric properties become all-null `Float64`
/// columns and everything else all-null string columns.
pub fn schema_frame(schema: &TargetSchema) -> PolarsResult<DataFrame> {
    let height = schema
        .properties
        .iter()
        .map(|p| p.enum_values.len())
        .max()
        .unwrap_or(0);

    let mut columns = Vec::with_capacity(schema.properties.len());
    for property in &schema.properties {
        let name: PlSmallStr = property.name.as_str().into();
        let column = if property.column_type() == ColumnType::Numeric {
            Series::new(name, vec![None::<f64>; height]).into_column()
        } else {
            let mut values: Vec<Option<&str>> =
                property.enum_values.iter().map(|v| Some(v.as_str())).collect();
            values.resize(height, None);
            Series::new(name, values).into_column()
        };
        columns.push(column);
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DICTIONARY: &str = r#"{"properties":[
        {"name":"gender","type":"enum","enum":["female","male","unknown"]},
        {"name":"age_at_diagnosis","type":"integer"},
        {"name":"primary_site","type":"string"}
    ]}"#;

    #[test]
    fn frame_follows_dictionary_order() {
        let schema = parse_target_schema(DICTIONARY).unwrap();
        let df = schema_frame(&schema).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, ["gender", "age_at_diagnosis", "primary_site"]);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn numeric_properties_are_float_columns() {
        let schema = parse_target_schema(DICTIONARY).unwrap();
        let df = schema_frame(&schema).unwrap();
        let age = df.column("age_at_diagnosis").unwrap();
        assert_eq!(age.dtype(), &DataType::Float64);
        assert_eq!(age.null_count(), 3);
        assert_eq!(df.column("primary_site").unwrap().null_count(), 3);
    }
}
