//! Target data-dictionary schema and semantic column types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a column, used to decide which value signals apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    String,
    Boolean,
    #[default]
    Unknown,
}

impl ColumnType {
    /// Maps a schema-declared property type onto a semantic column type.
    pub fn from_schema_type(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "string" | "enum" => Self::String,
            "number" | "integer" => Self::Numeric,
            "boolean" => Self::Boolean,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property (column) of the target data dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProperty {
    pub name: String,
    /// Declared type as written in the dictionary (`string`, `enum`, `number`, ...).
    #[serde(rename = "type", default)]
    pub property_type: String,
    /// Permissible values for enumerated properties.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TargetProperty {
    pub fn column_type(&self) -> ColumnType {
        ColumnType::from_schema_type(&self.property_type)
    }
}

/// Ordered list of target properties. Order defines target column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSchema {
    #[serde(default)]
    pub properties: Vec<TargetProperty>,
}

impl TargetSchema {
    pub fn new(properties: Vec<TargetProperty>) -> Self {
        Self { properties }
    }

    pub fn property(&self, name: &str) -> Option<&TargetProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Declared type of `name`, or `Unknown` when the dictionary lacks it.
    pub fn column_type(&self, name: &str) -> ColumnType {
        self.property(name)
            .map_or(ColumnType::Unknown, TargetProperty::column_type)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_declared_types() {
        assert_eq!(ColumnType::from_schema_type("enum"), ColumnType::String);
        assert_eq!(ColumnType::from_schema_type("integer"), ColumnType::Numeric);
        assert_eq!(ColumnType::from_schema_type("Boolean"), ColumnType::Boolean);
        assert_eq!(ColumnType::from_schema_type("array"), ColumnType::Unknown);
    }

    #[test]
    fn parses_dictionary_json() {
        let json = r#"{"properties":[
            {"name":"gender","type":"enum","enum":["female","male"]},
            {"name":"age_at_diagnosis","type":"integer","description":"Age in days"}
        ]}"#;
        let schema: TargetSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), ["gender", "age_at_diagnosis"]);
        assert_eq!(schema.column_type("gender"), ColumnType::String);
        assert_eq!(schema.column_type("age_at_diagnosis"), ColumnType::Numeric);
        assert_eq!(schema.column_type("missing"), ColumnType::Unknown);
    }
}
