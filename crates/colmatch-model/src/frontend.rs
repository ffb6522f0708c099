//! Payload shapes handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherWeight {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCluster {
    pub source_column: String,
    pub cluster: Vec<String>,
}

/// Candidates, source clusters and matcher weights in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendPayload {
    pub candidates: Vec<Candidate>,
    pub source_clusters: Vec<SourceCluster>,
    pub matchers: Vec<MatcherWeight>,
}

/// One bar of a value histogram: a category or a numeric range with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueBin {
    pub value: String,
    pub count: usize,
}

/// Value bins of one column. Exactly one of the column fields is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnUniqueValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    pub unique_values: Vec<ValueBin>,
}

impl ColumnUniqueValues {
    pub fn source(column: impl Into<String>, unique_values: Vec<ValueBin>) -> Self {
        Self {
            source_column: Some(column.into()),
            target_column: None,
            unique_values,
        }
    }

    pub fn target(column: impl Into<String>, unique_values: Vec<ValueBin>) -> Self {
        Self {
            source_column: None,
            target_column: Some(column.into()),
            unique_values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueValuesPayload {
    pub source_unique_values: Vec<ColumnUniqueValues>,
    pub target_unique_values: Vec<ColumnUniqueValues>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMatchTarget {
    pub target_column: String,
    pub target_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMatchesPayload {
    pub source_column: String,
    pub source_values: Vec<String>,
    pub targets: Vec<ValueMatchTarget>,
}
