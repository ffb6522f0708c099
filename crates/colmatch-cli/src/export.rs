//! Writing review results to disk.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use colmatch_common::any_to_string;
use colmatch_core::MatchingTask;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

/// One accepted source → target mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub source_column: String,
    pub target_column: String,
}

/// Writes a dataframe as CSV with a header row. Nulls become empty fields.
pub fn write_frame_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV: {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    writer.write_record(df.get_column_names().iter().map(|name| name.as_str()))?;
    let columns = df.get_columns();
    for row in 0..df.height() {
        let mut record = Vec::with_capacity(columns.len());
        for column in columns {
            record.push(any_to_string(column.get(row)?));
        }
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
    Ok(())
}

/// Source data of the accepted mappings, under the target column names.
pub fn write_accepted_csv(task: &MatchingTask, path: &Path) -> Result<usize> {
    let accepted = task.get_accepted_candidates()?;
    write_frame_csv(&accepted, path)?;
    info!(path = %path.display(), columns = accepted.width(), "accepted table written");
    Ok(accepted.width())
}

pub fn write_mappings_json(task: &MatchingTask, path: &Path) -> Result<usize> {
    let mappings: Vec<MappingRecord> = task
        .get_accepted_mappings()
        .into_iter()
        .map(|(source_column, target_column)| MappingRecord {
            source_column,
            target_column,
        })
        .collect();
    let json = serde_json::to_string_pretty(&mappings)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write mappings: {}", path.display()))?;
    info!(path = %path.display(), mappings = mappings.len(), "mappings written");
    Ok(mappings.len())
}
