//! Ground-truth mapping files.
//!
//! A ground-truth file is a CSV with a header row whose first two columns are
//! the source column name and the target column name of a known mapping.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruthPair {
    pub source_column: String,
    pub target_column: String,
}

/// Load ground-truth pairs from a CSV file.
pub fn load_groundtruth(path: impl AsRef<Path>) -> Result<Vec<GroundTruthPair>> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("Ground-truth file {} not found", path.display());
    }
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open ground-truth file: {}", path.display()))?;
    let pairs = read_pairs(reader)
        .with_context(|| format!("Failed to read ground-truth file: {}", path.display()))?;
    debug!(path = %path.display(), pairs = pairs.len(), "loaded ground truth");
    Ok(pairs)
}

/// Parse ground-truth pairs from CSV text.
pub fn parse_groundtruth(text: &str) -> Result<Vec<GroundTruthPair>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    read_pairs(reader)
}

fn read_pairs<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<GroundTruthPair>> {
    let mut pairs = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Invalid record at row {}", idx + 1))?;
        let source = record.get(0).map(str::trim).unwrap_or_default();
        let target = record.get(1).map(str::trim).unwrap_or_default();
        if source.is_empty() || target.is_empty() {
            continue;
        }
        pairs.push(GroundTruthPair {
            source_column: source.to_string(),
            target_column: target.to_string(),
        });
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_two_columns() {
        let text = "original_paper_variable_names,GDC_format_variable_names\n\
                    Gender,gender\n\
                    Age,age_at_diagnosis\n\
                    ,skipped\n";
        let pairs = parse_groundtruth(text).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].source_column, "Age");
        assert_eq!(pairs[1].target_column, "age_at_diagnosis");
    }
}
