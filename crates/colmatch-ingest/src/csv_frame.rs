//! CSV → `DataFrame` loading.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

/// Read a CSV file with a header row into a DataFrame.
pub fn read_csv_frame(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded csv"
    );
    Ok(df)
}

/// Parse CSV text with a header row into a DataFrame.
pub fn read_csv_str(text: &str) -> Result<DataFrame> {
    let cursor = Cursor::new(text.as_bytes().to_vec());
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()
        .context("Failed to parse CSV text")?;
    Ok(df)
}
