//! Content hashing of dataframes for cache keying.

use polars::prelude::*;
use sha2::{Digest, Sha256};

use crate::frame::any_to_string;

const NULL_MARKER: &[u8] = b"\x00null\x00";
const FIELD_SEPARATOR: &[u8] = b"\x1f";
const COLUMN_SEPARATOR: &[u8] = b"\x1e";

/// Computes a SHA-256 digest over a dataframe's column names, dtypes and cells.
///
/// The digest is order- and value-sensitive: reordering columns or rows, or
/// changing a single cell, yields a different hash. `extra` is folded in
/// after the frame and lets callers key on metadata such as declared types.
pub fn frame_content_hash(df: &DataFrame, extra: &[String]) -> PolarsResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(df.height().to_le_bytes());

    for column in df.get_columns() {
        hasher.update(column.name().as_str().as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(column.dtype().to_string().as_bytes());
        hasher.update(FIELD_SEPARATOR);
        for idx in 0..column.len() {
            let value = column.get(idx)?;
            if matches!(value, AnyValue::Null) {
                hasher.update(NULL_MARKER);
            } else {
                hasher.update(any_to_string(value).as_bytes());
            }
            hasher.update(FIELD_SEPARATOR);
        }
        hasher.update(COLUMN_SEPARATOR);
    }

    for item in extra {
        hasher.update(item.as_bytes());
        hasher.update(FIELD_SEPARATOR);
    }

    Ok(hex::encode(hasher.finalize()))
}
