//! Shared utilities for colmatch crates.
//!
//! This crate provides Polars `AnyValue` helpers, column-name normalization
//! and content hashing of dataframes.

pub mod frame;
pub mod hash;
pub mod text;

pub use frame::{
    any_to_f64, any_to_string, column_names, column_strings, column_unique_values, format_numeric,
    parse_f64,
};
pub use hash::frame_content_hash;
pub use text::{default_process, normalize_text};
