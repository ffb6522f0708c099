//! Loading a matching task from files on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colmatch_core::{DEFAULT_SESSION, MatchingConfig, MatchingTask};
use colmatch_ingest::{load_target_schema, read_csv_frame, schema_frame};
use colmatch_map::HashingEmbedder;
use colmatch_model::TargetSchema;
use polars::prelude::DataFrame;
use tracing::info;

/// Files and session a task is built from.
#[derive(Debug, Clone)]
pub struct TaskInputs {
    /// Source table (CSV with header).
    pub source: PathBuf,
    /// Target data dictionary (`.json`) or target table (CSV).
    pub target: PathBuf,
    pub session: String,
}

impl TaskInputs {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            session: DEFAULT_SESSION.to_string(),
        }
    }
}

fn is_dictionary(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Target dataframe, plus the dictionary when the target is one.
pub fn load_target(path: &Path) -> Result<(DataFrame, Option<TargetSchema>)> {
    if is_dictionary(path) {
        let schema = load_target_schema(path)?;
        let frame = schema_frame(&schema)
            .with_context(|| format!("Failed to build target frame: {}", path.display()))?;
        Ok((frame, Some(schema)))
    } else {
        Ok((read_csv_frame(path)?, None))
    }
}

/// Configuration from an optional JSON file, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<MatchingConfig> {
    match path {
        Some(path) => MatchingConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(MatchingConfig::default()),
    }
}

/// Builds a task with the hashing embedder and loads both tables into it.
pub fn open_task(config: MatchingConfig, inputs: &TaskInputs) -> Result<MatchingTask> {
    let mut task = MatchingTask::with_provider(
        config,
        &inputs.session,
        Arc::new(HashingEmbedder::default()),
    )
    .context("Failed to create matching task")?;
    let source = read_csv_frame(&inputs.source)?;
    let (target, schema) = load_target(&inputs.target)?;
    info!(
        source = %inputs.source.display(),
        target = %inputs.target.display(),
        dictionary = schema.is_some(),
        "inputs loaded"
    );
    task.set_target_schema(schema);
    task.update_dataframe(Some(source), Some(target))
        .context("Failed to load dataframes")?;
    Ok(task)
}
