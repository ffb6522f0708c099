//! Per-candidate explanation documents.
//!
//! Explanations are opaque JSON produced elsewhere; this store only files
//! them by candidate pair under `<cache_dir>/explanations/`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use colmatch_model::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::sanitize_file_stem;

/// A stored explanation with its pair and save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredExplanation {
    pub source_column: String,
    pub target_column: String,
    pub saved_at: DateTime<Utc>,
    pub explanation: Value,
}

#[derive(Debug, Clone)]
pub struct ExplanationStore {
    dir: PathBuf,
}

impl ExplanationStore {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        let dir = cache_dir.join("explanations");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, source_column: &str, target_column: &str) -> PathBuf {
        let stem = format!(
            "{}__{}",
            sanitize_file_stem(source_column),
            sanitize_file_stem(target_column)
        );
        self.dir.join(format!("{stem}.json"))
    }

    pub fn save(&self, source_column: &str, target_column: &str, explanation: Value) -> Result<StoredExplanation> {
        let stored = StoredExplanation {
            source_column: source_column.to_string(),
            target_column: target_column.to_string(),
            saved_at: Utc::now(),
            explanation,
        };
        let path = self.path_for(source_column, target_column);
        fs::write(&path, serde_json::to_vec_pretty(&stored)?)?;
        debug!(path = %path.display(), "saved candidate explanation");
        Ok(stored)
    }

    /// The stored explanation, or `None` when absent or unreadable.
    pub fn load(&self, source_column: &str, target_column: &str) -> Option<StoredExplanation> {
        let path = self.path_for(source_column, target_column);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(stored) => Some(stored),
            Err(error) => {
                warn!(path = %path.display(), %error, "corrupt explanation ignored");
                None
            }
        }
    }

    pub fn remove(&self, source_column: &str, target_column: &str) -> Result<bool> {
        let path = self.path_for(source_column, target_column);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}
