//! On-disk persistence of candidate cache entries.
//!
//! Each session owns one JSON document under the cache directory. Writes go
//! through a temp file plus rename so a crash never leaves a torn document;
//! an unreadable document is treated as a cache miss.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use colmatch_model::{CacheEntry, Result};
use tracing::{debug, info, warn};

/// File name of a session's cache document.
pub fn cache_file_name(session: &str) -> String {
    format!("matching_results_{}.json", sanitize_file_stem(session))
}

/// Keeps ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_stem(raw: &str) -> String {
    let stem: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

/// Persisted candidate cache of one session.
#[derive(Debug, Clone)]
pub struct CandidateCache {
    path: Option<PathBuf>,
}

impl CandidateCache {
    /// Cache backed by `<cache_dir>/matching_results_<session>.json`.
    ///
    /// Without a directory the cache is memory-only and every load misses.
    pub fn new(cache_dir: Option<&Path>, session: &str) -> Result<Self> {
        let path = match cache_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Some(dir.join(cache_file_name(session)))
            }
            None => None,
        };
        Ok(Self { path })
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Reads the persisted entry. Missing or corrupt documents yield `None`.
    pub fn load(&self) -> Option<CacheEntry> {
        let path = self.path.as_ref()?;
        if !path.exists() {
            return None;
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                warn!(path = %path.display(), %error, "unreadable candidate cache");
                return None;
            }
        };
        match serde_json::from_str::<CacheEntry>(&text) {
            Ok(entry) => {
                debug!(path = %path.display(), candidates = entry.candidates.len(), "loaded candidate cache");
                Some(entry)
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "corrupt candidate cache ignored");
                None
            }
        }
    }

    /// Writes the entry atomically. A no-op for a disabled cache.
    pub fn store(&self, entry: &CacheEntry) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(entry)?;
        let temp_path = path.with_extension("json.tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, path)?;
        info!(path = %path.display(), candidates = entry.candidates.len(), "saved candidate cache");
        Ok(())
    }

    /// Removes the persisted document, if any.
    pub fn clear(&self) -> Result<()> {
        if let Some(path) = self.path.as_ref()
            && path.exists()
        {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use colmatch_model::Candidate;
    use tempfile::tempdir;

    use super::*;

    fn entry() -> CacheEntry {
        CacheEntry {
            source_hash: Some("s".to_string()),
            target_hash: Some("t".to_string()),
            candidates: vec![Candidate::easy("Gender", "gender")],
            ..Default::default()
        }
    }

    #[test]
    fn store_then_load() {
        let dir = tempdir().unwrap();
        let cache = CandidateCache::new(Some(dir.path()), "default").unwrap();
        assert!(cache.load().is_none());
        cache.store(&entry()).unwrap();
        assert_eq!(cache.load(), Some(entry()));
        assert!(!dir.path().join("matching_results_default.json.tmp").exists());
    }

    #[test]
    fn corrupt_document_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = CandidateCache::new(Some(dir.path()), "s1").unwrap();
        fs::write(cache.path().unwrap(), "{not json").unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn disabled_cache_never_hits() {
        let cache = CandidateCache::disabled();
        cache.store(&entry()).unwrap();
        assert!(cache.load().is_none());
        assert!(!cache.is_enabled());
    }

    #[test]
    fn session_names_are_sanitized() {
        assert_eq!(cache_file_name("../evil name"), "matching_results____evil_name.json");
        assert_eq!(sanitize_file_stem(""), "_");
    }
}
