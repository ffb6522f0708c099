//! Matching task configuration.

use std::fs;
use std::path::{Path, PathBuf};

use colmatch_map::{EmbeddingSettings, KNOWN_MATCHERS, QuadrantThresholds};
use colmatch_model::{MatchError, Result};
use serde::{Deserialize, Serialize};

/// Knobs of one matching task. Every field has a default, so a partial JSON
/// document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Candidates kept per source column and matcher.
    pub top_k: usize,
    /// Top-k used for the name and value lists that feed the quadrants.
    pub quadrant_top_k: usize,
    pub column_name_threshold: f64,
    pub value_threshold: f64,
    pub name_high_offset: f64,
    pub value_high_offset: f64,
    /// Learning rate for accepted candidates.
    pub alpha: f64,
    /// Learning rate for rejected candidates.
    pub beta: f64,
    pub update_matcher_weights: bool,
    /// Matchers to run, by registry name.
    pub matchers: Vec<String>,
    pub groundtruth_path: Option<PathBuf>,
    /// Directory for persisted candidates and explanations. Nothing is
    /// written to disk when unset.
    pub cache_dir: Option<PathBuf>,
    pub source_unique_limit: usize,
    pub target_unique_limit: usize,
    pub max_sessions: usize,
    pub embedding: EmbeddingSettings,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_k: 20,
            quadrant_top_k: 40,
            column_name_threshold: 0.7,
            value_threshold: 0.4,
            name_high_offset: 0.25,
            value_high_offset: 0.2,
            alpha: 0.1,
            beta: 0.1,
            update_matcher_weights: true,
            matchers: KNOWN_MATCHERS
                .iter()
                .filter(|name| **name != colmatch_map::GROUNDTRUTH)
                .map(|name| (*name).to_string())
                .collect(),
            groundtruth_path: None,
            cache_dir: None,
            source_unique_limit: 20,
            target_unique_limit: 40,
            max_sessions: 10,
            embedding: EmbeddingSettings::default(),
        }
    }
}

impl MatchingConfig {
    /// Reads a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 || self.quadrant_top_k == 0 {
            return Err(MatchError::InvalidConfig(
                "top_k and quadrant_top_k must be positive".to_string(),
            ));
        }
        if self.max_sessions == 0 {
            return Err(MatchError::InvalidConfig(
                "max_sessions must be positive".to_string(),
            ));
        }
        for (field, value) in [
            ("column_name_threshold", self.column_name_threshold),
            ("value_threshold", self.value_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchError::InvalidConfig(format!(
                    "{field} must be within [0, 1], got {value}"
                )));
            }
        }
        if let Some(unknown) = self
            .matchers
            .iter()
            .find(|name| !KNOWN_MATCHERS.contains(&name.as_str()))
        {
            return Err(MatchError::UnknownMatcher(unknown.clone()));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> QuadrantThresholds {
        QuadrantThresholds {
            column_name: self.column_name_threshold,
            value: self.value_threshold,
            name_high_offset: self.name_high_offset,
            value_high_offset: self.value_high_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MatchingConfig::default();
        assert_eq!(config.top_k, 20);
        assert_eq!(config.quadrant_top_k, 40);
        assert_eq!(
            config.matchers,
            ["fuzzy_name", "value_distribution", "jaccard_distance", "embedding_cosine"]
        );
        let thresholds = config.thresholds();
        assert!((thresholds.name_high() - 0.95).abs() < 1e-9);
        assert!((thresholds.value_high() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: MatchingConfig =
            serde_json::from_str(r#"{"top_k": 5, "matchers": ["fuzzy_name"]}"#).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.matchers, ["fuzzy_name"]);
        assert_eq!(config.max_sessions, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_matcher_fails_validation() {
        let config = MatchingConfig {
            matchers: vec!["coin_flip".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MatchError::UnknownMatcher(name)) if name == "coin_flip"
        ));
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let config = MatchingConfig {
            value_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MatchError::InvalidConfig(_))));
    }
}
