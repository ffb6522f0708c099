//! Column embeddings.
//!
//! Each column is rendered as text (its name plus a sample of its values) and
//! sent through an [`EmbeddingProvider`]. Identical renderings are embedded
//! once and shared.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{Result, bail};
use colmatch_common::any_to_string;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Turns texts into vectors, index-aligned with the input.
pub trait EmbeddingProvider: Send + Sync + fmt::Debug {
    fn embed(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>>;
}

/// How a column is rendered before embedding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    Header,
    HeaderValues,
    #[default]
    HeaderValuesVerbose,
}

/// Which values represent a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// First distinct values in row order.
    First,
    /// Most frequent distinct values.
    Frequent,
    /// Half most frequent, the rest first-seen.
    #[default]
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub encoding_mode: EncodingMode,
    pub sampling_mode: SamplingMode,
    pub sampling_size: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            encoding_mode: EncodingMode::HeaderValuesVerbose,
            sampling_mode: SamplingMode::Mixed,
            sampling_size: 10,
            batch_size: 32,
        }
    }
}

/// Deterministic feature-hashing embedder.
///
/// Word tokens and character trigrams are hashed into a fixed number of
/// signed buckets and the result is L2-normalized. No model is needed, and
/// texts sharing vocabulary land close together.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 256;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut vector, &format!("w:{word}"), 1.0);
            let padded: Vec<char> = format!(" {word} ").chars().collect();
            for trigram in padded.windows(3) {
                let trigram: String = trigram.iter().collect();
                self.add_feature(&mut vector, &format!("c:{trigram}"), 0.5);
            }
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size.max(1)) {
            out.extend(batch.iter().map(|text| self.embed_one(text)));
        }
        Ok(out)
    }
}

/// 64-bit FNV-1a. Feature bucketing needs a fast, stable, non-cryptographic
/// hash; `DefaultHasher` output is not guaranteed across releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Renders columns as text and embeds them through a provider.
#[derive(Debug, Clone)]
pub struct EmbeddingClusterer {
    provider: Arc<dyn EmbeddingProvider>,
    settings: EmbeddingSettings,
}

impl EmbeddingClusterer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, settings: EmbeddingSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &EmbeddingSettings {
        &self.settings
    }

    /// Distinct non-null values of a column chosen by the sampling mode.
    pub fn sample_values(&self, column: &Column) -> Result<Vec<String>> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for idx in 0..column.len() {
            let value = column.get(idx)?;
            if matches!(value, AnyValue::Null) {
                continue;
            }
            let text = any_to_string(value);
            match index.get(&text) {
                Some(&pos) => counts[pos].1 += 1,
                None => {
                    index.insert(text.clone(), counts.len());
                    counts.push((text, 1));
                }
            }
        }

        let n = self.settings.sampling_size;
        let first = || counts.iter().map(|(v, _)| v.clone());
        let frequent = || {
            let mut by_count: Vec<&(String, usize)> = counts.iter().collect();
            by_count.sort_by(|a, b| b.1.cmp(&a.1));
            by_count.into_iter().map(|(v, _)| v.clone()).collect::<Vec<_>>()
        };

        let sample = match self.settings.sampling_mode {
            SamplingMode::First => first().take(n).collect(),
            SamplingMode::Frequent => frequent().into_iter().take(n).collect(),
            SamplingMode::Mixed => {
                let mut picked: Vec<String> = frequent().into_iter().take(n.div_ceil(2)).collect();
                for value in first() {
                    if picked.len() >= n {
                        break;
                    }
                    if !picked.contains(&value) {
                        picked.push(value);
                    }
                }
                picked
            }
        };
        Ok(sample)
    }

    /// Text rendering of one column.
    pub fn encode_column(&self, df: &DataFrame, name: &str) -> Result<String> {
        if self.settings.encoding_mode == EncodingMode::Header {
            return Ok(name.to_string());
        }
        let values = self.sample_values(df.column(name)?)?.join(", ");
        Ok(match self.settings.encoding_mode {
            EncodingMode::Header => name.to_string(),
            EncodingMode::HeaderValues if values.is_empty() => name.to_string(),
            EncodingMode::HeaderValues => format!("{name}: {values}"),
            EncodingMode::HeaderValuesVerbose if values.is_empty() => format!("Column: {name}."),
            EncodingMode::HeaderValuesVerbose => format!("Column: {name}. Values: {values}"),
        })
    }

    /// Embeds texts, sending each distinct text to the provider once.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut unique_texts: Vec<String> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut slots = Vec::with_capacity(texts.len());

        for text in texts {
            let slot = match positions.get(text.as_str()) {
                Some(&slot) => slot,
                None => {
                    positions.insert(text.as_str(), unique_texts.len());
                    unique_texts.push(text.clone());
                    unique_texts.len() - 1
                }
            };
            slots.push(slot);
        }

        if unique_texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            texts = texts.len(),
            unique = unique_texts.len(),
            "embedding column representations"
        );
        let vectors = self.provider.embed(&unique_texts, self.settings.batch_size)?;
        if vectors.len() != unique_texts.len() {
            bail!(
                "embedding provider returned {} vectors for {} texts",
                vectors.len(),
                unique_texts.len()
            );
        }
        Ok(slots.into_iter().map(|slot| vectors[slot].clone()).collect())
    }

    fn encode_frame(&self, df: &DataFrame) -> Result<Vec<String>> {
        df.get_columns()
            .iter()
            .map(|column| self.encode_column(df, column.name().as_str()))
            .collect()
    }

    /// One embedding per column of `df`, in column order.
    pub fn embed_frame(&self, df: &DataFrame) -> Result<Vec<Vec<f32>>> {
        self.embed_texts(&self.encode_frame(df)?)
    }

    /// Embeddings for both frames, each aligned to its column order.
    ///
    /// Both frames go through the provider in a single call.
    pub fn get_embeddings(
        &self,
        source: &DataFrame,
        target: &DataFrame,
    ) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>)> {
        let mut texts = self.encode_frame(source)?;
        let source_len = texts.len();
        texts.extend(self.encode_frame(target)?);
        let mut vectors = self.embed_texts(&texts)?;
        let target_vectors = vectors.split_off(source_len.min(vectors.len()));
        Ok((vectors, target_vectors))
    }
}
