//! Column matching for colmatch.
//!
//! Candidate generation pieces: quadrant pruning over name and value scores,
//! the matcher variants behind a name-keyed registry, embedding-based column
//! clustering, and the feedback-driven matcher weights.

pub mod cluster;
pub mod embedding;
pub mod matcher;
pub mod profile;
pub mod quadrants;
pub mod similarity;
pub mod weights;

pub use cluster::{MAX_SOURCE_NEIGHBORS, MAX_TARGET_CLUSTERS, cosine_similarity, kmeans_clusters, knn_clusters};
pub use embedding::{
    EmbeddingClusterer, EmbeddingProvider, EmbeddingSettings, EncodingMode, HashingEmbedder,
    SamplingMode,
};
pub use matcher::{
    EMBEDDING_COSINE, FUZZY_NAME, GROUNDTRUTH, JACCARD_DISTANCE, KNOWN_MATCHERS, MatchInput,
    Matcher, MatcherRegistry, RegisteredMatcher, SourceScores, VALUE_DISTRIBUTION,
};
pub use profile::{ColumnProfile, dtype_column_type, profile_source, profile_target};
pub use quadrants::{CandidateQuadrants, PairScores, QuadrantThresholds, SourceFacts};
pub use similarity::weighted_ratio;
pub use weights::WeightUpdater;
