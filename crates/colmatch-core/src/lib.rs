//! Matching orchestration for colmatch.
//!
//! [`MatchingTask`] owns a session's dataframes and candidate cache, drives
//! candidate generation, and applies review operations with undo/redo.
//! [`SessionRegistry`] keeps a bounded set of named tasks.

pub mod cache;
pub mod config;
pub mod explanation;
pub mod history;
pub mod session;
pub mod task;
pub mod values;

pub use cache::{CandidateCache, cache_file_name, sanitize_file_stem};
pub use config::MatchingConfig;
pub use explanation::{ExplanationStore, StoredExplanation};
pub use history::UserOperationHistory;
pub use session::{SessionHandle, SessionRegistry};
pub use task::{DEFAULT_SESSION, MatchingTask};
pub use values::{VALUE_MATCH_CUTOFF, closest_value, histogram, match_values, value_bins};
