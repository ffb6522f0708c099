pub mod cache;
pub mod candidate;
pub mod error;
pub mod frontend;
pub mod operation;
pub mod schema;

pub use cache::{CacheEntry, ValueMatchEntry};
pub use candidate::{Candidate, CandidateStatus, EASY_MATCHER};
pub use error::{FrameSide, MatchError, Result};
pub use frontend::{
    ColumnUniqueValues, FrontendPayload, MatcherWeight, SourceCluster, UniqueValuesPayload,
    ValueBin, ValueMatchTarget, ValueMatchesPayload,
};
pub use operation::{Operation, OperationRecord, UserOperation};
pub use schema::{ColumnType, TargetProperty, TargetSchema};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_round_trips_with_frontend_field_names() {
        let candidate = Candidate::new("Gender", "gender", 0.9, "fuzzy_name");
        let json = serde_json::to_value(&candidate).expect("serialize candidate");
        assert_eq!(json["sourceColumn"], "Gender");
        assert_eq!(json["targetColumn"], "gender");
        assert_eq!(json["matcher"], "fuzzy_name");
        assert_eq!(json["status"], "idle");

        let round: Candidate = serde_json::from_value(json).expect("deserialize candidate");
        assert_eq!(round, candidate);
    }

    #[test]
    fn missing_status_defaults_to_idle() {
        let json = r#"{"sourceColumn":"X","targetColumn":"Y","score":0.5,"matcher":"m"}"#;
        let candidate: Candidate = serde_json::from_str(json).expect("deserialize candidate");
        assert_eq!(candidate.status, CandidateStatus::Idle);
    }

    #[test]
    fn cache_entry_validity_requires_both_hashes() {
        let mut entry = CacheEntry::default();
        assert!(!entry.is_valid_for("a", "b"));
        entry.source_hash = Some("a".to_string());
        entry.target_hash = Some("b".to_string());
        assert!(entry.is_valid_for("a", "b"));
        assert!(!entry.is_valid_for("a", "c"));
    }
}
