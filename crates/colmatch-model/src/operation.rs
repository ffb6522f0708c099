//! User review operations and their history records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::error::MatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Accept,
    Reject,
    Discard,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Discard => "discard",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "discard" => Ok(Self::Discard),
            _ => Err(MatchError::UnsupportedOperation(s.to_string())),
        }
    }
}

/// One applied review operation.
///
/// `references` are the records the caller asked to restore on undo.
/// `touched` snapshots the cached records the operation changed, in their
/// state before it ran. `previous_weights` holds the matcher weights from
/// before the operation when weight learning was enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOperation {
    pub operation: Operation,
    pub candidate: Candidate,
    #[serde(default)]
    pub references: Vec<Candidate>,
    #[serde(default)]
    pub touched: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_weights: Option<BTreeMap<String, f64>>,
}

/// Serialized form of a history entry exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: Operation,
    pub candidate: Candidate,
}

impl UserOperation {
    pub fn new(operation: Operation, candidate: Candidate, references: Vec<Candidate>) -> Self {
        Self {
            operation,
            candidate,
            references,
            touched: Vec::new(),
            previous_weights: None,
        }
    }

    #[must_use]
    pub fn with_touched(mut self, touched: Vec<Candidate>) -> Self {
        self.touched = touched;
        self
    }

    #[must_use]
    pub fn with_previous_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.previous_weights = Some(weights);
        self
    }

    pub fn to_record(&self) -> OperationRecord {
        OperationRecord {
            operation: self.operation,
            candidate: self.candidate.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_operation_names_case_insensitively() {
        assert_eq!("accept".parse::<Operation>().unwrap(), Operation::Accept);
        assert_eq!(" Reject ".parse::<Operation>().unwrap(), Operation::Reject);
        assert_eq!("DISCARD".parse::<Operation>().unwrap(), Operation::Discard);
    }

    #[test]
    fn rejects_unknown_operation_names() {
        let err = "merge".parse::<Operation>().unwrap_err();
        assert!(matches!(err, MatchError::UnsupportedOperation(name) if name == "merge"));
    }

    #[test]
    fn record_omits_references() {
        let op = UserOperation::new(
            Operation::Reject,
            Candidate::new("X", "Y", 0.4, "fuzzy_name"),
            vec![Candidate::new("X", "Y", 0.4, "fuzzy_name")],
        );
        let json = serde_json::to_value(op.to_record()).unwrap();
        assert_eq!(json["operation"], "reject");
        assert_eq!(json["candidate"]["sourceColumn"], "X");
        assert!(json.get("references").is_none());
    }
}
