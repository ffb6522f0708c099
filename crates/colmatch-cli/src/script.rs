//! Scripted review sessions.
//!
//! A script is a JSON array of steps applied in order to a task whose
//! candidates have already been generated:
//!
//! ```json
//! [
//!   {"operation": "accept", "sourceColumn": "Gender", "targetColumn": "sex"},
//!   {"operation": "undo"},
//!   {"operation": "discard", "sourceColumn": "Notes", "targetColumn": "comment"}
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use colmatch_core::MatchingTask;
use colmatch_model::{Candidate, Operation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Column pair a review step refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTarget {
    pub source_column: String,
    pub target_column: String,
    /// Picks one matcher's record when the pair has several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum ReviewStep {
    Accept(StepTarget),
    Reject(StepTarget),
    Discard(StepTarget),
    Undo,
    Redo,
}

impl ReviewStep {
    /// The review operation, or `None` for undo and redo.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Accept(_) => Some(Operation::Accept),
            Self::Reject(_) => Some(Operation::Reject),
            Self::Discard(_) => Some(Operation::Discard),
            Self::Undo | Self::Redo => None,
        }
    }

    pub fn target(&self) -> Option<&StepTarget> {
        match self {
            Self::Accept(target) | Self::Reject(target) | Self::Discard(target) => Some(target),
            Self::Undo | Self::Redo => None,
        }
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step: usize,
    pub operation: String,
    pub candidate: Option<Candidate>,
    /// False when an undo or redo had nothing to act on.
    pub applied: bool,
}

pub fn parse_script(text: &str) -> Result<Vec<ReviewStep>> {
    serde_json::from_str(text).context("Failed to parse review script")
}

pub fn load_script(path: &Path) -> Result<Vec<ReviewStep>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read review script: {}", path.display()))?;
    parse_script(&text).with_context(|| format!("Invalid review script: {}", path.display()))
}

/// The cached record a step refers to.
fn resolve(task: &MatchingTask, target: &StepTarget) -> Result<Candidate> {
    task.get_cached_candidates()
        .iter()
        .find(|c| {
            c.is_pair(&target.source_column, &target.target_column)
                && target.matcher.as_ref().is_none_or(|m| &c.matcher == m)
        })
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "no candidate {} -> {}{}",
                target.source_column,
                target.target_column,
                target
                    .matcher
                    .as_ref()
                    .map(|m| format!(" from {m}"))
                    .unwrap_or_default()
            )
        })
}

/// Applies every step in order. Stops at the first step that names a pair
/// with no cached candidate.
pub fn run_script(task: &mut MatchingTask, steps: &[ReviewStep]) -> Result<Vec<StepOutcome>> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let step_number = index + 1;
        let outcome = match (step.operation(), step.target()) {
            (Some(operation), Some(target)) => {
                let candidate = resolve(task, target)
                    .with_context(|| format!("review step {step_number}"))?;
                task.apply_operation(operation, &candidate, Vec::new());
                StepOutcome {
                    step: step_number,
                    operation: operation.to_string(),
                    candidate: Some(candidate),
                    applied: true,
                }
            }
            _ => {
                let (name, record) = if matches!(step, ReviewStep::Undo) {
                    ("undo", task.undo())
                } else {
                    ("redo", task.redo())
                };
                if record.is_none() {
                    warn!(step = step_number, operation = name, "nothing to {name}");
                }
                StepOutcome {
                    step: step_number,
                    operation: match &record {
                        Some(record) => format!("{name} {}", record.operation),
                        None => name.to_string(),
                    },
                    applied: record.is_some(),
                    candidate: record.map(|r| r.candidate),
                }
            }
        };
        outcomes.push(outcome);
    }
    info!(steps = outcomes.len(), "review script applied");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_steps() {
        let steps = parse_script(
            r#"[
                {"operation": "accept", "sourceColumn": "Gender", "targetColumn": "sex"},
                {"operation": "reject", "sourceColumn": "Age", "targetColumn": "age", "matcher": "fuzzy_name"},
                {"operation": "undo"},
                {"operation": "redo"}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(
            steps[0],
            ReviewStep::Accept(StepTarget {
                source_column: "Gender".to_string(),
                target_column: "sex".to_string(),
                matcher: None,
            })
        );
        assert!(matches!(&steps[1], ReviewStep::Reject(t) if t.matcher.as_deref() == Some("fuzzy_name")));
        assert_eq!(steps[2], ReviewStep::Undo);
    }

    #[test]
    fn rejects_unknown_operations() {
        assert!(parse_script(r#"[{"operation": "merge"}]"#).is_err());
    }
}
