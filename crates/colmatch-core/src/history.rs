//! Linear undo/redo log of review operations.

use colmatch_model::{OperationRecord, UserOperation};

#[derive(Debug, Clone, Default)]
pub struct UserOperationHistory {
    history: Vec<UserOperation>,
    redo_stack: Vec<UserOperation>,
}

impl UserOperationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new operation. Anything undone before is no longer redoable.
    pub fn add_operation(&mut self, operation: UserOperation) {
        self.history.push(operation);
        self.redo_stack.clear();
    }

    /// Moves the latest operation onto the redo stack and returns it.
    pub fn undo_last_operation(&mut self) -> Option<UserOperation> {
        let operation = self.history.pop()?;
        self.redo_stack.push(operation.clone());
        Some(operation)
    }

    /// Moves the latest undone operation back into the history and returns it.
    ///
    /// The rest of the redo stack stays available.
    pub fn redo_last_operation(&mut self) -> Option<UserOperation> {
        let operation = self.redo_stack.pop()?;
        self.history.push(operation.clone());
        Some(operation)
    }

    /// Replaces the most recent entry, used when a redo recomputes its
    /// snapshots.
    pub fn replace_last(&mut self, operation: UserOperation) {
        if let Some(last) = self.history.last_mut() {
            *last = operation;
        }
    }

    pub fn history(&self) -> &[UserOperation] {
        &self.history
    }

    pub fn redo_stack(&self) -> &[UserOperation] {
        &self.redo_stack
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn export_history(&self) -> Vec<OperationRecord> {
        self.history.iter().map(UserOperation::to_record).collect()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use colmatch_model::{Candidate, Operation};

    use super::*;

    fn op(operation: Operation, target: &str) -> UserOperation {
        UserOperation::new(operation, Candidate::new("X", target, 0.5, "fuzzy_name"), Vec::new())
    }

    #[test]
    fn undo_and_redo_move_between_stacks() {
        let mut history = UserOperationHistory::new();
        history.add_operation(op(Operation::Accept, "a"));
        history.add_operation(op(Operation::Reject, "b"));

        let undone = history.undo_last_operation().unwrap();
        assert_eq!(undone.candidate.target_column, "b");
        assert_eq!(history.len(), 1);
        assert_eq!(history.redo_stack().len(), 1);

        let redone = history.redo_last_operation().unwrap();
        assert_eq!(redone.operation, Operation::Reject);
        assert_eq!(history.len(), 2);
        assert!(history.redo_stack().is_empty());
    }

    #[test]
    fn redo_keeps_remaining_redo_entries() {
        let mut history = UserOperationHistory::new();
        history.add_operation(op(Operation::Accept, "a"));
        history.add_operation(op(Operation::Accept, "b"));
        history.undo_last_operation();
        history.undo_last_operation();

        history.redo_last_operation();
        assert_eq!(history.redo_stack().len(), 1);
        assert_eq!(history.redo_stack()[0].candidate.target_column, "b");
    }

    #[test]
    fn new_operation_clears_redo() {
        let mut history = UserOperationHistory::new();
        history.add_operation(op(Operation::Accept, "a"));
        history.undo_last_operation();
        history.add_operation(op(Operation::Discard, "c"));
        assert!(history.redo_stack().is_empty());
        assert_eq!(history.export_history().len(), 1);
    }

    #[test]
    fn empty_stacks_signal_nothing_to_do() {
        let mut history = UserOperationHistory::new();
        assert!(history.undo_last_operation().is_none());
        assert!(history.redo_last_operation().is_none());
        assert!(history.is_empty());
    }
}
