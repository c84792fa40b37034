//! # Coursekit Exercise
//!
//! Editable exercise content: answer lists, exercise nodes and the ordered
//! collection a Playground session works on.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Identity vs Position
//! - Answers and nodes carry a stable id that never changes on reorder
//! - Indices are only ever derived from ids, never stored next to them
//! - `AnswerList` owns its `correct` index so it can re-derive it atomically
//!
//! ### All-or-nothing Mutation
//! - Every fallible operation validates before it touches `self`
//! - On `Err` the value is exactly what it was before the call

mod answer;
mod collection;
mod history;
mod node;

pub use answer::{AnswerItem, AnswerList};
pub use collection::ExerciseCollection;
pub use history::History;
pub use node::{ExerciseKind, ExerciseNode, NodeId, NodePatch};

/// Result type for exercise operations
pub type ExerciseResult<T> = Result<T, ExerciseError>;

/// Errors that can occur while editing exercise content
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExerciseError {
    #[error("Answer index {index} is out of bounds (len {len})")]
    AnswerOutOfRange { index: usize, len: usize },

    #[error("Correct answer index {index} is out of bounds (len {len})")]
    CorrectOutOfRange { index: usize, len: usize },

    #[error("Duplicate answer id: {0}")]
    DuplicateAnswerId(String),

    #[error("Exercise node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node index {index} is out of bounds (len {len})")]
    NodeOutOfRange { index: usize, len: usize },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_creation() {
        let collection = ExerciseCollection::new();
        assert!(collection.is_empty());
        assert!(collection.toggled_indices().is_empty());
    }

    #[test]
    fn test_node_edit_through_collection() {
        let mut collection = ExerciseCollection::new();
        let id = collection.add_node(ExerciseKind::SimpleSelection);

        collection
            .edit_answers(id, |answers| {
                answers.append("Paris");
                answers.append("Rome");
                answers.select_correct(1)
            })
            .unwrap();

        let node = collection.get(id).unwrap();
        assert_eq!(node.answers().len(), 2);
        assert_eq!(node.correct(), Some(1));
        assert_eq!(node.answers().correct_item().unwrap().value, "Rome");
    }

    #[test]
    fn test_error_messages() {
        let err = ExerciseError::CorrectOutOfRange { index: 5, len: 1 };
        assert_eq!(
            err.to_string(),
            "Correct answer index 5 is out of bounds (len 1)"
        );
    }
}
