//! # Coursekit Core
//!
//! Course authoring state: the creation wizard, the module/lesson outline,
//! Playground sessions and the text form of exercises.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Authoring                          │
//! │  ┌─────────────┐ ┌─────────────┐ ┌──────────────────────┐ │
//! │  │   Config    │ │  EventBus   │ │  reduce(draft, act)  │ │
//! │  └─────────────┘ └─────────────┘ └──────────────────────┘ │
//! │         │                                                 │
//! │  ┌──────┴───────────────────────────────────┐             │
//! │  │               CourseDraft                 │             │
//! │  │  wizard step · tags · modules · lessons   │             │
//! │  └───────────────────────────────────────────┘             │
//! │         │ open                                             │
//! │  ┌──────┴──────────────┐   ┌────────────────┐              │
//! │  │  PlaygroundSession  │◄──│   Serializer   │              │
//! │  └─────────────────────┘   └────────────────┘              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod collab;
pub mod command;
pub mod config;
pub mod draft;
pub mod editor;
pub mod event;
pub mod outline;
pub mod playground;
pub mod serializer;
pub mod validation;
pub mod wizard;

pub use collab::{DragMove, HttpClient, HttpResponse, Notifier, RequestConfig, SessionProvider, Translator};
pub use command::{reduce, Action};
pub use config::{Config, ConfigError};
pub use draft::{CategoryRef, CourseDraft, InstructorRef, Tag, TagSet};
pub use editor::Authoring;
pub use event::{EditorEvent, EventBus, EventHandler};
pub use outline::{Lesson, LessonId, Module, ModuleId};
pub use playground::{EditMode, PlaygroundAction, PlaygroundSession};
pub use serializer::Serializer;
pub use validation::{FieldIssue, IssueCode, ValidationError};
pub use wizard::{Step, StepOutcome};

use coursekit_exercise::{ExerciseError, NodeId};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Exercise error: {0}")]
    Exercise(#[from] ExerciseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Module not found: {0}")]
    ModuleNotFound(ModuleId),

    #[error("No module at index {0}")]
    ModuleIndexOutOfRange(usize),

    #[error("No lesson at index {lesson} in module {module}")]
    LessonIndexOutOfRange { module: usize, lesson: usize },

    #[error("Lesson not found: {0}")]
    LessonNotFound(LessonId),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("No playground is open")]
    NoPlayground,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Node {0} is not in text mode")]
    NotInTextMode(NodeId),

    #[error("Node {0} has text that has not compiled")]
    UncompiledText(NodeId),

    #[error("Node {0} is being edited as text")]
    InTextMode(NodeId),
}

impl CoreError {
    /// Field issues carried by the error, if it is a validation failure.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            CoreError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_displays_issues() {
        let err: CoreError =
            ValidationError::single("correct", IssueCode::TooBig, "must be less than 2").into();
        assert_eq!(
            err.to_string(),
            "Validation failed: correct: must be less than 2"
        );
        assert!(err.validation().unwrap().mentions("correct"));
    }

    #[test]
    fn test_exercise_error_converts() {
        let err: CoreError = ExerciseError::NothingToUndo.into();
        assert!(matches!(err, CoreError::Exercise(ExerciseError::NothingToUndo)));
        assert!(err.validation().is_none());
    }
}
