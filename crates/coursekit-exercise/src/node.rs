//! Exercise nodes and partial updates.
//!
//! ## Learning: Option<Option<T>>
//!
//! A patch needs to tell apart "leave this field alone" from "set this
//! field to nothing". For the correct-answer index that is exactly
//! `Option<Option<usize>>`: the outer `None` means untouched, `Some(None)`
//! means cleared.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answer::{AnswerItem, AnswerList};
use crate::ExerciseResult;

/// Unique identifier for an exercise node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Creates a new unique node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exercise variants a Playground can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExerciseKind {
    /// One question, several answers, exactly one of them correct
    #[default]
    SimpleSelection,
}

impl ExerciseKind {
    /// Returns the wire tag of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::SimpleSelection => "SimpleSelection",
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseNode {
    uuid: NodeId,
    kind: ExerciseKind,
    question: String,
    answers: AnswerList,
    /// Expanded in the accordion
    toggled: bool,
    /// Passed validation at least once
    completed: bool,
}

impl ExerciseNode {
    /// Creates an empty, expanded, not-yet-completed node.
    pub fn new(kind: ExerciseKind) -> Self {
        Self {
            uuid: NodeId::new(),
            kind,
            question: String::new(),
            answers: AnswerList::new(),
            toggled: true,
            completed: false,
        }
    }

    // ==================== Getters ====================

    pub fn uuid(&self) -> NodeId {
        self.uuid
    }

    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answers(&self) -> &AnswerList {
        &self.answers
    }

    /// Returns the correct-answer index, if designated.
    pub fn correct(&self) -> Option<usize> {
        self.answers.correct()
    }

    pub fn is_toggled(&self) -> bool {
        self.toggled
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Merges a patch into this node.
    ///
    /// The new answer list is built and checked before any field is
    /// assigned, so on error the node is unchanged.
    pub(crate) fn apply(&mut self, patch: NodePatch) -> ExerciseResult<()> {
        let answers = match (patch.answers, patch.correct) {
            (Some(items), Some(correct)) => Some(AnswerList::from_items(items, correct)?),
            (Some(items), None) => {
                let mut list = self.answers.clone();
                list.replace_items(items)?;
                Some(list)
            }
            (None, Some(correct)) => {
                let mut list = self.answers.clone();
                match correct {
                    Some(index) => list.select_correct(index)?,
                    None => list.clear_correct(),
                }
                Some(list)
            }
            (None, None) => None,
        };

        if let Some(question) = patch.question {
            self.question = question;
        }
        if let Some(answers) = answers {
            self.answers = answers;
        }
        if let Some(toggled) = patch.toggled {
            self.toggled = toggled;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        Ok(())
    }
}

/// A partial update for an [`ExerciseNode`].
///
/// Both the structured editor and compiled text produce patches; they are
/// applied through `ExerciseCollection::update_node`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub question: Option<String>,
    pub answers: Option<Vec<AnswerItem>>,
    pub correct: Option<Option<usize>>,
    pub toggled: Option<bool>,
    pub completed: Option<bool>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn answers(mut self, answers: Vec<AnswerItem>) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn correct(mut self, correct: Option<usize>) -> Self {
        self.correct = Some(correct);
        self
    }

    pub fn toggled(mut self, toggled: bool) -> Self {
        self.toggled = Some(toggled);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&ExerciseNode> for NodePatch {
    /// Captures the editable content of a node (not its view flags).
    fn from(node: &ExerciseNode) -> Self {
        Self::new()
            .question(node.question.clone())
            .answers(node.answers.items().to_vec())
            .correct(node.answers.correct())
    }
}
