//! Playground sessions: editing the exercises of one lesson.
//!
//! A session works on a private copy of the lesson's exercise collection.
//! `commit` writes it back into the draft; dropping the session discards it.
//!
//! Each node is edited either through structured controls or through its
//! text form. While a node is in text mode its content only changes by
//! compiling the text; structured edits to it are refused.

use coursekit_exercise::{
    ExerciseCollection, ExerciseError, ExerciseKind, ExerciseNode, ExerciseResult, History, NodeId,
    NodePatch,
};
use std::collections::HashMap;

use crate::collab::DragMove;
use crate::config::Config;
use crate::draft::CourseDraft;
use crate::outline::LessonId;
use crate::serializer::Serializer;
use crate::{CoreError, CoreResult};

/// How a node is currently being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Structured,
    Text {
        /// The text as last typed
        draft: String,
        /// Whether `draft` has compiled into the node
        compiled: bool,
    },
}

impl EditMode {
    pub fn is_text(&self) -> bool {
        matches!(self, EditMode::Text { .. })
    }
}

/// Every edit a Playground host can request.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaygroundAction {
    /// Adds a node; `None` uses the configured default kind
    AddNode(Option<ExerciseKind>),
    RemoveNode(NodeId),
    UpdateNode { uuid: NodeId, patch: NodePatch },
    Toggle(NodeId),
    ReorderNodes(DragMove),
    AppendAnswer { uuid: NodeId, value: String },
    RemoveAnswer { uuid: NodeId, index: usize },
    UpdateAnswer { uuid: NodeId, index: usize, value: String },
    ReorderAnswers { uuid: NodeId, drag: DragMove },
    SelectCorrect { uuid: NodeId, index: usize },
    EnterTextMode(NodeId),
    EditText { uuid: NodeId, text: String },
    Compile(NodeId),
    LeaveTextMode(NodeId),
    DiscardText(NodeId),
    Undo,
    Redo,
}

impl PlaygroundAction {
    /// Node the action targets, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            PlaygroundAction::RemoveNode(uuid)
            | PlaygroundAction::UpdateNode { uuid, .. }
            | PlaygroundAction::Toggle(uuid)
            | PlaygroundAction::AppendAnswer { uuid, .. }
            | PlaygroundAction::RemoveAnswer { uuid, .. }
            | PlaygroundAction::UpdateAnswer { uuid, .. }
            | PlaygroundAction::ReorderAnswers { uuid, .. }
            | PlaygroundAction::SelectCorrect { uuid, .. }
            | PlaygroundAction::EnterTextMode(uuid)
            | PlaygroundAction::EditText { uuid, .. }
            | PlaygroundAction::Compile(uuid)
            | PlaygroundAction::LeaveTextMode(uuid)
            | PlaygroundAction::DiscardText(uuid) => Some(*uuid),
            PlaygroundAction::AddNode(_)
            | PlaygroundAction::ReorderNodes(_)
            | PlaygroundAction::Undo
            | PlaygroundAction::Redo => None,
        }
    }
}

/// Editing session for one lesson's exercises.
#[derive(Debug, Clone)]
pub struct PlaygroundSession {
    lesson_id: LessonId,
    collection: ExerciseCollection,
    modes: HashMap<NodeId, EditMode>,
    history: History<ExerciseCollection>,
    serializer: Serializer,
    default_kind: ExerciseKind,
}

impl PlaygroundSession {
    /// Opens the lesson at the given position, creating its content if
    /// this is the first session for it.
    pub fn open(
        draft: &mut CourseDraft,
        module_index: usize,
        lesson_index: usize,
        config: &Config,
    ) -> CoreResult<Self> {
        let lesson = draft.lesson_mut(module_index, lesson_index)?;
        let collection = lesson
            .content
            .get_or_insert_with(ExerciseCollection::new)
            .clone();

        tracing::debug!("Opened playground for lesson {}", lesson.id);

        Ok(Self {
            lesson_id: lesson.id,
            collection,
            modes: HashMap::new(),
            history: History::new(config.editor.history_limit)
                .with_coalesce_threshold(config.editor.coalesce_threshold()),
            serializer: Serializer::new(config.serializer.indent),
            default_kind: config.editor.default_kind,
        })
    }

    // ==================== Queries ====================

    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    pub fn collection(&self) -> &ExerciseCollection {
        &self.collection
    }

    pub fn node(&self, uuid: NodeId) -> CoreResult<&ExerciseNode> {
        Ok(self.collection.get(uuid)?)
    }

    /// Edit mode of a node; nodes never switched are structured.
    pub fn mode(&self, uuid: NodeId) -> &EditMode {
        static STRUCTURED: EditMode = EditMode::Structured;
        self.modes.get(&uuid).unwrap_or(&STRUCTURED)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Refuses structured edits to a node that is open as text.
    fn ensure_structured(&self, uuid: NodeId) -> CoreResult<()> {
        if self.mode(uuid).is_text() {
            return Err(CoreError::InTextMode(uuid));
        }
        Ok(())
    }

    // ==================== Structured editing ====================

    /// Applies `edit` to a copy of the collection and swaps it in.
    ///
    /// A failing edit leaves the session untouched; an edit that changes
    /// nothing leaves no undo step.
    fn mutate<T, F>(&mut self, coalesce: Option<String>, edit: F) -> CoreResult<T>
    where
        F: FnOnce(&mut ExerciseCollection) -> ExerciseResult<T>,
    {
        let mut next = self.collection.clone();
        let output = edit(&mut next)?;

        if next != self.collection {
            let previous = std::mem::replace(&mut self.collection, next);
            match coalesce {
                Some(key) => self.history.record_coalescing(previous, key),
                None => self.history.record(previous),
            }
        }
        Ok(output)
    }

    pub fn add_node(&mut self, kind: ExerciseKind) -> CoreResult<NodeId> {
        self.mutate(None, |c| Ok(c.add_node(kind)))
    }

    /// Adds a node of the configured default kind.
    pub fn add_default_node(&mut self) -> CoreResult<NodeId> {
        self.add_node(self.default_kind)
    }

    pub fn remove_node(&mut self, uuid: NodeId) -> CoreResult<()> {
        self.mutate(None, |c| c.remove_node(uuid).map(|_| ()))?;
        self.modes.remove(&uuid);
        Ok(())
    }

    /// Structured edit of a node's content.
    pub fn update_node(&mut self, uuid: NodeId, patch: NodePatch) -> CoreResult<()> {
        self.ensure_structured(uuid)?;
        self.patch_node(uuid, patch)
    }

    /// The single path by which node content changes.
    fn patch_node(&mut self, uuid: NodeId, patch: NodePatch) -> CoreResult<()> {
        self.mutate(None, |c| c.update_node(uuid, patch).map(|_| ()))
    }

    pub fn toggle(&mut self, uuid: NodeId) -> CoreResult<bool> {
        self.mutate(None, |c| c.toggle(uuid))
    }

    pub fn reorder_nodes(&mut self, drag: DragMove) -> CoreResult<()> {
        self.mutate(None, |c| {
            c.reorder_nodes(drag.source_index, drag.destination_index)
        })
    }

    pub fn append_answer(&mut self, uuid: NodeId, value: &str) -> CoreResult<String> {
        self.ensure_structured(uuid)?;
        self.mutate(None, |c| c.edit_answers(uuid, |answers| Ok(answers.append(value))))
    }

    pub fn remove_answer(&mut self, uuid: NodeId, index: usize) -> CoreResult<()> {
        self.ensure_structured(uuid)?;
        self.mutate(None, |c| {
            c.edit_answers(uuid, |answers| answers.remove(index).map(|_| ()))
        })
    }

    /// Keystrokes into the same answer coalesce into one undo step.
    pub fn update_answer(&mut self, uuid: NodeId, index: usize, value: &str) -> CoreResult<()> {
        self.ensure_structured(uuid)?;
        let key = format!("{uuid}/answers/{index}");
        self.mutate(Some(key), |c| {
            c.edit_answers(uuid, |answers| answers.update_value(index, value))
        })
    }

    pub fn reorder_answers(&mut self, uuid: NodeId, drag: DragMove) -> CoreResult<()> {
        self.ensure_structured(uuid)?;
        self.mutate(None, |c| {
            c.edit_answers(uuid, |answers| {
                answers.reorder(drag.source_index, drag.destination_index)
            })
        })
    }

    pub fn select_correct(&mut self, uuid: NodeId, index: usize) -> CoreResult<()> {
        self.ensure_structured(uuid)?;
        self.mutate(None, |c| {
            c.edit_answers(uuid, |answers| answers.select_correct(index))
        })
    }

    // ==================== Text mode ====================

    /// Switches a node to text mode, seeding the text from the node.
    ///
    /// The seeded text counts as uncompiled until `compile` accepts it.
    pub fn enter_text_mode(&mut self, uuid: NodeId) -> CoreResult<&str> {
        let text = self.serializer.to_text(self.collection.get(uuid)?)?;
        let mode = self.modes.entry(uuid).or_default();
        if !mode.is_text() {
            *mode = EditMode::Text {
                draft: text,
                compiled: false,
            };
        }
        match mode {
            EditMode::Text { draft, .. } => Ok(draft.as_str()),
            EditMode::Structured => Err(CoreError::NotInTextMode(uuid)),
        }
    }

    /// Replaces the text being edited. The node itself is not touched.
    pub fn edit_text(&mut self, uuid: NodeId, text: impl Into<String>) -> CoreResult<()> {
        match self.modes.get_mut(&uuid) {
            Some(EditMode::Text { draft, compiled }) => {
                *draft = text.into();
                *compiled = false;
                Ok(())
            }
            _ => Err(CoreError::NotInTextMode(uuid)),
        }
    }

    /// Validates the current text and, if it passes, writes it into the
    /// node through `update_node` and marks the node completed.
    ///
    /// On failure the node is unchanged and every issue is returned.
    pub fn compile(&mut self, uuid: NodeId) -> CoreResult<()> {
        let text = match self.modes.get(&uuid) {
            Some(EditMode::Text { draft, .. }) => draft.clone(),
            _ => return Err(CoreError::NotInTextMode(uuid)),
        };

        let patch = self.serializer.from_text(&text)?;
        self.patch_node(uuid, patch.completed(true))?;

        if let Some(EditMode::Text { compiled, .. }) = self.modes.get_mut(&uuid) {
            *compiled = true;
        }
        Ok(())
    }

    /// Returns to structured mode. Only allowed once the text compiled.
    pub fn leave_text_mode(&mut self, uuid: NodeId) -> CoreResult<()> {
        match self.modes.get(&uuid) {
            Some(EditMode::Text { compiled: true, .. }) => {
                self.modes.remove(&uuid);
                Ok(())
            }
            Some(EditMode::Text { compiled: false, .. }) => Err(CoreError::UncompiledText(uuid)),
            _ => Err(CoreError::NotInTextMode(uuid)),
        }
    }

    /// Abandons the text and returns to structured mode.
    pub fn discard_text(&mut self, uuid: NodeId) -> CoreResult<()> {
        match self.modes.remove(&uuid) {
            Some(EditMode::Text { .. }) => Ok(()),
            _ => Err(CoreError::NotInTextMode(uuid)),
        }
    }

    // ==================== History ====================

    pub fn undo(&mut self) -> CoreResult<()> {
        let current = self.collection.clone();
        let previous = self
            .history
            .undo(current)
            .ok_or(ExerciseError::NothingToUndo)?;
        self.restore(previous);
        Ok(())
    }

    pub fn redo(&mut self) -> CoreResult<()> {
        let current = self.collection.clone();
        let next = self
            .history
            .redo(current)
            .ok_or(ExerciseError::NothingToRedo)?;
        self.restore(next);
        Ok(())
    }

    fn restore(&mut self, collection: ExerciseCollection) {
        self.collection = collection;
        let collection = &self.collection;
        self.modes
            .retain(|uuid, _| collection.position(*uuid).is_some());
    }

    // ==================== Dispatch ====================

    /// Applies one action.
    pub fn apply(&mut self, action: PlaygroundAction) -> CoreResult<()> {
        match action {
            PlaygroundAction::AddNode(Some(kind)) => self.add_node(kind).map(|_| ()),
            PlaygroundAction::AddNode(None) => self.add_default_node().map(|_| ()),
            PlaygroundAction::RemoveNode(uuid) => self.remove_node(uuid),
            PlaygroundAction::UpdateNode { uuid, patch } => self.update_node(uuid, patch),
            PlaygroundAction::Toggle(uuid) => self.toggle(uuid).map(|_| ()),
            PlaygroundAction::ReorderNodes(drag) => self.reorder_nodes(drag),
            PlaygroundAction::AppendAnswer { uuid, value } => {
                self.append_answer(uuid, &value).map(|_| ())
            }
            PlaygroundAction::RemoveAnswer { uuid, index } => self.remove_answer(uuid, index),
            PlaygroundAction::UpdateAnswer { uuid, index, value } => {
                self.update_answer(uuid, index, &value)
            }
            PlaygroundAction::ReorderAnswers { uuid, drag } => self.reorder_answers(uuid, drag),
            PlaygroundAction::SelectCorrect { uuid, index } => self.select_correct(uuid, index),
            PlaygroundAction::EnterTextMode(uuid) => self.enter_text_mode(uuid).map(|_| ()),
            PlaygroundAction::EditText { uuid, text } => self.edit_text(uuid, text),
            PlaygroundAction::Compile(uuid) => self.compile(uuid),
            PlaygroundAction::LeaveTextMode(uuid) => self.leave_text_mode(uuid),
            PlaygroundAction::DiscardText(uuid) => self.discard_text(uuid),
            PlaygroundAction::Undo => self.undo(),
            PlaygroundAction::Redo => self.redo(),
        }
    }

    /// Writes the session's collection back into its lesson.
    pub fn commit(&self, draft: &mut CourseDraft) -> CoreResult<()> {
        let lesson = draft
            .find_lesson_mut(self.lesson_id)
            .ok_or(CoreError::LessonNotFound(self.lesson_id))?;
        lesson.content = Some(self.collection.clone());
        Ok(())
    }
}
