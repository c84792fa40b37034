//! The ordered set of exercise nodes edited in one Playground session.

use serde::{Deserialize, Serialize};

use crate::answer::AnswerList;
use crate::node::{ExerciseKind, ExerciseNode, NodeId, NodePatch};
use crate::{ExerciseError, ExerciseResult};

/// Ordered exercise nodes, addressed by [`NodeId`].
///
/// Position is presentation only; every mutating call takes an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCollection {
    nodes: Vec<ExerciseNode>,
}

impl ExerciseCollection {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Queries ====================

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseNode> {
        self.nodes.iter()
    }

    pub fn nodes(&self) -> &[ExerciseNode] {
        &self.nodes
    }

    /// Returns a node by id.
    pub fn get(&self, uuid: NodeId) -> ExerciseResult<&ExerciseNode> {
        self.nodes
            .iter()
            .find(|node| node.uuid() == uuid)
            .ok_or(ExerciseError::NodeNotFound(uuid))
    }

    /// Returns the current position of a node.
    pub fn position(&self, uuid: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.uuid() == uuid)
    }

    /// Indices of expanded nodes, ascending.
    pub fn toggled_indices(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_toggled())
            .map(|(i, _)| i)
            .collect()
    }

    // ==================== Mutations ====================

    /// Appends an empty node of the given kind.
    pub fn add_node(&mut self, kind: ExerciseKind) -> NodeId {
        let node = ExerciseNode::new(kind);
        let id = node.uuid();
        self.nodes.push(node);
        id
    }

    /// Removes a node by id.
    pub fn remove_node(&mut self, uuid: NodeId) -> ExerciseResult<ExerciseNode> {
        let index = self
            .position(uuid)
            .ok_or(ExerciseError::NodeNotFound(uuid))?;
        Ok(self.nodes.remove(index))
    }

    /// Merges a patch into a node.
    ///
    /// This is the only path that changes node content.
    pub fn update_node(&mut self, uuid: NodeId, patch: NodePatch) -> ExerciseResult<&ExerciseNode> {
        let index = self
            .position(uuid)
            .ok_or(ExerciseError::NodeNotFound(uuid))?;
        self.nodes[index].apply(patch)?;
        Ok(&self.nodes[index])
    }

    /// Runs an answer-list edit against a copy and commits it as a patch.
    ///
    /// The closure's error leaves the node untouched.
    pub fn edit_answers<F, T>(&mut self, uuid: NodeId, edit: F) -> ExerciseResult<T>
    where
        F: FnOnce(&mut AnswerList) -> ExerciseResult<T>,
    {
        let mut answers = self.get(uuid)?.answers().clone();
        let output = edit(&mut answers)?;

        let patch = NodePatch::new()
            .answers(answers.items().to_vec())
            .correct(answers.correct());
        self.update_node(uuid, patch)?;
        Ok(output)
    }

    /// Flips a node's expanded state and returns the new value.
    pub fn toggle(&mut self, uuid: NodeId) -> ExerciseResult<bool> {
        let toggled = !self.get(uuid)?.is_toggled();
        self.update_node(uuid, NodePatch::new().toggled(toggled))?;
        Ok(toggled)
    }

    /// Moves the node at `source` to `destination`.
    pub fn reorder_nodes(&mut self, source: usize, destination: usize) -> ExerciseResult<()> {
        let len = self.nodes.len();
        for index in [source, destination] {
            if index >= len {
                return Err(ExerciseError::NodeOutOfRange { index, len });
            }
        }

        let node = self.nodes.remove(source);
        self.nodes.insert(destination, node);
        Ok(())
    }
}
