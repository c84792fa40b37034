//! Answer items and the ordered answer list of a selection exercise.
//!
//! ## Learning: Keeping an Index Honest
//!
//! `correct` is an index into `items`. Any operation that moves or removes
//! items can silently make that index point at a different answer. Instead
//! of patching the index with arithmetic on every code path, we remember
//! *which* answer was correct (its id) and look it up again afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{ExerciseError, ExerciseResult};

/// A single answer option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerItem {
    /// Stable identifier, unique within its list
    pub id: String,
    /// Display text (may be empty while being edited)
    pub value: String,
}

impl AnswerItem {
    /// Creates an answer with a freshly generated id.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            value: value.into(),
        }
    }

    /// Creates an answer with a known id.
    pub fn with_id(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Ordered answers plus the index of the correct one.
///
/// Invariant: `correct`, when set, is `< items.len()`.
///
/// ## Learning: Validating Deserialization
///
/// `#[serde(try_from = ...)]` deserializes into a plain mirror struct first
/// and then runs `from_items`, so a loaded list obeys the same invariants
/// as one built in code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAnswerList")]
pub struct AnswerList {
    items: Vec<AnswerItem>,
    correct: Option<usize>,
}

/// Unchecked wire form of an [`AnswerList`].
#[derive(Deserialize)]
struct RawAnswerList {
    #[serde(default)]
    items: Vec<AnswerItem>,
    #[serde(default)]
    correct: Option<usize>,
}

impl TryFrom<RawAnswerList> for AnswerList {
    type Error = ExerciseError;

    fn try_from(raw: RawAnswerList) -> ExerciseResult<Self> {
        Self::from_items(raw.items, raw.correct)
    }
}

impl AnswerList {
    /// Creates an empty list with no correct answer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from existing items.
    ///
    /// Fails if ids repeat or `correct` does not index into `items`.
    pub fn from_items(items: Vec<AnswerItem>, correct: Option<usize>) -> ExerciseResult<Self> {
        check_unique_ids(&items)?;
        if let Some(index) = correct {
            if index >= items.len() {
                return Err(ExerciseError::CorrectOutOfRange {
                    index,
                    len: items.len(),
                });
            }
        }
        Ok(Self { items, correct })
    }

    // ==================== Queries ====================

    /// Returns the items in display order.
    pub fn items(&self) -> &[AnswerItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AnswerItem> {
        self.items.get(index)
    }

    /// Returns the index of the correct answer, if one is designated.
    pub fn correct(&self) -> Option<usize> {
        self.correct
    }

    /// Returns the correct answer itself.
    pub fn correct_item(&self) -> Option<&AnswerItem> {
        self.correct.and_then(|i| self.items.get(i))
    }

    /// Finds the current position of an answer by id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    // ==================== Mutations ====================

    /// Appends a new answer and returns its generated id.
    pub fn append(&mut self, value: impl Into<String>) -> String {
        let item = AnswerItem::new(value);
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// Removes the answer at `index`.
    ///
    /// Removing the correct answer clears the designation; removing an
    /// earlier answer shifts `correct` down so it keeps naming the same item.
    pub fn remove(&mut self, index: usize) -> ExerciseResult<AnswerItem> {
        self.check_index(index)?;

        let removed = self.items.remove(index);
        self.correct = match self.correct {
            Some(k) if k == index => None,
            Some(k) if k > index => Some(k - 1),
            other => other,
        };

        Ok(removed)
    }

    /// Replaces the text of the answer at `index`.
    pub fn update_value(&mut self, index: usize, value: impl Into<String>) -> ExerciseResult<()> {
        self.check_index(index)?;
        self.items[index].value = value.into();
        Ok(())
    }

    /// Moves the answer at `source` so that it ends up at `destination`.
    ///
    /// Items in between shift by one. `correct` keeps pointing at the same
    /// answer regardless of drag direction.
    pub fn reorder(&mut self, source: usize, destination: usize) -> ExerciseResult<()> {
        self.check_index(source)?;
        self.check_index(destination)?;

        if source == destination {
            return Ok(());
        }

        let correct_id = self.correct_item().map(|item| item.id.clone());

        let item = self.items.remove(source);
        self.items.insert(destination, item);

        self.correct = correct_id.and_then(|id| self.position_of(&id));
        Ok(())
    }

    /// Marks the answer at `index` as the correct one.
    pub fn select_correct(&mut self, index: usize) -> ExerciseResult<()> {
        if index >= self.items.len() {
            return Err(ExerciseError::CorrectOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.correct = Some(index);
        Ok(())
    }

    /// Clears the correct-answer designation.
    pub fn clear_correct(&mut self) {
        self.correct = None;
    }

    /// Replaces all items, carrying the correct designation over by id.
    ///
    /// If the previously correct answer is not among the new items the
    /// designation is cleared.
    pub fn replace_items(&mut self, items: Vec<AnswerItem>) -> ExerciseResult<()> {
        check_unique_ids(&items)?;

        let correct_id = self.correct_item().map(|item| item.id.clone());
        self.items = items;
        self.correct = correct_id.and_then(|id| self.position_of(&id));
        Ok(())
    }

    fn check_index(&self, index: usize) -> ExerciseResult<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(ExerciseError::AnswerOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

fn check_unique_ids(items: &[AnswerItem]) -> ExerciseResult<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(ExerciseError::DuplicateAnswerId(item.id.clone()));
        }
    }
    Ok(())
}
