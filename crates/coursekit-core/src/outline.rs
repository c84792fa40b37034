//! Modules and lessons of a course draft.
//!
//! ## Learning: Newtype IDs
//!
//! `ModuleId` and `LessonId` both wrap a `Uuid`, but they are distinct
//! types: passing a lesson id where a module id is expected is a compile
//! error rather than a silent lookup miss.

use coursekit_exercise::ExerciseCollection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collab::DragMove;
use crate::draft::CourseDraft;
use crate::validation::{IssueCode, ValidationError};
use crate::{CoreError, CoreResult};

/// Unique identifier for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId(Uuid);

impl ModuleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonId(Uuid);

impl LessonId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LessonId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LessonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lesson; its exercise content is created when a Playground first opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub content: Option<ExerciseCollection>,
}

impl Lesson {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: LessonId::new(),
            title: title.into(),
            content: None,
        }
    }
}

/// A named group of lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

impl Module {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: ModuleId::new(),
            title: title.into(),
            lessons: Vec::new(),
        }
    }
}

fn checked_title(title: &str) -> CoreResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::single("title", IssueCode::Blank, "must not be empty").into());
    }
    Ok(title.to_string())
}

fn move_item<T>(items: &mut Vec<T>, drag: DragMove) -> Option<()> {
    if drag.source_index >= items.len() || drag.destination_index >= items.len() {
        return None;
    }
    let item = items.remove(drag.source_index);
    items.insert(drag.destination_index, item);
    Some(())
}

impl CourseDraft {
    // ==================== Queries ====================

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, index: usize) -> CoreResult<&Module> {
        self.modules
            .get(index)
            .ok_or(CoreError::ModuleIndexOutOfRange(index))
    }

    pub fn module_position(&self, id: ModuleId) -> Option<usize> {
        self.modules.iter().position(|module| module.id == id)
    }

    pub fn lesson(&self, module_index: usize, lesson_index: usize) -> CoreResult<&Lesson> {
        self.module(module_index)?
            .lessons
            .get(lesson_index)
            .ok_or(CoreError::LessonIndexOutOfRange {
                module: module_index,
                lesson: lesson_index,
            })
    }

    pub(crate) fn lesson_mut(
        &mut self,
        module_index: usize,
        lesson_index: usize,
    ) -> CoreResult<&mut Lesson> {
        self.modules
            .get_mut(module_index)
            .ok_or(CoreError::ModuleIndexOutOfRange(module_index))?
            .lessons
            .get_mut(lesson_index)
            .ok_or(CoreError::LessonIndexOutOfRange {
                module: module_index,
                lesson: lesson_index,
            })
    }

    /// Finds a lesson anywhere in the outline.
    pub fn find_lesson_mut(&mut self, id: LessonId) -> Option<&mut Lesson> {
        self.modules
            .iter_mut()
            .flat_map(|module| module.lessons.iter_mut())
            .find(|lesson| lesson.id == id)
    }

    pub fn find_lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|module| module.lessons.iter())
            .find(|lesson| lesson.id == id)
    }

    /// Index of the module shown in detail view.
    pub fn viewed_module_index(&self) -> Option<usize> {
        self.viewed_module
    }

    pub fn viewed_module(&self) -> Option<&Module> {
        self.viewed_module.and_then(|i| self.modules.get(i))
    }

    // ==================== Modules ====================

    /// Appends an empty module.
    pub fn add_module(&mut self, title: &str) -> CoreResult<ModuleId> {
        let module = Module::new(checked_title(title)?);
        let id = module.id;
        self.modules.push(module);
        Ok(id)
    }

    /// Removes a module by id.
    ///
    /// The detail view keeps showing the same module if it survives, and
    /// falls back to the list if it was the one removed.
    pub fn remove_module(&mut self, id: ModuleId) -> CoreResult<Module> {
        let index = self
            .module_position(id)
            .ok_or(CoreError::ModuleNotFound(id))?;
        let removed = self.modules.remove(index);

        self.viewed_module = match self.viewed_module {
            Some(v) if v == index => None,
            Some(v) if v > index => Some(v - 1),
            other => other,
        };

        Ok(removed)
    }

    pub fn rename_module(&mut self, id: ModuleId, title: &str) -> CoreResult<()> {
        let title = checked_title(title)?;
        let index = self
            .module_position(id)
            .ok_or(CoreError::ModuleNotFound(id))?;
        self.modules[index].title = title;
        Ok(())
    }

    /// Drag-and-drop reorder of the module list.
    pub fn reorder_modules(&mut self, drag: DragMove) -> CoreResult<()> {
        let viewed = self.viewed_module().map(|module| module.id);

        move_item(&mut self.modules, drag).ok_or(CoreError::ModuleIndexOutOfRange(
            drag.source_index.max(drag.destination_index),
        ))?;

        self.viewed_module = viewed.and_then(|id| self.module_position(id));
        Ok(())
    }

    /// Shows a module's detail view, or the list for `None`.
    pub fn select_module(&mut self, index: Option<usize>) -> CoreResult<()> {
        if let Some(i) = index {
            self.module(i)?;
        }
        self.viewed_module = index;
        Ok(())
    }

    // ==================== Lessons ====================

    /// Appends a lesson to the module at `module_index`.
    pub fn add_lesson(&mut self, module_index: usize, title: &str) -> CoreResult<LessonId> {
        let title = checked_title(title)?;
        let module = self
            .modules
            .get_mut(module_index)
            .ok_or(CoreError::ModuleIndexOutOfRange(module_index))?;

        let lesson = Lesson::new(title);
        let id = lesson.id;
        module.lessons.push(lesson);
        Ok(id)
    }

    pub fn remove_lesson(&mut self, module_index: usize, lesson_index: usize) -> CoreResult<Lesson> {
        self.lesson(module_index, lesson_index)?;
        Ok(self.modules[module_index].lessons.remove(lesson_index))
    }

    pub fn reorder_lessons(&mut self, module_index: usize, drag: DragMove) -> CoreResult<()> {
        let module = self
            .modules
            .get_mut(module_index)
            .ok_or(CoreError::ModuleIndexOutOfRange(module_index))?;

        move_item(&mut module.lessons, drag).ok_or(CoreError::LessonIndexOutOfRange {
            module: module_index,
            lesson: drag.source_index.max(drag.destination_index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_module_and_lesson() {
        let mut draft = CourseDraft::new();
        draft.add_module("Grammar").unwrap();
        assert_eq!(draft.modules().len(), 1);
        assert_eq!(draft.modules()[0].title, "Grammar");
        assert!(draft.modules()[0].lessons.is_empty());

        draft.add_lesson(0, "Verbs").unwrap();
        let lesson = draft.lesson(0, 0).unwrap();
        assert_eq!(lesson.title, "Verbs");
        assert!(lesson.content.is_none());
    }

    #[test]
    fn test_add_lesson_to_missing_module() {
        let mut draft = CourseDraft::new();
        let err = draft.add_lesson(3, "Verbs").unwrap_err();
        assert!(matches!(err, CoreError::ModuleIndexOutOfRange(3)));
        assert!(draft.modules().is_empty());
    }

    #[test]
    fn test_blank_module_title_rejected() {
        let mut draft = CourseDraft::new();
        assert!(matches!(
            draft.add_module("   "),
            Err(CoreError::Validation(ref v)) if v.mentions("title")
        ));
    }

    #[test]
    fn test_remove_viewed_module_returns_to_list() {
        let mut draft = CourseDraft::new();
        let grammar = draft.add_module("Grammar").unwrap();
        draft.add_module("Vocabulary").unwrap();

        draft.select_module(Some(0)).unwrap();
        draft.remove_module(grammar).unwrap();
        assert_eq!(draft.viewed_module_index(), None);

        assert!(matches!(
            draft.remove_module(grammar),
            Err(CoreError::ModuleNotFound(_))
        ));
    }

    #[test]
    fn test_remove_earlier_module_keeps_view() {
        let mut draft = CourseDraft::new();
        let grammar = draft.add_module("Grammar").unwrap();
        draft.add_module("Vocabulary").unwrap();

        draft.select_module(Some(1)).unwrap();
        draft.remove_module(grammar).unwrap();
        assert_eq!(draft.viewed_module().unwrap().title, "Vocabulary");
    }

    #[test]
    fn test_select_module_bounds() {
        let mut draft = CourseDraft::new();
        assert!(draft.select_module(Some(0)).is_err());
        draft.add_module("Grammar").unwrap();
        draft.select_module(Some(0)).unwrap();
        draft.select_module(None).unwrap();
        assert!(draft.viewed_module().is_none());
    }

    #[test]
    fn test_reorder_modules_follows_view() {
        let mut draft = CourseDraft::new();
        for title in ["A", "B", "C"] {
            draft.add_module(title).unwrap();
        }
        draft.select_module(Some(0)).unwrap();

        draft
            .reorder_modules(DragMove::new(0, 2))
            .unwrap();
        let titles: Vec<&str> = draft.modules().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
        assert_eq!(draft.viewed_module_index(), Some(2));

        assert!(draft.reorder_modules(DragMove::new(0, 3)).is_err());
    }

    #[test]
    fn test_lesson_reorder_and_remove() {
        let mut draft = CourseDraft::new();
        draft.add_module("Grammar").unwrap();
        let verbs = draft.add_lesson(0, "Verbs").unwrap();
        draft.add_lesson(0, "Nouns").unwrap();

        draft.reorder_lessons(0, DragMove::new(1, 0)).unwrap();
        assert_eq!(draft.lesson(0, 1).unwrap().id, verbs);

        let removed = draft.remove_lesson(0, 1).unwrap();
        assert_eq!(removed.id, verbs);
        assert!(draft.remove_lesson(0, 1).is_err());
        assert!(draft.find_lesson(verbs).is_none());
    }

    #[test]
    fn test_rename_module() {
        let mut draft = CourseDraft::new();
        let id = draft.add_module("Gramar").unwrap();
        draft.rename_module(id, "Grammar").unwrap();
        assert_eq!(draft.module(0).unwrap().title, "Grammar");
        assert!(draft.rename_module(id, "").is_err());
    }
}
