//! Draft actions and the reducer that applies them.
//!
//! ## Learning: The Command Pattern
//!
//! Every transition a host can request is a value of [`Action`]:
//! - Actions can be logged, queued, or replayed from a script
//! - `reduce` is a pure function from `(state, action)` to a new state
//! - A rejected action returns `Err` and the old state is still intact

use serde::{Deserialize, Serialize};

use crate::collab::DragMove;
use crate::draft::{CategoryRef, CourseDraft, InstructorRef, Tag};
use crate::outline::ModuleId;
use crate::CoreResult;

/// Transitions of a course draft.
///
/// ## Learning: Exhaustive Enums
///
/// With `#[non_exhaustive]`, we signal that new variants may be added.
/// Matches outside this crate need a `_ =>` arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Action {
    // Metadata
    SelectCategory { category: CategoryRef },
    SelectInstructor { instructor: Option<InstructorRef> },
    SetInteractive { interactive: bool },
    SetTitle { title: String },
    SetDescription { description: String },
    AddTag { tag: Tag },
    RemoveTag { name: String },

    // Wizard
    NextStep,
    BackStep,

    // Outline
    AddModule { title: String },
    RemoveModule { id: ModuleId },
    RenameModule { id: ModuleId, title: String },
    ReorderModules { drag: DragMove },
    SelectModule { index: Option<usize> },
    AddLesson { module_index: usize, title: String },
    RemoveLesson { module_index: usize, lesson_index: usize },
    ReorderLessons { module_index: usize, drag: DragMove },
}

impl Action {
    /// Returns the action's display name.
    pub fn display_name(&self) -> &str {
        match self {
            Action::SelectCategory { .. } => "Select Category",
            Action::SelectInstructor { .. } => "Select Instructor",
            Action::SetInteractive { .. } => "Set Interactive",
            Action::SetTitle { .. } => "Set Title",
            Action::SetDescription { .. } => "Set Description",
            Action::AddTag { .. } => "Add Tag",
            Action::RemoveTag { .. } => "Remove Tag",
            Action::NextStep => "Next Step",
            Action::BackStep => "Back",
            Action::AddModule { .. } => "Add Module",
            Action::RemoveModule { .. } => "Remove Module",
            Action::RenameModule { .. } => "Rename Module",
            Action::ReorderModules { .. } => "Reorder Modules",
            Action::SelectModule { .. } => "Select Module",
            Action::AddLesson { .. } => "Add Lesson",
            Action::RemoveLesson { .. } => "Remove Lesson",
            Action::ReorderLessons { .. } => "Reorder Lessons",
        }
    }

    /// Whether the action only changes what is shown.
    pub fn is_view_only(&self) -> bool {
        matches!(self, Action::SelectModule { .. })
    }
}

/// Applies `action` to a copy of `state`.
///
/// On error `state` is untouched and nothing is returned to commit.
pub fn reduce(state: &CourseDraft, action: &Action) -> CoreResult<CourseDraft> {
    let mut next = state.clone();

    match action {
        Action::SelectCategory { category } => next.select_category(category.clone()),
        Action::SelectInstructor { instructor } => next.select_instructor(instructor.clone()),
        Action::SetInteractive { interactive } => next.set_interactive(*interactive),
        Action::SetTitle { title } => next.set_title(title.as_str()),
        Action::SetDescription { description } => next.set_description(description.as_str()),
        Action::AddTag { tag } => next.add_tag(tag.clone())?,
        Action::RemoveTag { name } => {
            next.remove_tag(name)?;
        }
        Action::NextStep => {
            next.next_step()?;
        }
        Action::BackStep => {
            next.back_step()?;
        }
        Action::AddModule { title } => {
            next.add_module(title)?;
        }
        Action::RemoveModule { id } => {
            next.remove_module(*id)?;
        }
        Action::RenameModule { id, title } => next.rename_module(*id, title)?,
        Action::ReorderModules { drag } => next.reorder_modules(*drag)?,
        Action::SelectModule { index } => next.select_module(*index)?,
        Action::AddLesson {
            module_index,
            title,
        } => {
            next.add_lesson(*module_index, title)?;
        }
        Action::RemoveLesson {
            module_index,
            lesson_index,
        } => {
            next.remove_lesson(*module_index, *lesson_index)?;
        }
        Action::ReorderLessons { module_index, drag } => {
            next.reorder_lessons(*module_index, *drag)?
        }
    }

    tracing::debug!("Applied {}", action.display_name());
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::Step;
    use crate::CoreError;

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let draft = CourseDraft::new();
        let next = reduce(
            &draft,
            &Action::AddModule {
                title: "Grammar".to_string(),
            },
        )
        .unwrap();

        assert!(draft.modules().is_empty());
        assert_eq!(next.modules().len(), 1);
    }

    #[test]
    fn test_rejected_action_returns_error() {
        let draft = CourseDraft::new();
        let err = reduce(&draft, &Action::NextStep).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = reduce(
            &draft,
            &Action::AddLesson {
                module_index: 0,
                title: "Verbs".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ModuleIndexOutOfRange(0)));
    }

    #[test]
    fn test_wizard_through_actions() {
        let actions = vec![
            Action::SelectCategory {
                category: CategoryRef::new("1", "Languages"),
            },
            Action::NextStep,
            Action::SelectInstructor {
                instructor: Some(InstructorRef::new("7", "Ada")),
            },
            Action::NextStep,
        ];

        let draft = actions
            .iter()
            .try_fold(CourseDraft::new(), |draft, action| reduce(&draft, action))
            .unwrap();
        assert_eq!(draft.step(), Step::CourseInfo);

        let back = reduce(&draft, &Action::BackStep).unwrap();
        assert_eq!(back.step(), Step::Instructor);
    }

    #[test]
    fn test_action_json_shape() {
        let action: Action =
            serde_json::from_str(r#"{"type":"add_module","title":"Grammar"}"#).unwrap();
        assert_eq!(
            action,
            Action::AddModule {
                title: "Grammar".to_string()
            }
        );
        assert_eq!(action.display_name(), "Add Module");

        let drag: Action = serde_json::from_str(
            r#"{"type":"reorder_modules","drag":{"sourceIndex":0,"destinationIndex":1}}"#,
        )
        .unwrap();
        assert_eq!(
            drag,
            Action::ReorderModules {
                drag: DragMove::new(0, 1)
            }
        );
    }

    #[test]
    fn test_remove_missing_tag_is_rejected() {
        let draft = reduce(
            &CourseDraft::new(),
            &Action::AddTag {
                tag: Tag::new("es", "#F97316"),
            },
        )
        .unwrap();

        let err = reduce(
            &draft,
            &Action::RemoveTag {
                name: "fr".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::TagNotFound(_)));

        let cleared = reduce(
            &draft,
            &Action::RemoveTag {
                name: " es".to_string(),
            },
        )
        .unwrap();
        assert!(cleared.tags().is_empty());
    }

    #[test]
    fn test_view_only() {
        assert!(Action::SelectModule { index: None }.is_view_only());
        assert!(!Action::NextStep.is_view_only());
    }
}
