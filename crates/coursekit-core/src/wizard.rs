//! Course creation wizard steps.
//!
//! ## Learning: State Machines as Enums
//!
//! The wizard is a linear state machine. Encoding the states as an enum
//! means `next()` and `previous()` are total functions that the compiler
//! checks for every variant; there is no integer step that could drift out
//! of range.

use serde::{Deserialize, Serialize};

use crate::draft::CourseDraft;
use crate::validation::{IssueCode, Issues, ValidationError};

/// Wizard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    #[default]
    Category,
    Instructor,
    CourseInfo,
}

impl Step {
    /// All steps in wizard order.
    pub const ALL: [Step; 3] = [Step::Category, Step::Instructor, Step::CourseInfo];

    /// Zero-based position, as shown in a progress indicator.
    pub fn index(&self) -> usize {
        match self {
            Step::Category => 0,
            Step::Instructor => 1,
            Step::CourseInfo => 2,
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Category => Some(Step::Instructor),
            Step::Instructor => Some(Step::CourseInfo),
            Step::CourseInfo => None,
        }
    }

    pub fn previous(&self) -> Option<Step> {
        match self {
            Step::Category => None,
            Step::Instructor => Some(Step::Category),
            Step::CourseInfo => Some(Step::Instructor),
        }
    }

    /// Checks whether `draft` satisfies this step's completion predicate.
    pub fn check(&self, draft: &CourseDraft) -> Result<(), ValidationError> {
        let mut issues = Issues::new();

        match self {
            Step::Category => {
                if draft.category().is_none() {
                    issues.push("category", IssueCode::Required, "select a category");
                }
            }
            Step::Instructor => {
                if draft.instructor().is_none() && !draft.is_interactive() {
                    issues.push(
                        "instructor",
                        IssueCode::Required,
                        "select an instructor or mark the course as interactive",
                    );
                }
            }
            Step::CourseInfo => {
                issues.require_text("title", draft.title());
                issues.require_text("description", draft.description());
                if draft.tags().is_empty() {
                    issues.push("tags", IssueCode::Empty, "add at least one tag");
                }
            }
        }

        issues.finish()
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Category => "category",
            Step::Instructor => "instructor",
            Step::CourseInfo => "course info",
        };
        f.write_str(name)
    }
}

/// Result of a successful `next_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to the given step
    Advanced(Step),
    /// Already on the last step and everything is filled in
    Ready,
}
