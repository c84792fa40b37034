//! The course draft aggregate and its metadata.
//!
//! Module and lesson operations on `CourseDraft` live in `outline.rs`.

use serde::{Deserialize, Serialize};

use crate::outline::Module;
use crate::validation::{FieldIssue, IssueCode, ValidationError};
use crate::wizard::{Step, StepOutcome};
use crate::{CoreError, CoreResult};

/// A category picked from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

impl CategoryRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An instructor picked from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRef {
    pub id: String,
    pub name: String,
}

impl InstructorRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A coloured course tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub color: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Tags in insertion order, unique by trimmed name.
///
/// Deserialization goes through [`TagSet::add`], so a loaded set obeys the
/// same rules as one built tag by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag under its trimmed name. Blank and duplicate names are
    /// rejected.
    pub fn add(&mut self, tag: Tag) -> Result<(), ValidationError> {
        let name = tag.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::single(
                "tags",
                IssueCode::Blank,
                "tag name must not be empty",
            ));
        }
        if self.contains(&name) {
            return Err(ValidationError::single(
                "tags",
                IssueCode::Duplicate,
                "tag already exists",
            ));
        }
        self.0.push(Tag { name, ..tag });
        Ok(())
    }

    /// Removes a tag by name, ignoring surrounding whitespace.
    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        let name = name.trim();
        let index = self.0.iter().position(|tag| tag.name == name)?;
        Some(self.0.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.0.iter().any(|tag| tag.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Tag>> for TagSet {
    type Error = ValidationError;

    fn try_from(tags: Vec<Tag>) -> Result<Self, Self::Error> {
        let mut set = TagSet::new();
        for tag in tags {
            set.add(tag)?;
        }
        Ok(set)
    }
}

impl From<TagSet> for Vec<Tag> {
    fn from(set: TagSet) -> Self {
        set.0
    }
}

/// Everything the course creation flow edits before publishing.
///
/// ## Learning: Clone as Copy-on-Write
///
/// Transitions in `command::reduce` clone the draft, mutate the clone and
/// hand it back. A failed transition simply drops the clone, so readers of
/// the old value never observe a half-applied change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseDraft {
    pub(crate) title: String,
    /// Rich text (HTML) from the description editor
    pub(crate) description: String,
    pub(crate) tags: TagSet,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) instructor: Option<InstructorRef>,
    pub(crate) interactive: bool,
    pub(crate) modules: Vec<Module>,
    /// Module shown in detail view; `None` shows the module list
    pub(crate) viewed_module: Option<usize>,
    pub(crate) step: Step,
}

impl CourseDraft {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Getters ====================

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }

    pub fn instructor(&self) -> Option<&InstructorRef> {
        self.instructor.as_ref()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn step(&self) -> Step {
        self.step
    }

    // ==================== Metadata ====================

    pub fn select_category(&mut self, category: CategoryRef) {
        self.category = Some(category);
    }

    pub fn select_instructor(&mut self, instructor: Option<InstructorRef>) {
        self.instructor = instructor;
    }

    /// Interactive courses run without an instructor.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Adds a tag. Blank and duplicate names are rejected.
    pub fn add_tag(&mut self, tag: Tag) -> CoreResult<()> {
        Ok(self.tags.add(tag)?)
    }

    pub fn remove_tag(&mut self, name: &str) -> CoreResult<Tag> {
        self.tags
            .remove(name)
            .ok_or_else(|| CoreError::TagNotFound(name.trim().to_string()))
    }

    // ==================== Wizard ====================

    /// Advances one step if the current step is complete.
    ///
    /// On the last step a complete draft reports `Ready` and stays put.
    pub fn next_step(&mut self) -> CoreResult<StepOutcome> {
        self.step.check(self)?;

        match self.step.next() {
            Some(next) => {
                self.step = next;
                Ok(StepOutcome::Advanced(next))
            }
            None => Ok(StepOutcome::Ready),
        }
    }

    /// Issues blocking `step`; empty when the step is complete.
    pub fn completion_issues(&self, step: Step) -> Vec<FieldIssue> {
        match step.check(self) {
            Ok(()) => Vec::new(),
            Err(err) => err.into_issues(),
        }
    }

    /// Goes back one step.
    pub fn back_step(&mut self) -> CoreResult<Step> {
        let previous = self.step.previous().ok_or_else(|| {
            CoreError::InvalidTransition(format!("cannot go back from the {} step", self.step))
        })?;
        self.step = previous;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_step_without_category_is_noop() {
        let mut draft = CourseDraft::new();
        let err = draft.next_step().unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref v) if v.mentions("category")));
        assert_eq!(draft.step(), Step::Category);

        draft.select_category(CategoryRef::new("1", "Languages"));
        assert_eq!(
            draft.next_step().unwrap(),
            StepOutcome::Advanced(Step::Instructor)
        );
        assert_eq!(draft.step(), Step::Instructor);
    }

    #[test]
    fn test_full_wizard_walk() {
        let mut draft = CourseDraft::new();
        draft.select_category(CategoryRef::new("1", "Languages"));
        draft.next_step().unwrap();
        draft.set_interactive(true);
        draft.next_step().unwrap();
        assert_eq!(draft.step(), Step::CourseInfo);

        assert!(draft.next_step().is_err());
        draft.set_title("Spanish");
        draft.set_description("Learn Spanish");
        draft.add_tag(Tag::new("es", "#F97316")).unwrap();
        assert_eq!(draft.next_step().unwrap(), StepOutcome::Ready);
        assert_eq!(draft.step(), Step::CourseInfo);
    }

    #[test]
    fn test_completion_issues() {
        let mut draft = CourseDraft::new();
        let issues = draft.completion_issues(Step::CourseInfo);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["title", "description", "tags"]);

        draft.set_interactive(true);
        assert!(draft.completion_issues(Step::Instructor).is_empty());
    }

    #[test]
    fn test_back_step() {
        let mut draft = CourseDraft::new();
        assert!(matches!(
            draft.back_step(),
            Err(CoreError::InvalidTransition(_))
        ));

        draft.select_category(CategoryRef::new("1", "Languages"));
        draft.next_step().unwrap();
        assert_eq!(draft.back_step().unwrap(), Step::Category);
    }

    #[test]
    fn test_tags_unique_by_name() {
        let mut draft = CourseDraft::new();
        draft.add_tag(Tag::new("grammar", "#111")).unwrap();
        assert!(draft.add_tag(Tag::new(" grammar ", "#222")).is_err());
        assert!(draft.add_tag(Tag::new("   ", "#222")).is_err());
        assert_eq!(draft.tags().len(), 1);

        assert!(draft.remove_tag("grammar").is_ok());
        assert!(draft.tags().is_empty());
    }

    #[test]
    fn test_remove_tag_trims_and_reports_missing() {
        let mut draft = CourseDraft::new();
        draft.add_tag(Tag::new(" grammar ", "#111")).unwrap();
        assert_eq!(draft.remove_tag(" grammar ").unwrap().name, "grammar");

        assert!(matches!(
            draft.remove_tag("grammar"),
            Err(CoreError::TagNotFound(ref name)) if name == "grammar"
        ));
    }

    #[test]
    fn test_deserialized_tags_are_checked() {
        let tags: TagSet =
            serde_json::from_str(r##"[{"name":" es ","color":"#F97316"}]"##).unwrap();
        assert!(tags.contains("es"));
        assert_eq!(serde_json::to_string(&tags).unwrap(), r##"[{"name":"es","color":"#F97316"}]"##);

        let dup = serde_json::from_str::<TagSet>(
            r##"[{"name":"es","color":"#111"},{"name":"es","color":"#222"}]"##,
        );
        assert!(dup.is_err());

        let draft = serde_json::from_str::<CourseDraft>(r##"{"tags":[{"name":"  ","color":"#111"}]}"##);
        assert!(draft.is_err());
    }
}
