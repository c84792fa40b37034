//! Authoring orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Authoring` is the one object a host holds. It owns the draft, the open
//! Playground session, the configuration and the event bus, and turns every
//! accepted change into events.

use tokio::sync::broadcast;

use crate::command::{reduce, Action};
use crate::config::Config;
use crate::draft::{CourseDraft, Tag};
use crate::event::{EditorEvent, EventBus};
use crate::outline::LessonId;
use crate::playground::{PlaygroundAction, PlaygroundSession};
use crate::wizard::Step;
use crate::{CoreError, CoreResult};

/// The authoring state of one course.
///
/// ## Thread Safety
///
/// `Authoring` is owned by a single thread. Observers live on the other
/// end of the event bus and only ever see copies of what changed.
pub struct Authoring {
    /// The course being built
    draft: CourseDraft,

    /// Session for the lesson being edited, if any
    playground: Option<PlaygroundSession>,

    /// Authoring configuration
    config: Config,

    /// Event bus for notifications
    event_bus: EventBus,
}

impl Authoring {
    /// Creates an empty draft with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty draft with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self::with_draft(CourseDraft::new(), config)
    }

    /// Resumes authoring an existing draft.
    pub fn with_draft(draft: CourseDraft, config: Config) -> Self {
        Self {
            draft,
            playground: None,
            config,
            event_bus: EventBus::new(),
        }
    }

    // ==================== Accessors ====================

    pub fn draft(&self) -> &CourseDraft {
        &self.draft
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration. Takes effect for the next session.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.emit(EditorEvent::ConfigChanged);
    }

    /// Returns a receiver for authoring events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }

    // ==================== Draft ====================

    /// Applies an action to the draft.
    ///
    /// On success the new draft replaces the old one and the matching
    /// events go out. On failure the draft is unchanged, the failure is
    /// logged, and validation failures are broadcast.
    pub fn dispatch(&mut self, action: Action) -> CoreResult<()> {
        let next = match reduce(&self.draft, &action) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("{} rejected: {}", action.display_name(), e);
                if let Some(validation) = e.validation() {
                    self.emit(EditorEvent::ValidationFailed(validation.clone()));
                }
                return Err(e);
            }
        };

        let previous = std::mem::replace(&mut self.draft, next);
        self.announce(&previous, &action);
        self.drop_orphaned_playground();
        Ok(())
    }

    fn announce(&self, previous: &CourseDraft, action: &Action) {
        match action {
            Action::NextStep if previous.step() == self.draft.step() => {
                self.emit(EditorEvent::ReadyToPublish);
            }
            Action::NextStep | Action::BackStep => {
                self.emit(EditorEvent::StepChanged(self.draft.step()));
            }
            Action::AddModule { .. } => {
                if let Some(module) = self.draft.modules().last() {
                    self.emit(EditorEvent::ModuleAdded(module.id));
                }
            }
            Action::RemoveModule { id } => self.emit(EditorEvent::ModuleRemoved(*id)),
            Action::AddLesson { module_index, .. } => {
                let lesson = self
                    .draft
                    .module(*module_index)
                    .ok()
                    .and_then(|module| module.lessons.last());
                if let Some(lesson) = lesson {
                    self.emit(EditorEvent::LessonAdded(lesson.id));
                }
            }
            _ => {}
        }

        if previous.viewed_module_index() != self.draft.viewed_module_index() {
            self.emit(EditorEvent::ModuleViewed(self.draft.viewed_module_index()));
        }
        if !action.is_view_only() && previous != &self.draft {
            self.emit(EditorEvent::DraftChanged);
        }
    }

    /// Closes the playground if its lesson no longer exists.
    fn drop_orphaned_playground(&mut self) {
        let orphaned = self
            .playground
            .as_ref()
            .map(|session| session.lesson_id())
            .filter(|id| self.draft.find_lesson(*id).is_none());

        if let Some(id) = orphaned {
            tracing::debug!("Lesson {} removed, closing its playground", id);
            self.playground = None;
            self.emit(EditorEvent::PlaygroundClosed(id));
        }
    }

    /// Adds a tag colored from the configured palette.
    pub fn add_tag(&mut self, name: &str) -> CoreResult<()> {
        let color = self.config.tags.color_for(self.draft.tags().len());
        self.dispatch(Action::AddTag {
            tag: Tag::new(name, color),
        })
    }

    /// Current wizard step.
    pub fn step(&self) -> Step {
        self.draft.step()
    }

    // ==================== Playground ====================

    /// Opens the lesson at the given position for editing.
    ///
    /// An already open session is discarded without committing.
    pub fn open_playground(&mut self, module_index: usize, lesson_index: usize) -> CoreResult<LessonId> {
        self.close_playground();

        let session =
            PlaygroundSession::open(&mut self.draft, module_index, lesson_index, &self.config)?;
        let id = session.lesson_id();
        self.playground = Some(session);

        self.emit(EditorEvent::PlaygroundOpened(id));
        Ok(id)
    }

    pub fn playground(&self) -> CoreResult<&PlaygroundSession> {
        self.playground.as_ref().ok_or(CoreError::NoPlayground)
    }

    pub fn playground_mut(&mut self) -> CoreResult<&mut PlaygroundSession> {
        self.playground.as_mut().ok_or(CoreError::NoPlayground)
    }

    /// Applies an action to the open Playground session.
    pub fn dispatch_playground(&mut self, action: PlaygroundAction) -> CoreResult<()> {
        let target = action.node();
        let compiling = matches!(action, PlaygroundAction::Compile(_));

        let session = self.playground.as_mut().ok_or(CoreError::NoPlayground)?;
        if let Err(e) = session.apply(action) {
            tracing::warn!("Playground action rejected: {}", e);
            if let Some(validation) = e.validation() {
                self.emit(EditorEvent::ValidationFailed(validation.clone()));
            }
            return Err(e);
        }

        if let Some(uuid) = target {
            if compiling {
                self.emit(EditorEvent::TextCompiled(uuid));
            }
            self.emit(EditorEvent::NodeChanged(uuid));
        }
        Ok(())
    }

    /// Writes the session's exercises into the draft and keeps it open.
    pub fn commit_playground(&mut self) -> CoreResult<()> {
        let session = self.playground.as_ref().ok_or(CoreError::NoPlayground)?;
        session.commit(&mut self.draft)?;

        let id = session.lesson_id();
        tracing::debug!("Committed playground for lesson {}", id);
        self.emit(EditorEvent::PlaygroundCommitted(id));
        self.emit(EditorEvent::DraftChanged);
        Ok(())
    }

    /// Discards the open session, if any.
    pub fn close_playground(&mut self) -> Option<LessonId> {
        let id = self.playground.take()?.lesson_id();
        self.emit(EditorEvent::PlaygroundClosed(id));
        Some(id)
    }
}

impl Default for Authoring {
    fn default() -> Self {
        Self::new()
    }
}
