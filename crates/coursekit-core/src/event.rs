//! Event system for authoring notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! We use `tokio::sync::broadcast` for a safe, async-friendly event bus.
//! Events are values, not callbacks: the toast layer, autosave or a debug
//! console each hold their own receiver, and none of them can reach back
//! into the editor state.

use coursekit_exercise::NodeId;
use tokio::sync::broadcast;

use crate::outline::{LessonId, ModuleId};
use crate::validation::ValidationError;
use crate::wizard::Step;

/// Events that can occur while authoring a course.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    // Draft events
    /// Any committed change to the draft
    DraftChanged,
    /// The wizard moved
    StepChanged(Step),
    /// The wizard's last step is complete
    ReadyToPublish,
    ModuleAdded(ModuleId),
    ModuleRemoved(ModuleId),
    LessonAdded(LessonId),
    /// Detail view switched (`None` is the module list)
    ModuleViewed(Option<usize>),

    // Playground events
    PlaygroundOpened(LessonId),
    PlaygroundCommitted(LessonId),
    PlaygroundClosed(LessonId),
    NodeChanged(NodeId),
    /// Text mode compiled into the node
    TextCompiled(NodeId),

    // Feedback
    /// An action was rejected with field issues
    ValidationFailed(ValidationError),
    ConfigChanged,
}

/// Event bus for broadcasting authoring events.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Helper for processing events asynchronously.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(editor.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let EditorEvent::ValidationFailed(err) = event {
///             notify_validation(&toasts, &i18n, &err);
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::ConfigChanged);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EditorEvent::ConfigChanged));
    }

    #[tokio::test]
    async fn test_handler_sees_events_in_order() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(EditorEvent::StepChanged(Step::Instructor));
        bus.emit(EditorEvent::ReadyToPublish);
        drop(bus);

        assert!(matches!(
            handler.next().await,
            Some(EditorEvent::StepChanged(Step::Instructor))
        ));
        assert!(matches!(handler.next().await, Some(EditorEvent::ReadyToPublish)));
        assert!(handler.next().await.is_none());
    }

    #[test]
    fn test_try_next_without_events() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());
        assert!(handler.try_next().is_none());
    }
}
