//! Undo/redo history of editor snapshots.
//!
//! ## Learning: Snapshots vs Inverse Commands
//!
//! A text buffer can undo by applying the inverse of each edit. Exercise
//! content is small and every change goes through whole-value patches, so
//! storing the previous value is simpler and cannot drift out of sync.
//!
//! Rapid edits that share a coalescing key (typing into the same answer)
//! collapse into one undo step.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Checkpoint<T> {
    state: T,
    key: Option<String>,
    timestamp: Option<Instant>,
}

/// Bounded undo/redo stacks over values of `T`.
///
/// ## Learning: VecDeque
///
/// The undo stack drops its oldest entry when full, so it needs cheap
/// removal at the front as well as push/pop at the back.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: VecDeque<Checkpoint<T>>,
    redo_stack: Vec<T>,
    max_size: usize,
    coalesce_threshold: Duration,
}

impl<T: Clone> History<T> {
    /// Creates a history keeping at most `max_size` undo steps.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_size.min(64)),
            redo_stack: Vec::new(),
            max_size,
            coalesce_threshold: Duration::from_millis(300),
        }
    }

    /// Sets the window within which same-key checkpoints coalesce.
    pub fn with_coalesce_threshold(mut self, threshold: Duration) -> Self {
        self.coalesce_threshold = threshold;
        self
    }

    /// Records the state as it was *before* a change.
    ///
    /// Clears the redo stack.
    pub fn record(&mut self, previous: T) {
        self.push(previous, None);
    }

    /// Records a state, merging with the previous checkpoint when both
    /// carry `key` and arrive within the coalescing window.
    pub fn record_coalescing(&mut self, previous: T, key: impl Into<String>) {
        self.push(previous, Some(key.into()));
    }

    fn push(&mut self, previous: T, key: Option<String>) {
        self.redo_stack.clear();

        if let (Some(key), Some(last)) = (&key, self.undo_stack.back_mut()) {
            let recent = last
                .timestamp
                .is_some_and(|t| t.elapsed() < self.coalesce_threshold);
            if recent && last.key.as_ref() == Some(key) {
                // Keep the older state; only extend the window
                last.timestamp = Some(Instant::now());
                return;
            }
        }

        self.undo_stack.push_back(Checkpoint {
            state: previous,
            key,
            timestamp: Some(Instant::now()),
        });

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Steps back: returns the state to restore, saving `current` for redo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let checkpoint = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(checkpoint.state)
    }

    /// Steps forward again after an undo.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        // No timestamp prevents coalescing with the next edit
        self.undo_stack.push_back(Checkpoint {
            state: current,
            key: None,
            timestamp: None,
        });
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new(10);
        history.record(1);
        history.record(2);

        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), Some(1));
        assert_eq!(history.undo(1), None);

        assert_eq!(history.redo(1), Some(2));
        assert_eq!(history.redo(2), Some(3));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_clear_drops_both_stacks() {
        let mut history = History::new(10);
        history.record(1);
        history.record(2);
        history.undo(3);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 1);

        history.clear();
        assert!(!history.can_undo());
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut history = History::new(10);
        history.record("a");
        history.undo("b");
        assert!(history.can_redo());

        history.record("a");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_bounded_capacity() {
        let mut history = History::new(2);
        for i in 0..5 {
            history.record(i);
        }
        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.undo(5), Some(4));
        assert_eq!(history.undo(4), Some(3));
        assert_eq!(history.undo(3), None);
    }

    #[test]
    fn test_same_key_coalesces() {
        let mut history = History::new(10).with_coalesce_threshold(Duration::from_secs(60));
        history.record_coalescing("", "answer-a");
        history.record_coalescing("P", "answer-a");
        history.record_coalescing("Pa", "answer-a");
        assert_eq!(history.undo_count(), 1);

        history.record_coalescing("Par", "answer-b");
        assert_eq!(history.undo_count(), 2);

        assert_eq!(history.undo("Paris"), Some("Par"));
        assert_eq!(history.undo("Par"), Some(""));
    }
}
