//! # Undo History
//!
//! Bounded undo/redo history of state snapshots.
//!
//! ## Philosophy
//!
//! - **Snapshots, not commands**: Entries are whole states, restoring one is a plain swap
//! - **Bounded**: The undo side never holds more than `capacity` entries
//! - **Constant time**: Push, pop and eviction never copy or rebuild the history
//!
//! ## Model
//!
//! ```text
//! push_undo(s4)          undo(current) x2          push_undo(s5)
//! undo: [s1 s2 s3 s4]    undo: [s1 s2]             undo: [s1 s2 s5]
//! redo: []               redo: [cur s3]            redo: []
//! ```
//!
//! The caller owns the present state. `undo` and `redo` take it, file it on
//! the opposite side, and hand back the state to restore.

use std::collections::VecDeque;
use std::fmt;

/// Default number of undo entries kept
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded snapshot history with redo support
#[derive(Clone)]
pub struct UndoRedoStack<T> {
    /// Newest at the back
    undo: VecDeque<T>,
    /// Newest at the back
    redo: VecDeque<T>,
    capacity: usize,
}

impl<T> UndoRedoStack<T> {
    /// Creates an empty history holding at most `capacity` undo entries
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            redo: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records the state that existed before a mutating action
    ///
    /// Evicts the oldest entry when full and discards the redo side, since a
    /// fresh action invalidates forward history.
    pub fn push_undo(&mut self, snapshot: T) {
        self.undo.push_back(snapshot);
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
            tracing::trace!(target: "undo_history", capacity = self.capacity, "evicted oldest entry");
        }
        self.redo.clear();
    }

    /// Steps back one entry
    ///
    /// Returns the snapshot to restore and files `current` for redo, or
    /// `None` (dropping nothing) when there is nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        Self::push_bounded(&mut self.redo, current, self.capacity);
        Some(previous)
    }

    /// Steps forward one entry; inverse of [`undo`](Self::undo)
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop_back()?;
        Self::push_bounded(&mut self.undo, current, self.capacity);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Most recent undo entry, if any
    pub fn peek_undo(&self) -> Option<&T> {
        self.undo.back()
    }

    pub fn peek_redo(&self) -> Option<&T> {
        self.redo.back()
    }

    /// Undo entries, oldest first
    pub fn undo_entries(&self) -> impl Iterator<Item = &T> {
        self.undo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_bounded(side: &mut VecDeque<T>, entry: T, capacity: usize) {
        side.push_back(entry);
        if side.len() > capacity {
            side.pop_front();
        }
    }
}

impl<T> Default for UndoRedoStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> fmt::Debug for UndoRedoStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRedoStack")
            .field("undo_depth", &self.undo.len())
            .field("redo_depth", &self.redo.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_history() {
        let mut history: UndoRedoStack<u32> = UndoRedoStack::new(3);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(7), None);
        assert_eq!(history.redo(7), None);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut history = UndoRedoStack::new(0);
        assert_eq!(history.capacity(), 1);
        history.push_undo("a");
        history.push_undo("b");
        assert_eq!(history.undo_entries().copied().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_undo_then_redo_round_trip() {
        let mut history = UndoRedoStack::new(10);
        let mut state = "one".to_string();

        history.push_undo(state.clone());
        state = "two".to_string();

        state = history.undo(state).unwrap();
        assert_eq!(state, "one");
        state = history.redo(state).unwrap();
        assert_eq!(state, "two");
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = UndoRedoStack::new(10);
        history.push_undo(1);
        history.push_undo(2);
        history.undo(3);
        assert!(history.can_redo());

        history.push_undo(4);
        assert!(!history.can_redo());
        assert_eq!(history.peek_undo(), Some(&4));
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let mut history = UndoRedoStack::new(3);
        for i in 0..5 {
            history.push_undo(i);
        }
        assert_eq!(history.undo_entries().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_sustained_pushes_at_capacity() {
        let mut history = UndoRedoStack::new(DEFAULT_CAPACITY);
        for i in 0..100_000u32 {
            history.push_undo(i);
        }
        assert_eq!(history.undo_depth(), DEFAULT_CAPACITY);
        assert_eq!(history.peek_undo(), Some(&99_999));
        assert_eq!(history.undo_entries().next(), Some(&(100_000 - DEFAULT_CAPACITY as u32)));
    }

    #[test]
    fn test_redo_respects_capacity() {
        let mut history = UndoRedoStack::new(2);
        history.push_undo(1);
        history.push_undo(2);
        let first = history.undo(10).unwrap();
        let second = history.undo(first).unwrap();
        assert_eq!(second, 1);
        history.redo(second);
        history.redo(2);
        assert!(history.undo_depth() <= 2);
        assert!(history.redo_depth() <= 2);
    }

    proptest! {
        #[test]
        fn capacity_bound_keeps_newest(capacity in 1usize..32, extra in 0usize..64) {
            let mut history = UndoRedoStack::new(capacity);
            let total = capacity + extra;
            for i in 0..total {
                history.push_undo(i);
            }
            let kept: Vec<usize> = history.undo_entries().copied().collect();
            let expected: Vec<usize> = (extra..total).collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn undo_redo_restores_state(pushes in proptest::collection::vec(0u32..1000, 1..20), current in 0u32..1000) {
            let mut history = UndoRedoStack::new(8);
            for p in &pushes {
                history.push_undo(*p);
            }
            let undo_before = history.undo_depth();

            let restored = history.undo(current).unwrap();
            let back = history.redo(restored).unwrap();

            prop_assert_eq!(back, current);
            prop_assert_eq!(history.undo_depth(), undo_before);
            prop_assert!(history.undo_depth() <= history.capacity());
        }
    }
}
