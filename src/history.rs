// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Linear undo/redo over full snapshots.

/// Snapshot stack with a cursor. The cursor always points at a valid snapshot,
/// and pushing after an undo drops the redo tail.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    index: usize,
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> History<T> {
    /// Start with `baseline` as the only snapshot; undo never goes past it.
    pub fn new(baseline: T) -> Self {
        Self {
            snapshots: vec![baseline],
            index: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.snapshots[self.index]
    }

    pub fn push(&mut self, snapshot: T) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index = self.snapshots.len() - 1;
    }

    /// Drop every snapshot after the cursor.
    pub fn discard_redo(&mut self) {
        self.snapshots.truncate(self.index + 1);
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// `(index, len)` of the cursor.
    pub fn position(&self) -> (usize, usize) {
        (self.index, self.snapshots.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_cannot_be_undone() {
        let mut history = History::new(0);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(*history.current(), 0);
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut history = History::new(0);
        for v in 1..=5 {
            history.push(v);
        }
        for k in 1..=5 {
            for _ in 0..k {
                history.undo();
            }
            for _ in 0..k {
                history.redo();
            }
            assert_eq!(*history.current(), 5);
        }
    }

    #[test]
    fn test_push_discards_redo_tail() {
        let mut history = History::new(0);
        history.push(1);
        history.push(2);
        history.undo();
        history.push(3);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(*history.current(), 3);
        assert_eq!(history.position(), (2, 3));
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_discard_redo_keeps_cursor() {
        let mut history = History::new(0);
        history.push(1);
        history.push(2);
        history.undo();
        history.discard_redo();
        assert_eq!(history.position(), (1, 2));
        assert_eq!(*history.current(), 1);
        assert!(!history.can_redo());

        // No tail: nothing to drop
        history.discard_redo();
        assert_eq!(history.position(), (1, 2));
    }
}
