//! Linear undo/redo history for the pattern editor.
//!
//! Entries past the current index stay reachable by redo only until the next
//! commit, which truncates them. There is no branching.

use crate::board::{BoardPosition, Sign};

/// One committed board together with the sign of the stone that produced it.
///
/// `move_sign` is [`Sign::Empty`] for entries that do not record a placement
/// (the initial board, removals, loaded patterns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub board: BoardPosition,
    pub move_sign: Sign,
}

impl HistoryEntry {
    pub fn new(board: BoardPosition, move_sign: Sign) -> Self {
        Self { board, move_sign }
    }
}

#[derive(Debug, Clone)]
pub struct EditorHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl EditorHistory {
    /// History holding just `initial`, with no recorded move.
    pub fn new(initial: BoardPosition) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial, Sign::Empty)],
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Drop everything after the current index, append `entry`, and make it
    /// current.
    pub fn commit(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index += 1;
    }

    /// Move back one entry. Returns the entry that was left and the entry
    /// that is now current, or `None` at the start.
    pub fn step_back(&mut self) -> Option<(&HistoryEntry, &HistoryEntry)> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some((&self.entries[self.index + 1], &self.entries[self.index]))
    }

    /// Move forward one entry and return it, or `None` at the end.
    pub fn step_forward(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// Forget everything and start over from `initial`.
    pub fn reset(&mut self, initial: BoardPosition) {
        *self = Self::new(initial);
    }
}
