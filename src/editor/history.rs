use std::collections::VecDeque;

use crate::draw::path::DrawingPath;
use crate::scene::element::CanvasElement;

/// History tuning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryOpts {
    /// Oldest entries are dropped beyond this many undo steps (`None` = unbounded).
    pub max_depth: Option<usize>,
    /// Push an undo entry for every transform commit and element update.
    pub record_transform_commits: bool,
}

/// Copy of the undoable parts of the editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Element list.
    pub elements: Vec<CanvasElement>,
    /// Committed strokes.
    pub paths: Vec<DrawingPath>,
}

/// Undo and redo stacks of whole snapshots.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    max_depth: Option<usize>,
}

impl History {
    /// Empty history keeping at most `max_depth` undo entries.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
        }
    }

    /// Record the pre-mutation state. Clears the redo stack.
    pub fn push(&mut self, before: Snapshot) {
        self.undo_stack.push_back(before);
        self.redo_stack.clear();
        self.prune();
    }

    /// Swap `current` for the latest undo entry. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let prev = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(current);
        Some(prev)
    }

    /// Swap `current` for the latest redo entry. `None` when there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(current);
        self.prune();
        Some(next)
    }

    /// Return `true` when [`History::undo`] would do something.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Return `true` when [`History::redo`] would do something.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo entries.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo entries.
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn prune(&mut self) {
        if let Some(max) = self.max_depth {
            while self.undo_stack.len() > max {
                self.undo_stack.pop_front();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/history.rs"]
mod tests;
