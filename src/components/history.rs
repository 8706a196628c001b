use std::collections::VecDeque;

use crate::canvas::{Color, PixelGrid};

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// A complete copy of the grid at one point in time. Immutable once pushed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistorySnapshot {
    size: u32,
    cells: Vec<Color>,
}

impl HistorySnapshot {
    pub fn capture(grid: &PixelGrid) -> Self {
        Self {
            size: grid.size(),
            cells: grid.cells().to_vec(),
        }
    }

    pub fn apply(&self, grid: &mut PixelGrid) {
        grid.restore(self.size, &self.cells);
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn memory_size(&self) -> usize {
        self.cells.len() * std::mem::size_of::<Color>()
    }
}

// ============================================================================
// HISTORY MANAGER
// ============================================================================

/// Bounded undo/redo stacks of full-grid snapshots.
///
/// Callers snapshot *before* mutating: once per continuous stroke, once per
/// fill, clear, paste or import.
pub struct HistoryManager {
    undo_stack: VecDeque<HistorySnapshot>,
    redo_stack: VecDeque<HistorySnapshot>,
    max_history_size: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
        }
    }

    /// Push the grid's current state onto the undo stack and drop the redo
    /// branch.
    pub fn snapshot(&mut self, grid: &PixelGrid) {
        self.redo_stack.clear();
        self.undo_stack.push_back(HistorySnapshot::capture(grid));
        self.prune();
    }

    pub fn undo(&mut self, grid: &mut PixelGrid) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push_back(HistorySnapshot::capture(grid));
        snapshot.apply(grid);
        log::debug!(
            "undo: {} left, {} redoable",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        true
    }

    pub fn redo(&mut self, grid: &mut PixelGrid) -> bool {
        let Some(snapshot) = self.redo_stack.pop_back() else {
            return false;
        };
        self.undo_stack.push_back(HistorySnapshot::capture(grid));
        snapshot.apply(grid);
        log::debug!(
            "redo: {} undoable, {} left",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    /// Approximate bytes held across both stacks.
    pub fn memory_usage(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(HistorySnapshot::memory_size)
            .sum()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Evict the oldest snapshots past the cap.
    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            self.undo_stack.pop_front();
        }
    }
}
