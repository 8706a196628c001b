// ============================================================================
// CLIPBOARD OPERATIONS: region copy into named slots, paste with live offset
// ============================================================================

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::canvas::{Color, PixelGrid};
use crate::components::history::HistoryManager;

pub const DEFAULT_SLOT_COUNT: usize = 8;

/// How transparent cells of a pasted block treat the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PasteMode {
    /// Transparent source cells are skipped; the block lands like a sticker.
    #[default]
    Composite,
    /// Every source cell is written, transparent ones included.
    Replace,
}

// ---------------------------------------------------------------------------
//  RegionSelection
// ---------------------------------------------------------------------------

/// An immutable copied rectangle. Bounds are inclusive grid coordinates;
/// `cells` is row-major and exactly `width * height` long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSelection {
    pub id: Uuid,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub width: u32,
    pub height: u32,
    cells: Vec<Color>,
    pub timestamp: DateTime<Utc>,
}

impl RegionSelection {
    /// Copy the rectangle spanned by two corner cells (any order). The
    /// rectangle is clipped to the grid. Returns `None` when the clipped
    /// rectangle is a single cell (a zero-area drag) or entirely off-grid.
    pub fn capture(grid: &PixelGrid, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        let last = grid.size() as i32 - 1;
        let start_x = x0.min(x1).max(0);
        let start_y = y0.min(y1).max(0);
        let end_x = x0.max(x1).min(last);
        let end_y = y0.max(y1).min(last);
        if start_x > end_x || start_y > end_y {
            return None;
        }
        if start_x == end_x && start_y == end_y {
            return None;
        }

        let width = (end_x - start_x + 1) as u32;
        let height = (end_y - start_y + 1) as u32;
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in start_y..=end_y {
            for x in start_x..=end_x {
                cells.push(grid.get(x, y).unwrap_or_default());
            }
        }

        Some(Self {
            id: Uuid::new_v4(),
            start_x,
            start_y,
            end_x,
            end_y,
            width,
            height,
            cells,
            timestamp: Utc::now(),
        })
    }

    /// Cell at `(dx, dy)` relative to the selection's top-left corner.
    pub fn cell(&self, dx: u32, dy: u32) -> Option<Color> {
        if dx < self.width && dy < self.height {
            Some(self.cells[(dy * self.width + dx) as usize])
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[Color] {
        &self.cells
    }
}

// ---------------------------------------------------------------------------
//  Paste state
// ---------------------------------------------------------------------------

/// Paste-pending mode: the block follows the cursor until committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPaste {
    pub selection: RegionSelection,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl PendingPaste {
    /// Destination cells of the block at the current offset, as
    /// `(x, y, color)`. Includes off-grid positions; the grid clips them.
    pub fn preview(&self) -> impl Iterator<Item = (i32, i32, Color)> + '_ {
        let sel = &self.selection;
        (0..sel.height).flat_map(move |dy| {
            (0..sel.width).map(move |dx| {
                (
                    self.offset_x + dx as i32,
                    self.offset_y + dy as i32,
                    sel.cells[(dy * sel.width + dx) as usize],
                )
            })
        })
    }
}

// ---------------------------------------------------------------------------
//  RegionClipboard
// ---------------------------------------------------------------------------

/// Fixed number of slots. New copies take the first empty slot; when every
/// slot is occupied the first slot is evicted and the rest shift down.
/// Removing a slot leaves a hole and shifts nothing.
pub struct RegionClipboard {
    slots: Vec<Option<RegionSelection>>,
    last_copied: Option<Uuid>,
    pending: Option<PendingPaste>,
    paste_mode: PasteMode,
}

impl Default for RegionClipboard {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT, PasteMode::default())
    }
}

impl RegionClipboard {
    pub fn new(slot_count: usize, paste_mode: PasteMode) -> Self {
        Self {
            slots: vec![None; slot_count.max(1)],
            last_copied: None,
            pending: None,
            paste_mode,
        }
    }

    pub fn slots(&self) -> &[Option<RegionSelection>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&RegionSelection> {
        self.slots.get(index)?.as_ref()
    }

    pub fn find(&self, id: Uuid) -> Option<&RegionSelection> {
        self.slots.iter().flatten().find(|s| s.id == id)
    }

    /// Most recently copied selection still held.
    pub fn latest(&self) -> Option<&RegionSelection> {
        self.last_copied
            .and_then(|id| self.find(id))
            .or_else(|| self.slots.iter().flatten().max_by_key(|s| s.timestamp))
    }

    pub fn paste_mode(&self) -> PasteMode {
        self.paste_mode
    }

    pub fn set_paste_mode(&mut self, mode: PasteMode) {
        self.paste_mode = mode;
    }

    /// Copy a rectangle into the clipboard. Degenerate selections are
    /// ignored and return `None`.
    pub fn copy(
        &mut self,
        grid: &PixelGrid,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    ) -> Option<&RegionSelection> {
        let selection = RegionSelection::capture(grid, start_x, start_y, end_x, end_y)?;
        log::debug!(
            "copied {}x{} region at ({}, {})",
            selection.width,
            selection.height,
            selection.start_x,
            selection.start_y
        );
        let index = self.store(selection);
        self.slots[index].as_ref()
    }

    fn store(&mut self, selection: RegionSelection) -> usize {
        self.last_copied = Some(selection.id);
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(selection);
            return index;
        }
        self.slots.remove(0);
        self.slots.push(Some(selection));
        self.slots.len() - 1
    }

    /// Empty the slot holding `id`. Other slots keep their positions.
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.slots.iter_mut().find(|s| matches!(s, Some(sel) if sel.id == id)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub fn clear_slot(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    // -- paste ---------------------------------------------------------------

    pub fn pending_paste(&self) -> Option<&PendingPaste> {
        self.pending.as_ref()
    }

    pub fn is_pasting(&self) -> bool {
        self.pending.is_some()
    }

    /// Enter paste-pending mode with the block anchored at its original
    /// position. Does not touch the grid.
    pub fn begin_paste(&mut self, selection: &RegionSelection) {
        self.pending = Some(PendingPaste {
            selection: selection.clone(),
            offset_x: selection.start_x,
            offset_y: selection.start_y,
        });
    }

    /// Center the pending block under the cursor cell.
    pub fn update_paste_offset(&mut self, cursor_x: i32, cursor_y: i32) {
        if let Some(p) = self.pending.as_mut() {
            p.offset_x = cursor_x - (p.selection.width / 2) as i32;
            p.offset_y = cursor_y - (p.selection.height / 2) as i32;
        }
    }

    /// Snapshot, then write the pending block into `grid` and leave paste
    /// mode. Returns `false` if nothing was pending.
    pub fn commit_paste(&mut self, grid: &mut PixelGrid, history: &mut HistoryManager) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        history.snapshot(grid);

        let mut written = 0;
        for (x, y, color) in pending.preview() {
            if self.paste_mode == PasteMode::Composite && color.is_transparent() {
                continue;
            }
            if grid.set(x, y, color) {
                written += 1;
            }
        }
        log::debug!(
            "pasted {}x{} block at ({}, {}), {} cells changed",
            pending.selection.width,
            pending.selection.height,
            pending.offset_x,
            pending.offset_y,
            written
        );
        true
    }

    pub fn cancel_paste(&mut self) {
        self.pending = None;
    }
}
