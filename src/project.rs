use std::collections::VecDeque;

use crate::canvas::{Color, GridError, PixelGrid};
use crate::components::colors::ColorPalette;
use crate::components::history::HistoryManager;
use crate::components::tools::{self, BrushState, Tool};
use crate::ops::clipboard::RegionClipboard;
use crate::ops::import;
use crate::settings::EditorSettings;
use crate::storage::KeyValueStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// User-facing message queued for whatever front end is attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    /// Re-copy the last completed selection rectangle.
    Copy,
    /// Pick up the most recent clipboard slot.
    Paste,
    /// Escape: drop a pending paste or selection drag.
    Cancel,
    Clear,
}

/// Rectangle being dragged out with the Select tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionDrag {
    pub start: (i32, i32),
    pub current: (i32, i32),
}

/// The single open document plus every piece of editor state input events
/// act on.
pub struct EditorState {
    pub grid: PixelGrid,
    pub history: HistoryManager,
    pub clipboard: RegionClipboard,
    pub brush: BrushState,
    pub palette: ColorPalette,
    pub settings: EditorSettings,
    drag: Option<SelectionDrag>,
    last_selection: Option<SelectionDrag>,
    /// Previous cell of an in-progress paint/erase stroke.
    stroke_cell: Option<(i32, i32)>,
    notices: VecDeque<Notice>,
    /// Where the palette is persisted; `None` keeps it in memory only.
    store: Option<Box<dyn KeyValueStore>>,
}

impl EditorState {
    pub fn new(settings: EditorSettings) -> Result<Self, GridError> {
        Ok(Self {
            grid: PixelGrid::new(settings.default_grid_size)?,
            history: HistoryManager::new(settings.history_limit),
            clipboard: RegionClipboard::new(settings.clipboard_slots, settings.paste_mode),
            brush: BrushState::default(),
            palette: ColorPalette::new(settings.recent_colors_limit),
            settings,
            drag: None,
            last_selection: None,
            stroke_cell: None,
            notices: VecDeque::new(),
            store: None,
        })
    }

    /// Like [`EditorState::new`], but the palette is reloaded from `store`
    /// and written back to it whenever it changes.
    pub fn with_store(
        settings: EditorSettings,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, GridError> {
        let mut state = Self::new(settings)?;
        state.palette.load(store.as_ref());
        state.store = Some(store);
        Ok(state)
    }

    fn save_palette(&mut self) {
        if let Some(store) = self.store.as_deref_mut()
            && let Err(e) = self.palette.save(store)
        {
            log::warn!("could not save palette: {}", e);
        }
    }

    // -- notices ---------------------------------------------------------------

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Error => log::error!("{}", message),
            _ => log::info!("{}", message),
        }
        self.notices.push_back(Notice { level, message });
    }

    /// Take every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // -- tool state ------------------------------------------------------------

    pub fn select_tool(&mut self, tool: Tool) {
        self.stroke_cell = None;
        self.drag = None;
        self.brush.tool = tool;
    }

    pub fn set_color(&mut self, color: Color) {
        self.brush.color = color;
        self.palette.push_recent(color);
        self.save_palette();
    }

    /// Add `color` to the custom palette. Returns `false` if already present.
    pub fn add_custom_color(&mut self, color: Color) -> bool {
        let added = self.palette.add_custom(color);
        if added {
            self.save_palette();
        }
        added
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.set_brush_size(size);
    }

    pub fn selection_drag(&self) -> Option<SelectionDrag> {
        self.drag
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke_cell.is_some()
    }

    // -- pointer ---------------------------------------------------------------

    pub fn pointer_down(&mut self, x: i32, y: i32) {
        if self.clipboard.is_pasting() {
            self.clipboard.update_paste_offset(x, y);
            self.clipboard.commit_paste(&mut self.grid, &mut self.history);
            return;
        }

        match self.brush.tool {
            Tool::Paint | Tool::Erase => {
                // one snapshot per stroke, not per cell
                self.history.snapshot(&self.grid);
                tools::apply_brush(
                    &mut self.grid,
                    x,
                    y,
                    self.brush.brush_size(),
                    self.brush.stroke_color(),
                );
                self.stroke_cell = Some((x, y));
            }
            Tool::Fill => {
                if tools::fill_would_change(&self.grid, x, y, self.brush.color) {
                    self.history.snapshot(&self.grid);
                    tools::flood_fill(&mut self.grid, x, y, self.brush.color);
                }
            }
            Tool::ColorPick => {
                if let Some(color) = tools::pick_color(&self.grid, x, y) {
                    self.set_color(color);
                }
            }
            Tool::Select => {
                self.drag = Some(SelectionDrag {
                    start: (x, y),
                    current: (x, y),
                });
            }
        }
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) {
        if self.clipboard.is_pasting() {
            self.clipboard.update_paste_offset(x, y);
            return;
        }
        if let Some(prev) = self.stroke_cell {
            if prev != (x, y) {
                tools::stroke_line(
                    &mut self.grid,
                    prev,
                    (x, y),
                    self.brush.brush_size(),
                    self.brush.stroke_color(),
                );
                self.stroke_cell = Some((x, y));
            }
            return;
        }
        if let Some(drag) = self.drag.as_mut() {
            drag.current = (x, y);
        }
    }

    pub fn pointer_up(&mut self, x: i32, y: i32) {
        self.stroke_cell = None;
        let Some(mut drag) = self.drag.take() else { return };
        drag.current = (x, y);
        let (x0, y0) = drag.start;
        if self.clipboard.copy(&self.grid, x0, y0, x, y).is_some() {
            self.last_selection = Some(drag);
        }
    }

    // -- keyboard --------------------------------------------------------------

    pub fn key_down(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::Copy => {
                if let Some(sel) = self.last_selection {
                    let ((x0, y0), (x1, y1)) = (sel.start, sel.current);
                    self.clipboard.copy(&self.grid, x0, y0, x1, y1);
                }
            }
            Shortcut::Paste => {
                if let Some(sel) = self.clipboard.latest().cloned() {
                    self.stroke_cell = None;
                    self.drag = None;
                    self.clipboard.begin_paste(&sel);
                }
            }
            Shortcut::Cancel => {
                self.clipboard.cancel_paste();
                self.drag = None;
            }
            Shortcut::Clear => self.clear(),
        }
    }

    // -- document-level operations ---------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.clipboard.cancel_paste();
        self.stroke_cell = None;
        self.history.undo(&mut self.grid)
    }

    pub fn redo(&mut self) -> bool {
        self.clipboard.cancel_paste();
        self.stroke_cell = None;
        self.history.redo(&mut self.grid)
    }

    pub fn clear(&mut self) {
        self.history.snapshot(&self.grid);
        self.grid.clear();
    }

    /// Replace the grid with an empty one of `size`. History is dropped and
    /// any pending paste is cancelled.
    pub fn resize_grid(&mut self, size: u32) -> Result<(), GridError> {
        self.grid.resize(size)?;
        self.history.clear();
        self.clipboard.cancel_paste();
        self.drag = None;
        self.last_selection = None;
        self.stroke_cell = None;
        log::info!("new {}x{} grid", size, size);
        Ok(())
    }

    /// Decode `bytes` and import them onto the grid. The grid and history are
    /// untouched when decoding fails.
    pub fn import_image_bytes(&mut self, bytes: &[u8]) -> bool {
        match image::load_from_memory(bytes) {
            Ok(img) => {
                self.history.snapshot(&self.grid);
                match import::import_image(&mut self.grid, &img, self.settings.import_alpha_threshold) {
                    Ok(()) => {
                        self.notify(NoticeLevel::Success, "Image imported");
                        true
                    }
                    Err(e) => {
                        self.notify(NoticeLevel::Error, format!("Import failed: {}", e));
                        false
                    }
                }
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Import failed: {}", e));
                false
            }
        }
    }
}
