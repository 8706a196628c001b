use std::path::PathBuf;

use crate::canvas::GRID_SIZES;
use crate::components::colors::DEFAULT_RECENT_LIMIT;
use crate::components::history::DEFAULT_HISTORY_LIMIT;
use crate::ops::clipboard::{DEFAULT_SLOT_COUNT, PasteMode};

pub const SETTINGS_FILE_NAME: &str = "pixelfe_settings.cfg";

/// Editor configuration, persisted as a `key=value` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorSettings {
    /// Grid edge used for new documents; one of [`GRID_SIZES`].
    pub default_grid_size: u32,
    /// Undo steps kept before the oldest is evicted.
    pub history_limit: usize,
    /// Named clipboard slots.
    pub clipboard_slots: usize,
    /// Pixels per cell for PNG / markup exports (1-64).
    pub export_scale: u32,
    pub paste_mode: PasteMode,
    pub recent_colors_limit: usize,
    /// Imported pixels with alpha above this become opaque cells.
    pub import_alpha_threshold: u8,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_grid_size: 32,
            history_limit: DEFAULT_HISTORY_LIMIT,
            clipboard_slots: DEFAULT_SLOT_COUNT,
            export_scale: 10,
            paste_mode: PasteMode::Composite,
            recent_colors_limit: DEFAULT_RECENT_LIMIT,
            import_alpha_threshold: 128,
        }
    }
}

impl EditorSettings {
    pub fn settings_path() -> Option<PathBuf> {
        crate::storage::config_dir().map(|dir| dir.join(SETTINGS_FILE_NAME))
    }

    /// Load from disk, falling back to defaults for anything missing.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::parse(&content)
    }

    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = std::fs::write(&path, self.to_cfg_string()) {
            log::warn!("could not save settings to {}: {}", path.display(), e);
        }
    }

    /// Parse `key=value` lines. Unknown keys and bad values are ignored.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "default_grid_size" => {
                    if let Ok(v) = val.parse::<u32>()
                        && GRID_SIZES.contains(&v)
                    {
                        s.default_grid_size = v;
                    }
                }
                "history_limit" => {
                    if let Ok(v) = val.parse::<usize>() {
                        s.history_limit = v.clamp(1, 1000);
                    }
                }
                "clipboard_slots" => {
                    if let Ok(v) = val.parse::<usize>() {
                        s.clipboard_slots = v.clamp(1, 64);
                    }
                }
                "export_scale" => {
                    if let Ok(v) = val.parse::<u32>() {
                        s.export_scale = v.clamp(1, 64);
                    }
                }
                "paste_mode" => {
                    s.paste_mode = match val {
                        "replace" => PasteMode::Replace,
                        _ => PasteMode::Composite,
                    };
                }
                "recent_colors_limit" => {
                    if let Ok(v) = val.parse::<usize>() {
                        s.recent_colors_limit = v.clamp(1, 256);
                    }
                }
                "import_alpha_threshold" => {
                    if let Ok(v) = val.parse::<u8>() {
                        s.import_alpha_threshold = v;
                    }
                }
                _ => {}
            }
        }
        s
    }

    pub fn to_cfg_string(&self) -> String {
        let paste_str = match self.paste_mode {
            PasteMode::Composite => "composite",
            PasteMode::Replace => "replace",
        };
        format!(
            "default_grid_size={}\n\
             history_limit={}\n\
             clipboard_slots={}\n\
             export_scale={}\n\
             paste_mode={paste_str}\n\
             recent_colors_limit={}\n\
             import_alpha_threshold={}\n",
            self.default_grid_size,
            self.history_limit,
            self.clipboard_slots,
            self.export_scale,
            self.recent_colors_limit,
            self.import_alpha_threshold,
        )
    }
}
