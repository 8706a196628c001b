use crate::canvas::Color;
use crate::storage::{KeyValueStore, StorageError};

pub const RECENT_COLORS_KEY: &str = "pixel-logo.recent-colors";
pub const CUSTOM_PALETTE_KEY: &str = "pixel-logo.custom-palette";
pub const DEFAULT_RECENT_LIMIT: usize = 16;

// ============================================================================
// ColorPalette: recent colors + user palette, persisted as color strings
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorPalette {
    recent: Vec<Color>,
    custom: Vec<Color>,
    recent_limit: usize,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

impl ColorPalette {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            recent: Vec::new(),
            custom: Vec::new(),
            recent_limit: recent_limit.max(1),
        }
    }

    pub fn recent(&self) -> &[Color] {
        &self.recent
    }

    pub fn custom(&self) -> &[Color] {
        &self.custom
    }

    /// Most-recent-first, no duplicates. The sentinel is never recorded.
    pub fn push_recent(&mut self, color: Color) {
        if color.is_transparent() {
            return;
        }
        self.recent.retain(|c| *c != color);
        self.recent.insert(0, color);
        self.recent.truncate(self.recent_limit);
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
    }

    /// Append to the custom palette. Returns `false` if already present.
    pub fn add_custom(&mut self, color: Color) -> bool {
        if color.is_transparent() || self.custom.contains(&color) {
            return false;
        }
        self.custom.push(color);
        true
    }

    pub fn remove_custom(&mut self, index: usize) -> Option<Color> {
        (index < self.custom.len()).then(|| self.custom.remove(index))
    }

    /// Reload both lists from `store`. Missing keys leave the list empty;
    /// unparseable entries are dropped.
    pub fn load(&mut self, store: &dyn KeyValueStore) {
        self.recent = read_colors(store, RECENT_COLORS_KEY);
        self.recent.truncate(self.recent_limit);
        self.custom = read_colors(store, CUSTOM_PALETTE_KEY);
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        store.set(RECENT_COLORS_KEY, &serde_json::to_string(&self.recent)?)?;
        store.set(CUSTOM_PALETTE_KEY, &serde_json::to_string(&self.custom)?)?;
        Ok(())
    }
}

fn read_colors(store: &dyn KeyValueStore, key: &str) -> Vec<Color> {
    let Some(raw) = store.get(key) else {
        return Vec::new();
    };
    let entries: Vec<String> = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("stored value for '{}' is not a string list: {}", key, e);
            return Vec::new();
        }
    };
    entries
        .iter()
        .filter_map(|s| match s.parse::<Color>() {
            Ok(c) if !c.is_transparent() => Some(c),
            Ok(_) => None,
            Err(e) => {
                log::warn!("skipping stored color in '{}': {}", key, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn recent_colors_move_to_front_and_cap() {
        let mut palette = ColorPalette::new(3);
        for v in 1..=4 {
            palette.push_recent(Color::rgb(v, 0, 0));
        }
        palette.push_recent(Color::rgb(3, 0, 0));
        palette.push_recent(Color::Transparent);
        assert_eq!(
            palette.recent(),
            &[Color::rgb(3, 0, 0), Color::rgb(4, 0, 0), Color::rgb(2, 0, 0)]
        );
    }

    #[test]
    fn custom_palette_dedupes() {
        let mut palette = ColorPalette::default();
        assert!(palette.add_custom(Color::BLACK));
        assert!(!palette.add_custom(Color::BLACK));
        assert!(!palette.add_custom(Color::Transparent));
        assert_eq!(palette.remove_custom(5), None);
        assert_eq!(palette.remove_custom(0), Some(Color::BLACK));
        assert!(palette.custom().is_empty());
    }

    #[test]
    fn save_then_load_under_two_keys() {
        let mut store = MemoryStore::default();
        let mut palette = ColorPalette::default();
        palette.push_recent(Color::rgb(255, 0, 0));
        palette.add_custom(Color::rgb(0, 0, 255));
        palette.save(&mut store).unwrap();

        assert_eq!(store.get(RECENT_COLORS_KEY).as_deref(), Some(r##"["#ff0000"]"##));
        assert_eq!(store.get(CUSTOM_PALETTE_KEY).as_deref(), Some(r##"["#0000ff"]"##));

        let mut reloaded = ColorPalette::default();
        reloaded.load(&store);
        assert_eq!(reloaded, palette);
    }

    #[test]
    fn load_skips_bad_entries() {
        let mut store = MemoryStore::default();
        store
            .set(RECENT_COLORS_KEY, r##"["#00ff00", "bogus", "", "transparent"]"##)
            .unwrap();
        store.set(CUSTOM_PALETTE_KEY, "not json").unwrap();

        let mut palette = ColorPalette::default();
        palette.load(&store);
        assert_eq!(palette.recent(), &[Color::rgb(0, 255, 0)]);
        assert!(palette.custom().is_empty());
    }
}
