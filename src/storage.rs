//! Local key-value storage.
//!
//! The editor persists a couple of small string values (the recent-colors
//! list and the custom palette) under fixed keys. [`FileStore`] keeps them in
//! one JSON object file in the platform config directory, rewritten on every
//! change. [`MemoryStore`] is the same contract without the disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no config directory available")]
    NoConfigDir,
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ============================================================================
// FILE STORE
// ============================================================================

pub const STORAGE_FILE_NAME: &str = "local_storage.json";

pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileStore {
    /// Open the store in the default config directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = config_dir().ok_or(StorageError::NoConfigDir)?;
        Ok(Self::open(dir.join(STORAGE_FILE_NAME)))
    }

    /// Open (or lazily create) a store at `path`. A missing file is an empty
    /// store; an unreadable or corrupt one is too, with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("{}: expected a JSON object, starting empty", path.display());
                    Map::new()
                }
                Err(e) => {
                    log::warn!("{}: {}, starting empty", path.display(), e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                log::warn!("could not read {}: {}", path.display(), e);
                Map::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// Per-user config directory for PixelFE (created on demand).
pub fn config_dir() -> Option<PathBuf> {
    let dir = platform_base("XDG_CONFIG_HOME", &[".config"])?.join("pixelfe");
    let _ = std::fs::create_dir_all(&dir);
    Some(dir)
}

/// Platform data directory without an app sub-folder; the working directory
/// when nothing else is known.
pub fn data_dir() -> PathBuf {
    platform_base("XDG_DATA_HOME", &[".local", "share"]).unwrap_or_else(|| PathBuf::from("."))
}

/// `%APPDATA%` on Windows, `~/Library/Application Support` on macOS, else
/// the XDG variable or its `$HOME`-relative default.
fn platform_base(xdg_var: &str, home_default: &[&str]) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return Some(PathBuf::from(home).join("Library").join("Application Support"));
        }
    }
    if let Ok(xdg) = std::env::var(xdg_var)
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg));
    }
    let home = PathBuf::from(std::env::var_os("HOME")?);
    Some(home_default.iter().fold(home, |p, part| p.join(part)))
}
