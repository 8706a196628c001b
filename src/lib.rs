//! PixelFE: pixel-art logo editor core.
//!
//! A fixed-size grid of colored cells edited with brush, erase, flood fill,
//! color pick and rectangular region copy/paste, with snapshot undo/redo and
//! exporters for SVG, PNG, data URIs, image markup and block art. The `jmh`
//! module models the benchmark-results viewer that ships alongside it.

pub mod canvas;
pub mod cli;
pub mod components;
pub mod io;
pub mod jmh;
pub mod logger;
pub mod ops;
pub mod project;
pub mod settings;
pub mod storage;

pub use canvas::{Color, GridError, PixelGrid};
pub use project::EditorState;
