pub mod clipboard;
pub mod export;
pub mod import;
