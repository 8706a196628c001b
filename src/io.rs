// ============================================================================
// FILE I/O: export writers, image import from disk, system clipboard text
// ============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::canvas::PixelGrid;
use crate::ops::export::{self, ExportError, MarkupStyle};
use crate::ops::import::{self, ImportError};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Every output the editor can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Svg,
    #[default]
    Png,
    DataUri,
    Markdown,
    Html,
    Blocks,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::DataUri => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Blocks => "txt",
        }
    }

    /// Formats that produce text rather than binary image data.
    pub fn is_text(&self) -> bool {
        !matches!(self, ExportFormat::Png)
    }

    /// Infer from a file extension. Unknown extensions give `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "svg" => Some(ExportFormat::Svg),
            "png" => Some(ExportFormat::Png),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            "html" | "htm" => Some(ExportFormat::Html),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "data-uri" | "datauri" | "uri" => Ok(ExportFormat::DataUri),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            "blocks" | "block" => Ok(ExportFormat::Blocks),
            other => Err(format!(
                "unknown format '{}' (expected svg, png, data-uri, markdown, html, blocks)",
                other
            )),
        }
    }
}

/// Render `grid` as text in a text format. Returns `None` for PNG.
pub fn render_text(
    grid: &PixelGrid,
    format: ExportFormat,
    scale: u32,
) -> Result<Option<String>, ExportError> {
    Ok(Some(match format {
        ExportFormat::Png => return Ok(None),
        // SVG is vector; its scale is user units per cell
        ExportFormat::Svg => export::to_svg(grid, scale),
        ExportFormat::DataUri => export::to_png_data_uri(grid, scale)?,
        ExportFormat::Markdown => export::to_embedded_image_markup(grid, scale, MarkupStyle::Markdown)?,
        ExportFormat::Html => export::to_embedded_image_markup(grid, scale, MarkupStyle::Html)?,
        ExportFormat::Blocks => export::to_block_art(grid),
    }))
}

/// Export `grid` to `path` in `format`.
pub fn write_export(
    path: &Path,
    format: ExportFormat,
    grid: &PixelGrid,
    scale: u32,
) -> Result<(), IoError> {
    let bytes = match render_text(grid, format, scale)? {
        Some(text) => text.into_bytes(),
        None => export::to_png_bytes(grid, scale)?,
    };
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    log::info!("exported {:?} to {}", format, path.display());
    Ok(())
}

/// Load an image file from disk and import it onto `grid`.
pub fn read_image_file(
    path: &Path,
    grid: &mut PixelGrid,
    alpha_threshold: u8,
) -> Result<(), IoError> {
    let bytes = std::fs::read(path)?;
    import::import_bytes(grid, &bytes, alpha_threshold)?;
    log::info!("imported {} onto {}x{} grid", path.display(), grid.size(), grid.size());
    Ok(())
}

/// Put `text` on the system clipboard.
pub fn copy_text_to_clipboard(text: &str) -> Result<(), IoError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| IoError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| IoError::Clipboard(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Color;

    fn sample_grid() -> PixelGrid {
        let mut grid = PixelGrid::new(4).unwrap();
        grid.set(0, 0, Color::rgb(0, 128, 255));
        grid
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("SVG".parse::<ExportFormat>(), Ok(ExportFormat::Svg));
        assert_eq!("data-uri".parse::<ExportFormat>(), Ok(ExportFormat::DataUri));
        assert_eq!("blocks".parse::<ExportFormat>(), Ok(ExportFormat::Blocks));
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::from_extension("HTM"), Some(ExportFormat::Html));
        assert_eq!(ExportFormat::from_extension("txt"), None);
    }

    #[test]
    fn writes_svg_and_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let grid = sample_grid();

        let svg_path = dir.path().join("logo.svg");
        write_export(&svg_path, ExportFormat::Svg, &grid, 1).unwrap();
        let svg = std::fs::read_to_string(&svg_path).unwrap();
        assert!(svg.contains(r##"fill="#0080ff""##));

        let png_path = dir.path().join("logo.png");
        write_export(&png_path, ExportFormat::Png, &grid, 2).unwrap();
        let img = image::open(&png_path).unwrap();
        assert_eq!((img.width(), img.height()), (8, 8));
    }

    #[test]
    fn read_image_file_round_trips_png() {
        let dir = tempfile::tempdir().unwrap();
        let grid = sample_grid();
        let path = dir.path().join("in.png");
        write_export(&path, ExportFormat::Png, &grid, 1).unwrap();

        let mut loaded = PixelGrid::new(4).unwrap();
        read_image_file(&path, &mut loaded, 128).unwrap();
        assert_eq!(loaded, grid);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut grid = PixelGrid::new(4).unwrap();
        let err = read_image_file(Path::new("/nonexistent/nope.png"), &mut grid, 128);
        assert!(matches!(err, Err(IoError::Io(_))));
    }
}
