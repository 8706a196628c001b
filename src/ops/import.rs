// ============================================================================
// IMAGE IMPORT: resample any decodable raster onto the pixel grid
// ============================================================================

use image::DynamicImage;
use image::imageops::FilterType;

use crate::canvas::{Color, PixelGrid};

pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

/// Resample `img` to the grid size and overwrite every cell. Pixels with
/// alpha above `alpha_threshold` become opaque colors; the rest become
/// transparent.
pub fn import_image(
    grid: &mut PixelGrid,
    img: &DynamicImage,
    alpha_threshold: u8,
) -> Result<(), ImportError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ImportError::Empty);
    }
    let size = grid.size();
    let resized = img.resize_exact(size, size, FilterType::Triangle).to_rgba8();

    for (x, y, px) in resized.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let color = if a > alpha_threshold {
            Color::rgb(r, g, b)
        } else {
            Color::Transparent
        };
        grid.set(x as i32, y as i32, color);
    }
    Ok(())
}

/// Decode `bytes` (any format the `image` crate was built with) and import.
/// The grid is untouched if decoding fails.
pub fn import_bytes(
    grid: &mut PixelGrid,
    bytes: &[u8],
    alpha_threshold: u8,
) -> Result<(), ImportError> {
    let img = image::load_from_memory(bytes)?;
    import_image(grid, &img, alpha_threshold)
}
