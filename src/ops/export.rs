// ============================================================================
// EXPORTERS: SVG markup, PNG bytes / data URI, embedded image markup, block art
// ============================================================================
//
// All exporters read the grid and never mutate it.

use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbaImage};
use rayon::prelude::*;

use crate::canvas::PixelGrid;

/// Largest edge (in pixels) a raster export may have.
pub const MAX_EXPORT_EDGE: u32 = 8192;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("export of {edge}x{edge} pixels exceeds the {MAX_EXPORT_EDGE}px limit", MAX_EXPORT_EDGE = MAX_EXPORT_EDGE)]
    TooLarge { edge: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MarkupStyle {
    #[default]
    Markdown,
    Html,
}

pub const IMAGE_ALT_TEXT: &str = "pixel-logo";

// ---------------------------------------------------------------------------
//  SVG
// ---------------------------------------------------------------------------

/// One `<rect>` per painted cell, `scale` user units per cell. Transparent
/// cells emit nothing.
pub fn to_svg(grid: &PixelGrid, scale: u32) -> String {
    let scale = scale.max(1) as u64;
    let edge = grid.size() as u64 * scale;
    let mut svg = String::with_capacity(64 + grid.opaque_count() * 64);
    let _ = writeln!(
        svg,
        r#"<svg width="{edge}" height="{edge}" viewBox="0 0 {edge} {edge}" xmlns="http://www.w3.org/2000/svg" shape-rendering="crispEdges">"#
    );

    for (x, y, color) in grid.iter() {
        let Some(fill) = color.to_rgb_hex() else { continue };
        let px = x as u64 * scale;
        let py = y as u64 * scale;
        let _ = write!(
            svg,
            r#"  <rect x="{px}" y="{py}" width="{scale}" height="{scale}" fill="{fill}""#
        );
        let alpha = color.alpha();
        if alpha < 255 {
            let _ = write!(svg, r#" fill-opacity="{:.3}""#, alpha as f32 / 255.0);
        }
        svg.push_str("/>\n");
    }

    svg.push_str("</svg>");
    svg
}

// ---------------------------------------------------------------------------
//  PNG
// ---------------------------------------------------------------------------

/// Rasterize to a `size*scale` square image. Transparent cells stay fully
/// transparent.
pub fn rasterize(grid: &PixelGrid, scale: u32) -> Result<RgbaImage, ExportError> {
    let scale = scale.max(1);
    let edge = grid.size() as u64 * scale as u64;
    if edge > MAX_EXPORT_EDGE as u64 {
        return Err(ExportError::TooLarge { edge });
    }
    let edge = edge as u32;
    let size = grid.size() as usize;
    let cells = grid.cells();
    let mut img = RgbaImage::new(edge, edge);
    let row_bytes = edge as usize * 4;

    img.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(py, row)| {
            let cy = py / scale as usize;
            for (px, out) in row.chunks_exact_mut(4).enumerate() {
                let cx = px / scale as usize;
                out.copy_from_slice(&cells[cy * size + cx].to_pixel().0);
            }
        });

    Ok(img)
}

pub fn to_png_bytes(grid: &PixelGrid, scale: u32) -> Result<Vec<u8>, ExportError> {
    let img = rasterize(grid, scale)?;
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(bytes)
}

pub fn to_png_data_uri(grid: &PixelGrid, scale: u32) -> Result<String, ExportError> {
    let bytes = to_png_bytes(grid, scale)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

/// Wrap a PNG data URI in Markdown image syntax or an HTML `<img>` tag.
pub fn to_embedded_image_markup(
    grid: &PixelGrid,
    scale: u32,
    style: MarkupStyle,
) -> Result<String, ExportError> {
    let uri = to_png_data_uri(grid, scale)?;
    Ok(match style {
        MarkupStyle::Markdown => format!("![{IMAGE_ALT_TEXT}]({uri})"),
        MarkupStyle::Html => {
            let edge = grid.size() * scale.max(1);
            format!(r#"<img src="{uri}" width="{edge}" height="{edge}" alt="{IMAGE_ALT_TEXT}"/>"#)
        }
    })
}

// ---------------------------------------------------------------------------
//  Block art
// ---------------------------------------------------------------------------

/// Fenced code block, one line per row: `⬛` painted, `⬜` empty.
pub fn to_block_art(grid: &PixelGrid) -> String {
    let size = grid.size() as usize;
    let mut out = String::from("```\n");
    for row in grid.cells().chunks(size) {
        for cell in row {
            out.push(if cell.is_transparent() { '⬜' } else { '⬛' });
        }
        out.push('\n');
    }
    out.push_str("```");
    out
}
