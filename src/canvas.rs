use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Grid sizes offered by the size selector.
pub const GRID_SIZES: [u32; 5] = [16, 32, 48, 64, 128];

/// Hard upper bound on a grid edge, regardless of where the size came from.
pub const MAX_GRID_SIZE: u32 = 512;

// ============================================================================
// COLOR
// ============================================================================

/// A single cell value: either a concrete RGBA color or the transparent
/// sentinel.
///
/// Every boundary that produces a color (parsing, import, paste, color pick)
/// goes through [`Color::rgba`] or [`Color::from_str`], both of which fold
/// "no color" spellings into [`Color::Transparent`]. An `Rgba` value with
/// alpha 0 never exists, so `==` is the only comparison anyone needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Color {
    #[default]
    Transparent,
    Rgba([u8; 4]),
}

impl Color {
    pub const BLACK: Color = Color::Rgba([0, 0, 0, 255]);
    pub const WHITE: Color = Color::Rgba([255, 255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgba([r, g, b, 255])
    }

    /// Normalizing constructor: alpha 0 collapses to the sentinel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        if a == 0 {
            Color::Transparent
        } else {
            Color::Rgba([r, g, b, a])
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Color::Transparent)
    }

    pub fn alpha(&self) -> u8 {
        match self {
            Color::Transparent => 0,
            Color::Rgba(c) => c[3],
        }
    }

    /// `#rrggbb`, or `#rrggbbaa` when partially transparent. The sentinel
    /// renders as `transparent`.
    pub fn to_hex(&self) -> String {
        match self {
            Color::Transparent => "transparent".to_string(),
            Color::Rgba([r, g, b, 255]) => format!("#{:02x}{:02x}{:02x}", r, g, b),
            Color::Rgba([r, g, b, a]) => format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a),
        }
    }

    /// `#rrggbb` without the alpha channel (used where alpha is carried
    /// separately, e.g. SVG `fill-opacity`).
    pub fn to_rgb_hex(&self) -> Option<String> {
        match self {
            Color::Transparent => None,
            Color::Rgba([r, g, b, _]) => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
        }
    }

    pub fn to_pixel(&self) -> Rgba<u8> {
        match self {
            Color::Transparent => Rgba([0, 0, 0, 0]),
            Color::Rgba(c) => Rgba(*c),
        }
    }

    pub fn from_pixel(p: Rgba<u8>) -> Self {
        let [r, g, b, a] = p.0;
        Color::rgba(r, g, b, a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}'")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts `""`, `transparent`, `none`, `#rgb`, `#rgba`, `#rrggbb`,
    /// `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and a handful of CSS
    /// color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        let err = || ParseColorError(s.to_string());

        match lower.as_str() {
            "" | "transparent" | "none" => return Ok(Color::Transparent),
            "black" => return Ok(Color::BLACK),
            "white" => return Ok(Color::WHITE),
            "red" => return Ok(Color::rgb(255, 0, 0)),
            "lime" => return Ok(Color::rgb(0, 255, 0)),
            "green" => return Ok(Color::rgb(0, 128, 0)),
            "blue" => return Ok(Color::rgb(0, 0, 255)),
            "yellow" => return Ok(Color::rgb(255, 255, 0)),
            _ => {}
        }

        if let Some(hex) = lower.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(err());
            }
            let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            return match hex.len() {
                3 => Ok(Color::rgb(
                    nib(0).map_err(|_| err())?,
                    nib(1).map_err(|_| err())?,
                    nib(2).map_err(|_| err())?,
                )),
                4 => Ok(Color::rgba(
                    nib(0).map_err(|_| err())?,
                    nib(1).map_err(|_| err())?,
                    nib(2).map_err(|_| err())?,
                    nib(3).map_err(|_| err())?,
                )),
                6 => Ok(Color::rgb(
                    byte(0).map_err(|_| err())?,
                    byte(2).map_err(|_| err())?,
                    byte(4).map_err(|_| err())?,
                )),
                8 => Ok(Color::rgba(
                    byte(0).map_err(|_| err())?,
                    byte(2).map_err(|_| err())?,
                    byte(4).map_err(|_| err())?,
                    byte(6).map_err(|_| err())?,
                )),
                _ => Err(err()),
            };
        }

        // rgb(...) / rgba(...) functional notation
        let inner = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(err());
        }
        let channel = |p: &str| p.parse::<u8>().map_err(|_| err());
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = match parts.get(3) {
            // CSS alpha is 0.0-1.0
            Some(p) => {
                let v: f32 = p.parse().map_err(|_| err())?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(err());
                }
                (v * 255.0).round() as u8
            }
            None => 255,
        };
        Ok(Color::rgba(r, g, b, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

// ============================================================================
// PIXEL GRID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid size {0} is out of range (1..=512)")]
    InvalidSize(u32),
}

/// Square grid of cells, row-major. `cells.len() == size * size` always
/// holds; there is no "absent" cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    size: u32,
    cells: Vec<Color>,
}

impl PixelGrid {
    pub fn new(size: u32) -> Result<Self, GridError> {
        validate_size(size)?;
        Ok(Self {
            size,
            cells: vec![Color::Transparent; (size * size) as usize],
        })
    }

    /// Rebuild a grid from a flat row-major cell list (history restore).
    pub fn from_cells(size: u32, cells: Vec<Color>) -> Result<Self, GridError> {
        validate_size(size)?;
        if cells.len() != (size * size) as usize {
            return Err(GridError::InvalidSize(size));
        }
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    /// Replace the grid with a fresh all-transparent `new_size` grid.
    /// History and paste invalidation is the owner's job (see
    /// `EditorState::resize_grid`).
    pub fn resize(&mut self, new_size: u32) -> Result<(), GridError> {
        validate_size(new_size)?;
        self.size = new_size;
        self.cells = vec![Color::Transparent; (new_size * new_size) as usize];
        Ok(())
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.size && (y as u32) < self.size
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.size as usize + x as usize)
        } else {
            None
        }
    }

    /// `None` when `(x, y)` is outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Out-of-bounds writes are dropped. Returns whether the cell changed.
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        match self.index(x, y) {
            Some(i) if self.cells[i] != color => {
                self.cells[i] = color;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Color::Transparent);
    }

    /// Overwrite every cell from a snapshot, adopting its size.
    pub fn restore(&mut self, size: u32, cells: &[Color]) {
        if cells.len() != (size * size) as usize {
            log::error!(
                "PixelGrid::restore: {} cells do not fit a {}x{} grid",
                cells.len(),
                size,
                size
            );
            return;
        }
        self.size = size;
        self.cells.clear();
        self.cells.extend_from_slice(cells);
    }

    /// Iterate `(x, y, color)` over every cell, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Color)> + '_ {
        let size = self.size as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| ((i % size) as i32, (i / size) as i32, *c))
    }

    pub fn opaque_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_transparent()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Color::is_transparent)
    }
}

fn validate_size(size: u32) -> Result<(), GridError> {
    if size == 0 || size > MAX_GRID_SIZE {
        Err(GridError::InvalidSize(size))
    } else {
        Ok(())
    }
}
