use std::collections::VecDeque;

use crate::canvas::{Color, PixelGrid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Paint,
    Erase,
    Fill,
    ColorPick,
    Select,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Paint => "Paint",
            Tool::Erase => "Erase",
            Tool::Fill => "Fill",
            Tool::ColorPick => "Color Picker",
            Tool::Select => "Select",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Paint, Tool::Erase, Tool::Fill, Tool::ColorPick, Tool::Select]
    }
}

/// Active tool, color and brush size. Read on every pointer event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrushState {
    pub tool: Tool,
    pub color: Color,
    brush_size: u32,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            tool: Tool::Paint,
            color: Color::BLACK,
            brush_size: 1,
        }
    }
}

impl BrushState {
    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    /// Sizes below 1 are treated as 1.
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.max(1);
    }

    /// Color written by the current tool: erase paints the sentinel.
    pub fn stroke_color(&self) -> Color {
        match self.tool {
            Tool::Erase => Color::Transparent,
            _ => self.color,
        }
    }
}

// ============================================================================
// BRUSH
// ============================================================================

/// In-bounds cells covered by a square brush of side `brush_size` centered
/// on `(center_x, center_y)`.
///
/// The square starts `brush_size / 2` cells before the center, so odd sizes
/// are symmetric and even sizes lean one cell toward the top-left. The
/// square is clipped to the grid before it is walked, so any brush size
/// costs at most one pass over the grid.
pub fn footprint(
    grid: &PixelGrid,
    center_x: i32,
    center_y: i32,
    brush_size: u32,
) -> impl Iterator<Item = (i32, i32)> + use<> {
    let n = brush_size.max(1) as i64;
    let edge = grid.size() as i64;
    let clip = |center: i32| {
        let start = center as i64 - n / 2;
        let lo = start.clamp(0, edge) as i32;
        let hi = (start + n).clamp(0, edge) as i32;
        lo..hi
    };
    let xs = clip(center_x);
    let ys = clip(center_y);
    ys.flat_map(move |y| xs.clone().map(move |x| (x, y)))
}

/// Write `color` to every in-bounds footprint cell. Returns the number of
/// cells that actually changed. Does not touch history.
pub fn apply_brush(
    grid: &mut PixelGrid,
    center_x: i32,
    center_y: i32,
    brush_size: u32,
    color: Color,
) -> usize {
    footprint(grid, center_x, center_y, brush_size)
        .filter(|&(x, y)| grid.set(x, y, color))
        .count()
}

/// Erase is a brush application with the transparent sentinel.
pub fn erase(grid: &mut PixelGrid, center_x: i32, center_y: i32, brush_size: u32) -> usize {
    apply_brush(grid, center_x, center_y, brush_size, Color::Transparent)
}

/// Stamp the brush along the Bresenham line from `from` to `to` so a fast
/// pointer drag leaves no gaps. `from` itself is stamped too.
pub fn stroke_line(
    grid: &mut PixelGrid,
    from: (i32, i32),
    to: (i32, i32),
    brush_size: u32,
    color: Color,
) -> usize {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;
    let mut changed = 0;

    loop {
        changed += apply_brush(grid, x0, y0, brush_size, color);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }

    changed
}

// ============================================================================
// FLOOD FILL
// ============================================================================

/// Whether a fill at `(seed_x, seed_y)` would change anything. Used to skip
/// the history snapshot for no-op fills.
pub fn fill_would_change(grid: &PixelGrid, seed_x: i32, seed_y: i32, replacement: Color) -> bool {
    matches!(grid.get(seed_x, seed_y), Some(target) if target != replacement)
}

/// Breadth-first 4-connected flood fill. Repaints the component of cells
/// sharing the seed's color; returns the number of cells repainted.
///
/// No-op (returns 0) when the seed is out of bounds or already holds
/// `replacement`.
pub fn flood_fill(grid: &mut PixelGrid, seed_x: i32, seed_y: i32, replacement: Color) -> usize {
    let Some(target) = grid.get(seed_x, seed_y) else {
        return 0;
    };
    if target == replacement {
        return 0;
    }

    let size = grid.size() as usize;
    let mut visited = vec![false; size * size];
    let mut queue = VecDeque::new();
    let mut filled = 0;

    visited[seed_y as usize * size + seed_x as usize] = true;
    queue.push_back((seed_x, seed_y));

    while let Some((x, y)) = queue.pop_front() {
        // Re-checked at visit time; replacement never equals target so a
        // repainted cell can't match again.
        if grid.get(x, y) != Some(target) {
            continue;
        }
        grid.set(x, y, replacement);
        filled += 1;

        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            let vi = ny as usize * size + nx as usize;
            if visited[vi] {
                continue;
            }
            visited[vi] = true;
            if grid.get(nx, ny) == Some(target) {
                queue.push_back((nx, ny));
            }
        }
    }

    filled
}

// ============================================================================
// COLOR PICK
// ============================================================================

/// Read the cell under the cursor. Transparent and out-of-bounds cells give
/// `None` so the caller keeps its current color.
pub fn pick_color(grid: &PixelGrid, x: i32, y: i32) -> Option<Color> {
    grid.get(x, y).filter(|c| !c.is_transparent())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn cells(grid: &PixelGrid, x: i32, y: i32, size: u32) -> Vec<(i32, i32)> {
        footprint(grid, x, y, size).collect()
    }

    #[test]
    fn size_one_brush_touches_one_cell() {
        let grid = PixelGrid::new(8).unwrap();
        assert_eq!(cells(&grid, 3, 3, 1), vec![(3, 3)]);
        assert_eq!(cells(&grid, 3, 3, 0), vec![(3, 3)]);
    }

    #[test]
    fn odd_footprint_is_centered() {
        let grid = PixelGrid::new(16).unwrap();
        let cells = cells(&grid, 5, 5, 3);
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&(4, 4)));
        assert!(cells.contains(&(6, 6)));
        assert!(!cells.contains(&(7, 5)));
    }

    #[test]
    fn even_footprint_leans_top_left() {
        let grid = PixelGrid::new(16).unwrap();
        assert_eq!(cells(&grid, 5, 5, 2), vec![(4, 4), (5, 4), (4, 5), (5, 5)]);
        assert_eq!(cells(&grid, 5, 5, 4).len(), 16);
    }

    #[test]
    fn footprint_off_grid_is_empty() {
        let grid = PixelGrid::new(4).unwrap();
        assert!(cells(&grid, -10, 2, 3).is_empty());
        assert!(cells(&grid, 2, 50, 5).is_empty());
    }

    #[test]
    fn oversized_brush_covers_grid_once() {
        let mut grid = PixelGrid::new(16).unwrap();
        assert_eq!(cells(&grid, 3, 3, u32::MAX).len(), 256);
        assert_eq!(apply_brush(&mut grid, 3, 3, 70_000, RED), 256);
        assert_eq!(grid.opaque_count(), 256);
        assert_eq!(erase(&mut grid, 15, 0, u32::MAX), 256);
        assert!(grid.is_empty());
    }

    #[test]
    fn brush_clips_at_grid_edge() {
        let mut grid = PixelGrid::new(4).unwrap();
        let changed = apply_brush(&mut grid, 0, 0, 3, RED);
        assert_eq!(changed, 4);
        assert_eq!(grid.opaque_count(), 4);
        assert_eq!(grid.get(1, 1), Some(RED));
        assert_eq!(erase(&mut grid, 0, 0, 1), 1);
        assert_eq!(grid.get(0, 0), Some(Color::Transparent));
    }

    #[test]
    fn stroke_line_connects_cells() {
        let mut grid = PixelGrid::new(8).unwrap();
        stroke_line(&mut grid, (0, 0), (7, 3), 1, RED);
        assert_eq!(grid.get(0, 0), Some(RED));
        assert_eq!(grid.get(7, 3), Some(RED));
        // one cell per column for a shallow line
        for x in 0..8 {
            assert!((0..8).any(|y| grid.get(x, y) == Some(RED)), "gap at column {x}");
        }
    }

    #[test]
    fn fill_repaints_connected_region_only() {
        // Diagonal red cells at opposite corners of a white 5x5 grid.
        let mut grid = PixelGrid::new(5).unwrap();
        for (x, y, _) in grid.clone().iter() {
            grid.set(x, y, Color::WHITE);
        }
        grid.set(0, 0, RED);
        grid.set(4, 4, RED);

        assert_eq!(flood_fill(&mut grid, 0, 0, BLUE), 1);
        assert_eq!(grid.get(0, 0), Some(BLUE));
        assert_eq!(grid.get(4, 4), Some(RED));
    }

    #[test]
    fn fill_ignores_diagonal_neighbors() {
        let mut grid = PixelGrid::new(3).unwrap();
        // Wall of red cells splits the grid along the anti-diagonal.
        grid.set(1, 0, RED);
        grid.set(0, 1, RED);
        assert_eq!(flood_fill(&mut grid, 0, 0, BLUE), 1);
        assert_eq!(grid.get(1, 1), Some(Color::Transparent));
    }

    #[test]
    fn fill_is_idempotent() {
        let mut grid = PixelGrid::new(6).unwrap();
        grid.set(2, 0, RED);
        grid.set(2, 1, RED);
        grid.set(2, 2, RED);

        assert!(flood_fill(&mut grid, 0, 0, BLUE) > 0);
        let once = grid.clone();
        assert!(!fill_would_change(&grid, 0, 0, BLUE));
        assert_eq!(flood_fill(&mut grid, 0, 0, BLUE), 0);
        assert_eq!(grid, once);
    }

    #[test]
    fn fill_covers_whole_empty_grid_and_rejects_out_of_bounds() {
        let mut grid = PixelGrid::new(16).unwrap();
        assert_eq!(flood_fill(&mut grid, -1, 0, RED), 0);
        assert_eq!(flood_fill(&mut grid, 3, 3, RED), 256);
        assert_eq!(grid.opaque_count(), 256);
    }

    #[test]
    fn pick_color_skips_transparent_cells() {
        let mut grid = PixelGrid::new(2).unwrap();
        grid.set(1, 1, RED);
        assert_eq!(pick_color(&grid, 1, 1), Some(RED));
        assert_eq!(pick_color(&grid, 0, 0), None);
        assert_eq!(pick_color(&grid, 9, 9), None);
    }

    #[test]
    fn erase_tool_strokes_with_sentinel() {
        let mut brush = BrushState::default();
        brush.color = RED;
        assert_eq!(brush.stroke_color(), RED);
        brush.tool = Tool::Erase;
        assert_eq!(brush.stroke_color(), Color::Transparent);
        brush.set_brush_size(0);
        assert_eq!(brush.brush_size(), 1);
    }
}
