use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use pixelfe::components::history::{DEFAULT_HISTORY_LIMIT, HistoryManager};
use pixelfe::components::tools::{self, Tool};
use pixelfe::ops::clipboard::RegionClipboard;
use pixelfe::ops::export;
use pixelfe::settings::EditorSettings;
use pixelfe::project::Shortcut;
use pixelfe::{Color, EditorState, PixelGrid};

const RED: Color = Color::rgb(255, 0, 0);

fn editor(size: u32) -> EditorState {
    let mut state = EditorState::new(EditorSettings::default()).unwrap();
    state.resize_grid(size).unwrap();
    state
}

fn click(state: &mut EditorState, x: i32, y: i32) {
    state.pointer_down(x, y);
    state.pointer_up(x, y);
}

#[test]
fn paint_export_undo_scenario() {
    let mut state = editor(4);
    state.select_tool(Tool::Paint);
    state.set_color("red".parse().unwrap());
    click(&mut state, 1, 1);
    click(&mut state, 2, 2);

    let svg = export::to_svg(&state.grid, 1);
    assert_eq!(svg.matches("<rect").count(), 2);
    assert!(svg.contains(r##"x="1" y="1" width="1" height="1" fill="#ff0000""##));
    assert!(svg.contains(r##"x="2" y="2" width="1" height="1" fill="#ff0000""##));

    assert!(state.undo());
    let svg = export::to_svg(&state.grid, 1);
    assert_eq!(svg.matches("<rect").count(), 1);
    assert!(svg.contains(r#"x="1" y="1""#));

    assert!(state.undo());
    assert_eq!(export::to_svg(&state.grid, 1).matches("<rect").count(), 0);
    assert!(!state.undo());
}

#[test]
fn every_in_bounds_cell_stays_defined() {
    let mut state = editor(16);
    state.set_color(RED);
    state.set_brush_size(5);
    click(&mut state, 0, 0);
    click(&mut state, 15, 15);
    state.select_tool(Tool::Fill);
    state.set_color(Color::rgb(0, 0, 255));
    click(&mut state, 8, 8);
    state.select_tool(Tool::Select);
    state.pointer_down(-5, -5);
    state.pointer_up(3, 3);
    assert_eq!(state.clipboard.latest().map(|s| (s.width, s.height)), Some((4, 4)));

    // paste blocks that hang off the bottom-right and top-left edges
    for (x, y) in [(15, 15), (0, 0)] {
        state.key_down(Shortcut::Paste);
        state.pointer_move(x, y);
        state.pointer_down(x, y);
        assert!(!state.clipboard.is_pasting());
    }
    assert_eq!(state.grid.size(), 16);
    assert_eq!(state.grid.cells().len(), 256);

    for y in 0..16 {
        for x in 0..16 {
            assert!(state.grid.get(x, y).is_some());
        }
    }
    assert_eq!(state.grid.get(16, 0), None);
    assert_eq!(state.grid.get(-1, 3), None);
}

#[test]
fn fill_stays_inside_its_component() {
    let mut grid = PixelGrid::new(5).unwrap();
    for y in 0..5 {
        for x in 0..5 {
            grid.set(x, y, Color::WHITE);
        }
    }
    grid.set(0, 0, RED);
    grid.set(4, 4, RED);

    let blue = Color::rgb(0, 0, 255);
    assert_eq!(tools::flood_fill(&mut grid, 0, 0, blue), 1);
    assert_eq!(grid.get(0, 0), Some(blue));
    assert_eq!(grid.get(4, 4), Some(RED));
    // second fill with the same color changes nothing
    let before = grid.clone();
    assert_eq!(tools::flood_fill(&mut grid, 0, 0, blue), 0);
    assert_eq!(grid, before);
}

#[test]
fn undo_redo_round_trip_across_operations() {
    let mut grid = PixelGrid::new(8).unwrap();
    let mut history = HistoryManager::default();

    let ops: Vec<Box<dyn Fn(&mut PixelGrid)>> = vec![
        Box::new(|g: &mut PixelGrid| {
            tools::apply_brush(g, 3, 3, 3, RED);
        }),
        Box::new(|g: &mut PixelGrid| {
            tools::flood_fill(g, 0, 0, Color::WHITE);
        }),
        Box::new(|g: &mut PixelGrid| {
            tools::erase(g, 3, 3, 2);
        }),
        Box::new(|g: &mut PixelGrid| g.clear()),
    ];

    for op in &ops {
        let before = grid.clone();
        history.snapshot(&grid);
        op(&mut grid);
        let after = grid.clone();

        assert!(history.undo(&mut grid));
        assert_eq!(grid, before);
        assert!(history.redo(&mut grid));
        assert_eq!(grid, after);
    }
}

#[test]
fn history_keeps_last_fifty_snapshots() {
    let mut state = editor(8);
    assert_eq!(state.history.max_history_size(), DEFAULT_HISTORY_LIMIT);
    state.set_color(RED);

    // 60 single-cell strokes, each on a fresh cell
    for i in 0..60 {
        click(&mut state, i % 8, i / 8);
    }
    assert_eq!(state.history.undo_count(), 50);

    let mut undone = 0;
    while state.undo() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    // the ten oldest strokes can no longer be undone
    assert_eq!(state.grid.opaque_count(), 10);
    assert_eq!(state.grid.get(1, 1), Some(RED));
    assert_eq!(state.grid.get(2, 1), Some(Color::Transparent));
}

#[test]
fn clipboard_ring_keeps_last_eight() {
    let mut grid = PixelGrid::new(16).unwrap();
    grid.set(0, 0, RED);
    let mut clipboard = RegionClipboard::default();

    let ids: Vec<_> = (1..=9)
        .map(|i| clipboard.copy(&grid, 0, 0, i, i).unwrap().id)
        .collect();

    assert_eq!(clipboard.slots().len(), 8);
    assert_eq!(clipboard.slot(0).unwrap().id, ids[1]);
    assert_eq!(clipboard.slot(7).unwrap().id, ids[8]);
    assert_eq!(clipboard.latest().unwrap().id, ids[8]);
}

#[test]
fn export_shapes_match_grid() {
    let mut grid = PixelGrid::new(16).unwrap();
    let painted = [(0, 0), (5, 3), (15, 15), (7, 7), (7, 8)];
    for (x, y) in painted {
        grid.set(x, y, Color::rgb(10, 200, 30));
    }

    let svg = export::to_svg(&grid, 4);
    assert_eq!(svg.matches("<rect").count(), painted.len());

    let uri = export::to_png_data_uri(&grid, 3).unwrap();
    let b64 = uri.strip_prefix("data:image/png;base64,").unwrap();
    let img = image::load_from_memory(&STANDARD.decode(b64).unwrap()).unwrap();
    assert_eq!((img.width(), img.height()), (48, 48));
}
