use pixelfe::Color;
use pixelfe::components::colors::{ColorPalette, CUSTOM_PALETTE_KEY, RECENT_COLORS_KEY};
use pixelfe::io::{self, ExportFormat};
use pixelfe::jmh;
use pixelfe::storage::{FileStore, KeyValueStore};
use pixelfe::{EditorState, PixelGrid};
use pixelfe::settings::EditorSettings;

#[test]
fn palette_survives_restart_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut palette = ColorPalette::default();
    palette.push_recent(Color::rgb(255, 0, 0));
    palette.push_recent(Color::rgb(0, 255, 0));
    palette.add_custom(Color::rgb(1, 2, 3));
    let mut store = FileStore::open(&path);
    palette.save(&mut store).unwrap();

    let reopened = FileStore::open(&path);
    assert!(reopened.get(RECENT_COLORS_KEY).is_some());
    assert!(reopened.get(CUSTOM_PALETTE_KEY).is_some());

    let mut restored = ColorPalette::default();
    restored.load(&reopened);
    assert_eq!(restored.recent(), palette.recent());
    assert_eq!(restored.custom(), &[Color::rgb(1, 2, 3)]);
}

#[test]
fn exported_png_imports_back_into_editor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.png");

    let mut grid = PixelGrid::new(16).unwrap();
    grid.set(3, 4, Color::rgb(12, 34, 56));
    grid.set(15, 0, Color::WHITE);
    io::write_export(&path, ExportFormat::Png, &grid, 1).unwrap();

    let mut state = EditorState::new(EditorSettings::default()).unwrap();
    state.resize_grid(16).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(state.import_image_bytes(&bytes));
    assert_eq!(state.grid, grid);
}

#[test]
fn text_exports_land_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut grid = PixelGrid::new(2).unwrap();
    grid.set(0, 1, Color::BLACK);

    let blocks = dir.path().join("art.txt");
    io::write_export(&blocks, ExportFormat::Blocks, &grid, 1).unwrap();
    assert_eq!(std::fs::read_to_string(&blocks).unwrap(), "```\n⬜⬜\n⬛⬜\n```");

    let md = dir.path().join("art.md");
    io::write_export(&md, ExportFormat::Markdown, &grid, 1).unwrap();
    assert!(std::fs::read_to_string(&md).unwrap().starts_with("![pixel-logo](data:image/png;base64,"));
}

#[test]
fn jmh_results_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    std::fs::write(
        &path,
        r#"[{"benchmark": "org.bench.Sorts.quick", "mode": "avgt", "threads": 1, "forks": 1,
             "primaryMetric": {"score": 42.0, "scoreError": "NaN", "scoreUnit": "us/op"},
             "params": {"n": "1000"}}]"#,
    )
    .unwrap();

    let records = jmh::load_results(&path).unwrap();
    let groups = jmh::group_by_class(&records);
    assert_eq!(groups[0].class_name, "Sorts");
    assert_eq!(groups[0].benchmarks[0].label(), "quick (1000)");

    std::fs::write(&path, "not json").unwrap();
    assert!(jmh::load_results(&path).is_err());
    assert!(jmh::load_results(&dir.path().join("missing.json")).is_err());
}
