//! End-to-end behaviour of the chart state, driven through the public API.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use chart_studio::data::loader::{load_file, sample_rows};
use chart_studio::{
    CellValue, ChartError, ChartState, CodecOptions, ImageFormat, LineInterpolation, LoadOutcome,
    RenderPlan, SnapshotRenderer, TabularDataset, TextCodec, ThemeCatalog,
};

fn sample_state() -> ChartState {
    let mut state = ChartState::default();
    state.load_rows(sample_rows().unwrap()).unwrap();
    state
}

#[test]
fn first_load_selects_all_value_columns() {
    let state = sample_state();
    let ds = state.dataset().unwrap();
    assert_eq!(ds.columns(), ["date", "revenue", "expenses", "profit"]);
    assert_eq!(ds.len(), 12);
    assert_eq!(state.selection().selected(), ["revenue", "expenses", "profit"]);
}

#[test]
fn toggling_off_reindexes_colors() {
    let mut state = sample_state();
    state.toggle_column("expenses").unwrap();
    assert_eq!(state.selection().selected(), ["revenue", "profit"]);

    let plan = state.current_render_plan().unwrap();
    let theme = ThemeCatalog::get("default");
    assert_eq!(plan.series.len(), 2);
    assert_eq!(plan.series[0].color, theme.colors[0]);
    assert_eq!(plan.series[1].column, "profit");
    assert_eq!(plan.series[1].color, theme.colors[1]);
}

#[test]
fn replacement_without_survivors_falls_back() {
    let mut state = sample_state();
    state.toggle_column("expenses").unwrap();

    let mut row = serde_json::Map::new();
    row.insert("date".into(), "2024-01".into());
    row.insert("margin".into(), 0.25.into());
    state.load_rows(vec![row]).unwrap();

    assert_eq!(state.selection().selected(), ["margin"]);
}

#[test]
fn free_text_with_blank_cells() {
    let mut state = ChartState::default();
    state.apply_text("date,a,b\n2023-01,5,\n2023-02,,7").unwrap();

    let ds = state.dataset().unwrap();
    assert_eq!(ds.columns(), ["date", "a", "b"]);
    assert_eq!(ds.cell(0, "date"), Some(&CellValue::Text("2023-01".into())));
    assert_eq!(ds.cell(0, "a"), Some(&CellValue::Number(5.0)));
    assert_eq!(ds.cell(0, "b"), Some(&CellValue::Null));
    assert_eq!(ds.cell(1, "a"), Some(&CellValue::Null));
    assert_eq!(ds.cell(1, "b"), Some(&CellValue::Number(7.0)));
}

#[test]
fn unknown_toggle_leaves_selection() {
    let mut state = ChartState::default();
    state.apply_text("date,revenue\n2023-01,1").unwrap();
    let err = state.toggle_column("nonexistent").unwrap_err();
    assert!(matches!(err, ChartError::UnknownColumn(c) if c == "nonexistent"));
    assert_eq!(state.selection().selected(), ["revenue"]);
}

#[test]
fn unknown_theme_resolves_to_default() {
    let mut state = sample_state();
    state.configure(|c| c.set_theme("dark"));
    state.configure(|c| c.set_theme("neon"));
    assert_eq!(state.config().theme(), "default");
    assert_eq!(state.current_render_plan().unwrap().theme, "default");
}

#[test]
fn text_roundtrip_preserves_quoted_fields() {
    let text = "name,note,value\nwidget,\"says \"\"hi\"\", twice\",3\ngadget,\"two\nlines\",";
    let codec = TextCodec::default();
    let ds = codec.parse_text(text).unwrap();
    let again = codec.parse_text(&codec.serialize(&ds).unwrap()).unwrap();
    assert_eq!(ds, again);
    assert_eq!(ds.cell(1, "note"), Some(&CellValue::Text("two\nlines".into())));
}

#[test]
fn plan_building_does_not_touch_state() {
    let mut state = sample_state();
    state.configure(|c| c.set_line_interpolation("step"));
    let before = state.current_render_plan().cloned();
    let text = state.source_text().unwrap();

    for _ in 0..3 {
        assert_eq!(state.current_render_plan().cloned(), before);
    }
    assert_eq!(state.source_text().unwrap(), text);
    assert!(
        before
            .unwrap()
            .series
            .iter()
            .all(|s| s.interpolation == LineInterpolation::Step)
    );
}

#[test]
fn only_latest_load_applies() {
    let mut state = ChartState::default();
    let slow = state.begin_load();
    let fast = state.begin_load();

    let fast_ds = TabularDataset::from_rows(sample_rows().unwrap()).unwrap();
    assert_eq!(state.finish_load(fast, Ok(fast_ds)).unwrap(), LoadOutcome::Applied);

    let slow_ds = TextCodec::default().parse_text("x,y\n1,2").unwrap();
    assert_eq!(state.finish_load(slow, Ok(slow_ds)).unwrap(), LoadOutcome::Stale);
    assert_eq!(state.dataset().unwrap().len(), 12);
}

#[test]
fn listeners_see_every_plan_change() {
    let calls = Rc::new(Cell::new(0));
    let mut state = ChartState::default();
    let counter = Rc::clone(&calls);
    state.subscribe(move |_: &RenderPlan| counter.set(counter.get() + 1));

    state.load_rows(sample_rows().unwrap()).unwrap();
    state.toggle_column("profit").unwrap();
    state.configure(|c| c.set_show_points(false));
    state.edit_cell(0, "revenue", "1").unwrap();
    assert_eq!(calls.get(), 4);
}

#[test]
fn loads_files_by_extension() {
    let mut csv = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
    csv.write_all(b"date\tsales\n2023-01\t5\n").unwrap();
    let ds = load_file(csv.path(), CodecOptions::default()).unwrap();
    assert_eq!(ds.columns(), ["date", "sales"]);

    let mut other = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    other.write_all(b"binary").unwrap();
    assert!(load_file(other.path(), CodecOptions::default()).is_err());
}

#[derive(Default)]
struct CountingRenderer {
    formats: Vec<ImageFormat>,
}

impl SnapshotRenderer for CountingRenderer {
    fn request_snapshot(&mut self, format: ImageFormat, _plan: &RenderPlan) -> anyhow::Result<()> {
        self.formats.push(format);
        Ok(())
    }
}

#[test]
fn exports_read_current_state() {
    let state = sample_state();
    let csv = state.export_csv().unwrap();
    assert!(csv.starts_with("date,revenue,expenses,profit\n2023-01,45000,32000,13000\n"));
    assert!(!csv.ends_with('\n'));

    let mut renderer = CountingRenderer::default();
    assert_eq!(state.export_image("svg", &mut renderer).unwrap(), ImageFormat::Svg);
    assert!(state.export_image("gif", &mut renderer).is_err());
    assert_eq!(renderer.formats, [ImageFormat::Svg]);
}
