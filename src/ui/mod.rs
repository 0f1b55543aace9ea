pub mod panels;
pub mod plot;
pub mod table;

use std::collections::HashMap;

use eframe::egui::{Color32, Rect};

use chart_studio::color::Rgb;
use chart_studio::{ChartState, ImageFormat, TabularDataset};

/// Actions the panels ask the app to run once the frame is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenFile,
    LoadSample,
    ExportCsv,
    ExportImage(ImageFormat),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Chart,
    Spreadsheet,
    Text,
}

/// View-only state: edit buffers, brush window, layout.
#[derive(Default)]
pub struct UiState {
    pub tab: Tab,

    /// Text editor buffer and the dataset revision it reflects.
    pub text_draft: String,
    text_revision: Option<u64>,

    /// Spreadsheet buffers, keyed by (row, column index).
    pub cell_drafts: HashMap<(usize, usize), String>,
    pub header_drafts: Vec<String>,
    drafts_revision: Option<u64>,

    /// Visible category window (first, last row index), inclusive.
    pub brush: Option<(usize, usize)>,
    /// Set when the brush moved and the plot bounds must follow.
    pub brush_dirty: bool,

    /// Screen area of the chart, for cropping PNG snapshots.
    pub chart_rect: Option<Rect>,
}

impl UiState {
    /// Reload the text buffer if the dataset changed elsewhere.
    pub fn sync_text(&mut self, state: &ChartState) {
        if self.text_revision == Some(state.revision()) {
            return;
        }
        self.text_draft = state.source_text().unwrap_or_else(|e| {
            log::error!("Failed to serialize dataset: {e}");
            String::new()
        });
        self.text_revision = Some(state.revision());
    }

    /// Discard the text buffer and show the dataset as it is.
    pub fn reload_text(&mut self, state: &ChartState) {
        self.text_revision = None;
        self.sync_text(state);
    }

    /// Mark the text buffer as matching the current revision.
    pub fn text_applied(&mut self, revision: u64) {
        self.text_revision = Some(revision);
    }

    /// Drop spreadsheet buffers if the dataset changed.
    pub fn sync_drafts(&mut self, revision: u64, dataset: &TabularDataset) {
        if self.drafts_revision == Some(revision) {
            return;
        }
        self.cell_drafts.clear();
        self.header_drafts = dataset.columns().to_vec();
        self.drafts_revision = Some(revision);
    }

    /// The brush window clamped to `n` categories.
    pub fn brush_window(&self, n: usize) -> (usize, usize) {
        let last = n.saturating_sub(1);
        match self.brush {
            Some((a, b)) => (a.min(last), b.min(last).max(a.min(last))),
            None => (0, last),
        }
    }
}

pub fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}
