use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context, Result};
use eframe::egui;

use chart_studio::data::loader::{load_file, sample_rows};
use chart_studio::plan::RenderPlan;
use chart_studio::svg::render_svg;
use chart_studio::{
    ChartResult, ChartState, ImageFormat, LoadOutcome, LoadTicket, SnapshotRenderer,
    TabularDataset, export_file_name,
};

use crate::ui::{Command, Tab, UiState, panels, plot, table};

/// SVG size when the chart has not been laid out yet.
const DEFAULT_SVG_SIZE: egui::Vec2 = egui::vec2(960.0, 540.0);

/// A dataset load running on a worker thread.
struct PendingLoad {
    ticket: LoadTicket,
    rx: Receiver<ChartResult<TabularDataset>>,
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ChartStudioApp {
    pub state: ChartState,
    view: UiState,
    loads: Vec<PendingLoad>,
    /// Destination of a PNG snapshot waiting for the next screenshot.
    pending_png: Option<PathBuf>,
}

impl ChartStudioApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut state: ChartState, data: Option<PathBuf>) -> Self {
        state.subscribe(|plan| {
            log::debug!(
                "Render plan updated: {} series, theme {}",
                plan.series.len(),
                plan.theme
            );
        });

        let mut app = Self {
            state,
            view: UiState::default(),
            loads: Vec::new(),
            pending_png: None,
        };
        match data {
            Some(path) => app.open_path(&path),
            None => app.load_sample(&cc.egui_ctx),
        }
        app
    }

    // -- Loading --

    /// Fetch the sample dataset off the UI thread.
    fn load_sample(&mut self, ctx: &egui::Context) {
        let ticket = self.state.begin_load();
        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = sample_rows().and_then(TabularDataset::from_rows);
            if tx.send(result).is_err() {
                log::debug!("Sample load finished after the app went away");
            }
            ctx.request_repaint();
        });
        self.loads.push(PendingLoad { ticket, rx });
    }

    fn poll_loads(&mut self) {
        let state = &mut self.state;
        self.loads.retain(|load| match load.rx.try_recv() {
            Ok(result) => {
                match state.finish_load(load.ticket, result) {
                    Ok(LoadOutcome::Applied) => log::info!("Sample data loaded"),
                    Ok(LoadOutcome::Stale) => {}
                    Err(e) => log::error!("Failed to load sample data: {e}"),
                }
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                log::error!("Load worker exited without a result");
                state.loading = false;
                false
            }
        });
    }

    fn open_file_dialog(&mut self) {
        let file = rfd::FileDialog::new()
            .set_title("Open dataset")
            .add_filter("Supported files", &["json", "csv", "txt", "tsv"])
            .add_filter("JSON", &["json"])
            .add_filter("CSV", &["csv", "txt"])
            .add_filter("TSV", &["tsv"])
            .pick_file();

        if let Some(path) = file {
            self.open_path(&path);
        }
    }

    fn open_path(&mut self, path: &Path) {
        // A newer load makes any sample fetch in flight stale.
        let ticket = self.state.begin_load();
        match load_file(path, self.state.codec().options()) {
            Ok(dataset) => {
                if let Err(e) = self.state.finish_load(ticket, Ok(dataset)) {
                    log::error!("Failed to apply {}: {e}", path.display());
                }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
                self.state.loading = false;
            }
        }
    }

    // -- Commands --

    fn run_command(&mut self, ctx: &egui::Context, command: Command) {
        let result = match command {
            Command::OpenFile => {
                self.open_file_dialog();
                Ok(())
            }
            Command::LoadSample => {
                self.load_sample(ctx);
                Ok(())
            }
            Command::ExportCsv => self.export_csv(),
            Command::ExportImage(format) => self.export_image(ctx, format),
        };
        if let Err(e) = result {
            log::error!("{e:#}");
            self.state.status_message = Some(format!("Error: {e:#}"));
        }
    }

    fn export_csv(&mut self) -> Result<()> {
        let text = self.state.export_csv()?;
        let name = export_file_name(&self.state.config().title, "csv");
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&name)
            .add_filter("CSV", &["csv"])
            .save_file()
        else {
            return Ok(());
        };
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved CSV to {}", path.display());
        Ok(())
    }

    fn export_image(&mut self, ctx: &egui::Context, format: ImageFormat) -> Result<()> {
        // Snapshots are taken of the chart, so make sure it is on screen.
        self.view.tab = Tab::Chart;
        let mut renderer = EguiSnapshot {
            ctx,
            chart_rect: self.view.chart_rect,
            pending_png: &mut self.pending_png,
        };
        self.state.export_image(format.extension(), &mut renderer)?;
        Ok(())
    }

    /// Save the chart area of any screenshot that arrived this frame.
    fn handle_screenshots(&mut self, ctx: &egui::Context) {
        let shots: Vec<Arc<egui::ColorImage>> = ctx.input(|i| {
            i.raw
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Screenshot { image, .. } => Some(Arc::clone(image)),
                    _ => None,
                })
                .collect()
        });

        for shot in shots {
            let Some(path) = self.pending_png.take() else {
                continue;
            };
            let cropped = match self.view.chart_rect {
                Some(rect) => shot.region(&rect, Some(ctx.pixels_per_point())),
                None => (*shot).clone(),
            };
            match save_png(&path, &cropped) {
                Ok(()) => log::info!("Saved PNG to {}", path.display()),
                Err(e) => {
                    log::error!("{e:#}");
                    self.state.status_message = Some(format!("Error: {e:#}"));
                }
            }
        }
    }
}

impl eframe::App for ChartStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loads();
        self.handle_screenshots(ctx);

        let mut command = None;

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            command = panels::top_bar(ui, &self.state, &mut self.view);
        });

        // ---- Left side panel: chart options ----
        egui::SidePanel::left("options_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart or data editors ----
        egui::CentralPanel::default().show(ctx, |ui| match self.view.tab {
            Tab::Chart => plot::chart(ui, &self.state, &mut self.view),
            Tab::Spreadsheet => table::spreadsheet(ui, &mut self.state, &mut self.view),
            Tab::Text => table::text_editor(ui, &mut self.state, &mut self.view),
        });

        if let Some(command) = command {
            self.run_command(ctx, command);
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Snapshot capability of the egui chart view.
///
/// PNG goes through a viewport screenshot that arrives on a later frame;
/// SVG is drawn straight from the plan.
struct EguiSnapshot<'a> {
    ctx: &'a egui::Context,
    chart_rect: Option<egui::Rect>,
    pending_png: &'a mut Option<PathBuf>,
}

impl SnapshotRenderer for EguiSnapshot<'_> {
    fn request_snapshot(&mut self, format: ImageFormat, plan: &RenderPlan) -> Result<()> {
        let name = export_file_name(&plan.title, format.extension());
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&name)
            .add_filter(format.as_str(), &[format.extension()])
            .save_file()
        else {
            log::debug!("{format} export cancelled");
            return Ok(());
        };

        match format {
            ImageFormat::Png => {
                *self.pending_png = Some(path);
                self.ctx
                    .send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            }
            ImageFormat::Svg => {
                let size = self.chart_rect.map_or(DEFAULT_SVG_SIZE, |r| r.size());
                let svg = render_svg(plan, size.x.round() as u32, size.y.round() as u32);
                std::fs::write(&path, svg)
                    .with_context(|| format!("writing {}", path.display()))?;
                log::info!("Saved SVG to {}", path.display());
            }
        }
        Ok(())
    }
}

fn save_png(path: &Path, shot: &egui::ColorImage) -> Result<()> {
    let [width, height] = shot.size;
    let bytes: Vec<u8> = shot.pixels.iter().flat_map(|c| c.to_array()).collect();
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, bytes)
        .context("screenshot buffer does not match its size")?;
    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
