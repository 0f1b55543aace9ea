mod app;
mod cli;
mod ui;

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;

use app::ChartStudioApp;
use chart_studio::{ChartState, TextCodec};
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let codec = TextCodec::new(cli.codec_options()?);
    let state = ChartState::new(cli.chart_config(), codec);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Chart Studio",
        options,
        Box::new(move |cc| Ok(Box::new(ChartStudioApp::new(cc, state, cli.data)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
