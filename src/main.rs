mod app;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::PriceAnalyzerApp;
use price_analyzer::config::Cli;
use price_analyzer::data::dashboard::Dashboard;
use price_analyzer::data::loader::load_file;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // The dataset is loaded once; failing to load it is fatal.
    let dataset = load_file(&cli.data, &cli.column_mapping())
        .with_context(|| format!("loading sale data from {}", cli.data.display()))
        .inspect_err(|e| log::error!("Failed to load dataset: {e:#}"))?;

    log::info!(
        "Loaded {} sale records from {}",
        dataset.len(),
        cli.data.display()
    );

    let state = AppState::new(Dashboard::new(Arc::new(dataset)), cli.header_image);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Price Analyzer",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the header image.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(PriceAnalyzerApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running the UI: {e}"))
}
