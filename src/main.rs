mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::OlympicDashApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env()?;
    log::info!("Using configuration {config:?}");

    // Loaded once; the dataset lives until the process exits.
    let dataset = data::loader::load_cached(&config.data_path)
        .inspect_err(|e| log::error!("Failed to load dataset: {e}"))
        .with_context(|| format!("loading {}", config.data_path.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Olympic Athlete Data Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(OlympicDashApp::new(dataset, config.preview_rows)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
