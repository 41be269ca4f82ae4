//! Workshop Forms - markdown workshops as fillable forms
//!
//! Workshop documents embed input markers; each one becomes a text field in
//! the rendered page, and responses are committed to a GitHub repository.

mod app;
mod core;
mod form;
mod session;
mod submit;
mod ui;

use app::WorkshopApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Workshop Forms...");

    // Submissions run here while egui owns the main thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let handle = runtime.handle().clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Workshop Forms"),
        ..Default::default()
    };

    eframe::run_native(
        "Workshop Forms",
        native_options,
        Box::new(move |cc| Ok(Box::new(WorkshopApp::new(cc, handle)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
    Ok(())
}
