use anyhow::Context;
use eframe::egui;
use sketch_calc::gui::SketchApp;
use sketch_calc::settings::{Settings, SETTINGS_FILE};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)
        .context("load settings")?
        .with_env_overrides();
    sketch_calc::logging::init(settings.debug_logging, settings.log_file_path());
    tracing::info!(api_url = %settings.api_url, "starting sketch calculator");

    let app = SketchApp::new(settings.clone()).context("build sketch app")?;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_size.0, settings.window_size.1])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sketch Calc",
        native_options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow::anyhow!("run sketch window: {err}"))
}
