mod app;
mod state;
mod ui;

use app::ExtractorApp;
use eframe::egui;
use radiomics_batch::settings::ExtractorSettings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = ExtractorSettings::from_env().unwrap_or_else(|e| {
        log::error!("Ignoring settings file: {e:#}");
        ExtractorSettings::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Radiomics Feature Extractor",
        options,
        Box::new(|_cc| Ok(Box::new(ExtractorApp::new(settings)))),
    )
}
