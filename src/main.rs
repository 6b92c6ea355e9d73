mod app;
mod chart;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use app::RustyEdaApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config::WINDOW_TITLE)
            .with_inner_size(config::WINDOW_SIZE)
            .with_min_inner_size(config::WINDOW_MIN_SIZE)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        config::WINDOW_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(RustyEdaApp::default()))),
    )
}
