#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use rust_timeline_app::app::TimelineApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Optional dataset file as the first argument
    let dataset_path = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Rust Timeline App"),
        ..Default::default()
    };

    eframe::run_native(
        "Rust Timeline App",
        options,
        Box::new(move |cc| Ok(Box::new(TimelineApp::new(cc, dataset_path)?))),
    )
}
