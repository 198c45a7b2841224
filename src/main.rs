// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

mod gui;
mod log_panel;
mod render;

use eframe::egui;
use std::path::PathBuf;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    // Geometry files given on the command line are loaded at startup.
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PV String Tracker",
        options,
        Box::new(move |cc| Ok(Box::new(gui::TrackerApp::new(cc, paths)))),
    )
}
