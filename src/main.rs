mod app;
mod color;
mod config;
mod state;
mod ui;

use app::BikeDashboardApp;
use bike_rental_dashboard::DatasetLoader;
use clap::Parser;
use config::DashboardArgs;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let args = DashboardArgs::parse();

    // Read before the window opens so a bad file shows up at startup.
    let loader = DatasetLoader::new(&args.data);
    let app = BikeDashboardApp::new(&loader, &args);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bike Rentals Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
