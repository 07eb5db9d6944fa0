use std::path::PathBuf;

use bike_rental_dashboard::DatasetLoader;
use eframe::egui::{self, Color32, RichText};

use crate::config::DashboardArgs;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub enum Screen {
    Dashboard(Box<AppState>),
    /// Startup load failed; nothing but the error is shown.
    LoadFailed { path: PathBuf, message: String },
}

pub struct BikeDashboardApp {
    pub screen: Screen,
}

impl BikeDashboardApp {
    pub fn new(loader: &DatasetLoader, args: &DashboardArgs) -> Self {
        let screen = match loader.load() {
            Ok(dataset) => Screen::Dashboard(Box::new(AppState::new(
                dataset,
                args.pipeline_options(),
                args.bootstrap_method(),
            ))),
            Err(e) => {
                let e = anyhow::Error::new(e).context("dashboard cannot start");
                log::error!("Failed to load dataset: {e:#}");
                Screen::LoadFailed {
                    path: loader.path().to_path_buf(),
                    message: format!("{e:#}"),
                }
            }
        };
        Self { screen }
    }
}

impl eframe::App for BikeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = match &mut self.screen {
            Screen::Dashboard(state) => state,
            Screen::LoadFailed { path, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.heading("Could not load the bike rental dataset");
                            ui.label(path.display().to_string());
                            ui.label(RichText::new(message.as_str()).color(Color32::RED));
                        });
                    });
                });
                return;
            }
        };

        // ---- Top panel: dataset summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard(ui, state);
        });
    }
}
