use std::sync::Arc;

use bike_rental_dashboard::{DayTypeFilter, YearFilter};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Cheap handle so we can mutate state while iterating categories.
    let dataset = Arc::clone(&state.dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year ----
            ui.strong("Select Year");
            let current_year = state.criteria.year;
            egui::ComboBox::from_id_salt("year_selector")
                .selected_text(current_year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    let options = std::iter::once(YearFilter::All)
                        .chain(dataset.years().iter().copied().map(YearFilter::Only));
                    for option in options {
                        if ui
                            .selectable_label(current_year == option, option.to_string())
                            .clicked()
                        {
                            state.set_year(option);
                        }
                    }
                });
            ui.separator();

            // ---- Day type ----
            ui.strong("Day Type");
            for option in DayTypeFilter::OPTIONS {
                if ui
                    .radio(state.criteria.day_type == option, option.label())
                    .clicked()
                {
                    state.set_day_type(option);
                }
            }
            ui.separator();

            // ---- Seasons ----
            let n_selected = state.criteria.seasons.len();
            let n_total = dataset.seasons().len();
            ui.strong(format!("Select Season(s)  ({n_selected}/{n_total})"));

            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_seasons();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_seasons();
                }
            });

            for season in dataset.seasons() {
                let mut checked = state.criteria.seasons.contains(season);
                let text = RichText::new(season).color(state.season_colors.color_for(season));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_season(season);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the dataset summary and chart options.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Bike Rentals Dashboard");
        ui.separator();

        let snap = &state.snapshot;
        ui.label(
            RichText::new(format!(
                "Dataset loaded successfully with {} rows",
                snap.total_rows
            ))
            .color(Color32::from_rgb(60, 160, 90)),
        );
        ui.label(format!("{} match the filters", snap.filtered_rows));

        if let Some(source) = state.dataset.source() {
            ui.separator();
            ui.label(RichText::new(source.display().to_string()).weak());
        }

        ui.separator();

        let bootstrap = state.uses_bootstrap();
        if ui
            .selectable_label(bootstrap, "Bootstrap CI")
            .on_hover_text("Percentile bootstrap instead of the normal approximation")
            .clicked()
        {
            state.set_bootstrap(!bootstrap);
        }
    });
}
