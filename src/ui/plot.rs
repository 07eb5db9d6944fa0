use bike_rental_dashboard::data::aggregate::{CorrelationMatrix, Facet, HourlyMean, PeriodSummary};
use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{diverging_color, label_color_on, CategoryColors};
use crate::state::AppState;

const HOUR_AXIS: &str = "Hour of the Day";
const MEAN_AXIS: &str = "Mean Hourly Rentals";

// ---------------------------------------------------------------------------
// Central panel – every chart, top to bottom
// ---------------------------------------------------------------------------

/// Render the chart column in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Bike Rental Data Analysis Dashboard");
            ui.label(
                "This interactive dashboard summarizes key insights from the bike rental \
                 dataset, including temporal patterns, seasonal trends, and user behavior.",
            );
            ui.add_space(8.0);

            let snap = &state.snapshot;

            section(ui, "Mean Hourly Rentals vs Hour of the Day");
            hourly_plot(ui, &snap.hourly);

            section(ui, "Mean Hourly Rentals by Day of the Week");
            facet_grid(ui, "weekday_facets", &snap.by_weekday, 4, &state.weekday_colors, |l| {
                l.to_string()
            });

            section(ui, "Mean Hourly Rentals by Season");
            facet_grid(ui, "season_facets", &snap.by_season, 2, &state.season_colors, |l| {
                format!("Season: {l}")
            });

            section(ui, "Mean Rentals by Period of the Day (95% CI)");
            period_bar_chart(ui, &snap.by_period, &state.period_colors);
            ui.label(
                RichText::new(format!("Interval: {}", state.options.ci_method.label())).weak(),
            );
            period_table(ui, &snap.by_period);

            section(ui, "Correlation Heatmap");
            correlation_heatmap(ui, &snap.correlation);
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.separator();
    ui.heading(title);
}

fn empty_notice(ui: &mut Ui) {
    ui.label(RichText::new("No rows match the current filters.").italics().weak());
}

fn curve_points(points: &[HourlyMean]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [f64::from(p.hour), p.mean]).collect()
}

// ---------------------------------------------------------------------------
// Line charts
// ---------------------------------------------------------------------------

/// Mean rentals per hour with point markers.
pub fn hourly_plot(ui: &mut Ui, hourly: &[HourlyMean]) {
    if hourly.is_empty() {
        empty_notice(ui);
        return;
    }
    let points = curve_points(hourly);

    Plot::new("hourly_mean_plot")
        .height(280.0)
        .x_axis_label(HOUR_AXIS)
        .y_axis_label("Mean Rentals")
        .include_x(0.0)
        .include_x(23.0)
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(points.clone()))
                    .name("mean rentals")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(points))
                    .radius(3.5)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

/// Small multiples, `per_row` panels per row, all sharing one y range.
pub fn facet_grid(
    ui: &mut Ui,
    id: &str,
    facets: &[Facet],
    per_row: usize,
    colors: &CategoryColors,
    title: impl Fn(&str) -> String,
) {
    if facets.is_empty() {
        empty_notice(ui);
        return;
    }
    let y_max = facets
        .iter()
        .flat_map(|f| f.points.iter().map(|p| p.mean))
        .fold(0.0, f64::max);

    for row in facets.chunks(per_row) {
        ui.columns(per_row, |columns| {
            for (col_ui, facet) in columns.iter_mut().zip(row) {
                col_ui.label(RichText::new(title(&facet.label)).strong());
                let color = colors.color_for(&facet.label);
                Plot::new((id, facet.label.as_str()))
                    .height(180.0)
                    .x_axis_label(HOUR_AXIS)
                    .y_axis_label(MEAN_AXIS)
                    .include_x(0.0)
                    .include_x(23.0)
                    .include_y(0.0)
                    .include_y(y_max)
                    .allow_scroll(false)
                    .show(col_ui, |plot_ui| {
                        let points = curve_points(&facet.points);
                        plot_ui.line(
                            Line::new(PlotPoints::new(points.clone()))
                                .color(color)
                                .width(1.5),
                        );
                        plot_ui.points(Points::new(PlotPoints::new(points)).radius(2.0).color(color));
                    });
            }
        });
        ui.add_space(6.0);
    }
}

// ---------------------------------------------------------------------------
// Period of day – bars with interval whiskers
// ---------------------------------------------------------------------------

pub fn period_bar_chart(ui: &mut Ui, periods: &[PeriodSummary], colors: &CategoryColors) {
    if periods.is_empty() {
        empty_notice(ui);
        return;
    }
    let labels: Vec<String> = periods.iter().map(|p| p.period.clone()).collect();
    let bars: Vec<Bar> = periods
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Bar::new(i as f64, p.mean)
                .width(0.6)
                .name(&p.period)
                .fill(colors.color_for(&p.period))
        })
        .collect();

    Plot::new("period_bar_chart")
        .height(300.0)
        .legend(Legend::default())
        .x_axis_label("Period of the Day")
        .y_axis_label(MEAN_AXIS)
        .include_y(0.0)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("mean rentals"));

            let whisker = Color32::from_gray(40);
            for (i, p) in periods.iter().enumerate() {
                let x = i as f64;
                let segments = [
                    [[x, p.ci_low], [x, p.ci_high]],
                    [[x - 0.08, p.ci_low], [x + 0.08, p.ci_low]],
                    [[x - 0.08, p.ci_high], [x + 0.08, p.ci_high]],
                ];
                for segment in segments {
                    plot_ui.line(Line::new(PlotPoints::new(segment.to_vec())).color(whisker).width(1.5));
                }
            }
        });
}

/// Numbers behind the bar chart.
pub fn period_table(ui: &mut Ui, periods: &[PeriodSummary]) {
    if periods.is_empty() {
        return;
    }
    ui.push_id("period_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(90.0))
            .columns(Column::auto().at_least(70.0), 4)
            .header(20.0, |mut header| {
                for title in ["Period", "Rows", "Mean", "CI low", "CI high"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for p in periods {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&p.period);
                        });
                        row.col(|ui| {
                            ui.label(p.n.to_string());
                        });
                        for value in [p.mean, p.ci_low, p.ci_high] {
                            row.col(|ui| {
                                ui.label(format!("{value:.1}"));
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

const LABEL_WIDTH: f32 = 120.0;
const LABEL_HEIGHT: f32 = 22.0;

/// Painted grid of Pearson coefficients with a colour scale underneath.
pub fn correlation_heatmap(ui: &mut Ui, corr: &CorrelationMatrix) {
    if corr.is_empty() {
        empty_notice(ui);
        return;
    }
    let k = corr.columns.len();
    let cell = ((ui.available_width() - LABEL_WIDTH) / k as f32).clamp(28.0, 72.0);
    let size = egui::vec2(LABEL_WIDTH + cell * k as f32, cell * k as f32 + LABEL_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();
    let grid_origin = rect.min + egui::vec2(LABEL_WIDTH, 0.0);

    for (i, name) in corr.columns.iter().enumerate() {
        let y = grid_origin.y + cell * (i as f32 + 0.5);
        painter.text(
            egui::pos2(grid_origin.x - 6.0, y),
            Align2::RIGHT_CENTER,
            name,
            font.clone(),
            text_color,
        );
        painter.text(
            egui::pos2(grid_origin.x + cell * (i as f32 + 0.5), grid_origin.y + cell * k as f32 + 4.0),
            Align2::CENTER_TOP,
            abbreviate(name, cell),
            font.clone(),
            text_color,
        );
    }

    for i in 0..k {
        for j in 0..k {
            let value = corr.values[i][j];
            let min = grid_origin + egui::vec2(cell * j as f32, cell * i as f32);
            let cell_rect = egui::Rect::from_min_size(min, egui::vec2(cell, cell));
            painter.rect_filled(cell_rect.shrink(0.5), 0.0, diverging_color(value));
            if cell >= 36.0 && value.is_finite() {
                painter.text(
                    cell_rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{value:.2}"),
                    font.clone(),
                    label_color_on(value),
                );
            }
        }
    }

    if let Some(pos) = response.hover_pos() {
        let local = pos - grid_origin;
        if local.x >= 0.0 && local.y >= 0.0 {
            let (i, j) = ((local.y / cell) as usize, (local.x / cell) as usize);
            if let Some(value) = corr.get(i, j) {
                response.on_hover_text(format!(
                    "{} × {}: {value:.3}",
                    corr.columns[i], corr.columns[j]
                ));
            }
        }
    }

    color_scale(ui);
}

/// Column labels must fit under their cell.
fn abbreviate(name: &str, cell: f32) -> String {
    let max_chars = ((cell / 7.0) as usize).max(3);
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        name.chars().take(max_chars - 1).chain(std::iter::once('…')).collect()
    }
}

fn color_scale(ui: &mut Ui) {
    const STEPS: usize = 40;
    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("-1");
        let (rect, _) = ui.allocate_exact_size(egui::vec2(240.0, 12.0), Sense::hover());
        let painter = ui.painter_at(rect);
        let step = rect.width() / STEPS as f32;
        for s in 0..STEPS {
            let value = -1.0 + 2.0 * (s as f64 + 0.5) / STEPS as f64;
            let min = rect.min + egui::vec2(step * s as f32, 0.0);
            painter.rect_filled(
                egui::Rect::from_min_size(min, egui::vec2(step + 0.5, rect.height())),
                0.0,
                diverging_color(value),
            );
        }
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::GRAY), egui::StrokeKind::Inside);
        ui.label("+1");
    });
}
