use std::sync::Arc;

use bike_rental_dashboard::data::aggregate::CiMethod;
use bike_rental_dashboard::{
    run_pipeline, DashboardSnapshot, Dataset, DayTypeFilter, FilterCriteria, PipelineOptions,
    YearFilter,
};

use crate::color::CategoryColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every filter change goes through one of the setters below, which rerun the
/// pipeline; the charts only ever draw `snapshot`.
pub struct AppState {
    /// Loaded once at startup, shared read-only.
    pub dataset: Arc<Dataset>,

    /// Current filter selection.
    pub criteria: FilterCriteria,

    pub options: PipelineOptions,

    /// Bootstrap settings used when the interval toggle is switched on.
    bootstrap: CiMethod,

    /// Aggregates for `criteria`, recomputed on every change.
    pub snapshot: DashboardSnapshot,

    pub season_colors: CategoryColors,
    pub weekday_colors: CategoryColors,
    pub period_colors: CategoryColors,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, options: PipelineOptions, bootstrap: CiMethod) -> Self {
        let criteria = FilterCriteria::initial(&dataset);
        let snapshot = run_pipeline(&dataset, &criteria, &options);
        Self {
            season_colors: CategoryColors::new(dataset.seasons()),
            weekday_colors: CategoryColors::new(dataset.weekdays()),
            period_colors: CategoryColors::new(dataset.day_periods()),
            dataset,
            criteria,
            options,
            bootstrap,
            snapshot,
        }
    }

    /// Recompute `snapshot` after a filter or option change.
    pub fn refresh(&mut self) {
        self.snapshot = run_pipeline(&self.dataset, &self.criteria, &self.options);
    }

    pub fn set_year(&mut self, year: YearFilter) {
        if self.criteria.year != year {
            self.criteria.year = year;
            self.refresh();
        }
    }

    pub fn set_day_type(&mut self, day_type: DayTypeFilter) {
        if self.criteria.day_type != day_type {
            self.criteria.day_type = day_type;
            self.refresh();
        }
    }

    /// Toggle a single season in the selection.
    pub fn toggle_season(&mut self, season: &str) {
        if !self.criteria.seasons.remove(season) {
            self.criteria.seasons.insert(season.to_string());
        }
        self.refresh();
    }

    /// Select every season present in the dataset.
    pub fn select_all_seasons(&mut self) {
        self.criteria.seasons = self.dataset.seasons().iter().cloned().collect();
        self.refresh();
    }

    /// Deselect all seasons.
    pub fn select_no_seasons(&mut self) {
        self.criteria.seasons.clear();
        self.refresh();
    }

    pub fn uses_bootstrap(&self) -> bool {
        matches!(self.options.ci_method, CiMethod::Bootstrap { .. })
    }

    /// Switch the period interval between normal approximation and bootstrap.
    pub fn set_bootstrap(&mut self, on: bool) {
        if on != self.uses_bootstrap() {
            self.options.ci_method = if on { self.bootstrap } else { CiMethod::Normal };
            self.refresh();
        }
    }
}
