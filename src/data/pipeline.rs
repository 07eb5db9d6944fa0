use super::aggregate::{
    correlation_matrix, hourly_means, period_summaries, season_hourly_means,
    weekday_hourly_means, CiMethod, CorrelationMatrix, Facet, HourlyMean, PeriodSummary,
};
use super::filter::{FilterCriteria, FilteredView};
use super::model::Dataset;

/// Knobs that change aggregate output without changing the filtered rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub ci_method: CiMethod,
}

/// Everything the dashboard draws for one filter selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub total_rows: usize,
    pub filtered_rows: usize,
    /// Min and max rental count of the filtered rows.
    pub count_range: Option<(f64, f64)>,
    pub hourly: Vec<HourlyMean>,
    pub by_weekday: Vec<Facet>,
    pub by_season: Vec<Facet>,
    pub by_period: Vec<PeriodSummary>,
    pub correlation: CorrelationMatrix,
}

impl DashboardSnapshot {
    /// True when no rows survived the filter.
    pub fn is_empty(&self) -> bool {
        self.filtered_rows == 0
    }
}

/// Compute all five aggregates from scratch for `view`.
pub fn compute_snapshot(view: &FilteredView<'_>, options: &PipelineOptions) -> DashboardSnapshot {
    DashboardSnapshot {
        total_rows: view.dataset().len(),
        filtered_rows: view.len(),
        count_range: view.count_range(),
        hourly: hourly_means(view),
        by_weekday: weekday_hourly_means(view),
        by_season: season_hourly_means(view),
        by_period: period_summaries(view, options.ci_method),
        correlation: correlation_matrix(view),
    }
}

/// Filter `dataset` by `criteria` and aggregate the result.
///
/// Pure: the same inputs always give the same snapshot.
pub fn run_pipeline(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    options: &PipelineOptions,
) -> DashboardSnapshot {
    let view = FilteredView::apply(dataset, criteria);
    log::debug!(
        "Pipeline run: {criteria} -> {} of {} rows",
        view.len(),
        dataset.len()
    );
    compute_snapshot(&view, options)
}
