//! Bike rental analysis: load an hourly rental table once, filter it by year,
//! day type and season, and aggregate it for the dashboard charts.

pub mod data;

pub use data::filter::{DayTypeFilter, FilterCriteria, FilteredView, YearFilter};
pub use data::loader::{DatasetLoader, LoadError};
pub use data::model::{Dataset, Record};
pub use data::pipeline::{run_pipeline, DashboardSnapshot, PipelineOptions};
