use std::path::PathBuf;

use bike_rental_dashboard::data::aggregate::CiMethod;
use bike_rental_dashboard::PipelineOptions;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CiKind {
    Normal,
    Bootstrap,
}

/// Startup options, parsed once in `main`.
#[derive(Debug, Parser)]
#[command(name = "bike-rental-dashboard", version, about = "Interactive bike rental analysis dashboard")]
pub struct DashboardArgs {
    /// Rental table to load (.csv, .json or .parquet)
    #[arg(
        long,
        env = "BIKE_DASHBOARD_DATA",
        default_value = "./notebooks/updated_data_frame.csv"
    )]
    pub data: PathBuf,

    /// Confidence interval method for the period-of-day chart
    #[arg(long, value_enum, default_value_t = CiKind::Normal)]
    pub ci: CiKind,

    /// Resamples drawn for the bootstrap interval
    #[arg(long, default_value_t = CiMethod::DEFAULT_RESAMPLES)]
    pub bootstrap_resamples: usize,

    /// Seed for the bootstrap resampler
    #[arg(long, default_value_t = CiMethod::DEFAULT_SEED)]
    pub seed: u64,
}

impl DashboardArgs {
    /// The bootstrap settings, whether or not bootstrap is the start-up method.
    pub fn bootstrap_method(&self) -> CiMethod {
        CiMethod::Bootstrap {
            resamples: self.bootstrap_resamples,
            seed: self.seed,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let ci_method = match self.ci {
            CiKind::Normal => CiMethod::Normal,
            CiKind::Bootstrap => self.bootstrap_method(),
        };
        PipelineOptions { ci_method }
    }
}
