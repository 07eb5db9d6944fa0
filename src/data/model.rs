use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Record – one row of the rental table
// ---------------------------------------------------------------------------

/// One hour of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: i32,
    pub working_day: bool,
    pub season: String,
    /// Hour of the day, `0..=23`.
    pub hour: u8,
    pub weekday: String,
    /// Derived bucket such as "morning" or "night".
    pub day_period: String,
    /// Number of rentals in this hour.
    pub count: f64,
    /// Extra numeric columns, aligned with [`Dataset::covariate_names`].
    /// Empty cells are stored as `NaN`.
    pub covariates: Vec<f64>,
}

impl Record {
    /// Value of the `idx`-th numeric column as listed by
    /// [`Dataset::numeric_columns`].
    pub fn numeric_value(&self, idx: usize) -> f64 {
        match idx {
            0 => f64::from(self.hour),
            1 => self.count,
            n => self.covariates.get(n - 2).copied().unwrap_or(f64::NAN),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed category indices.
///
/// Built once by the loader and shared behind an `Arc`; nothing hands out
/// mutable access after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    covariate_names: Vec<String>,
    years: Vec<i32>,
    seasons: Vec<String>,
    weekdays: Vec<String>,
    day_periods: Vec<String>,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Build category indices from the loaded records.
    pub fn from_records(records: Vec<Record>, covariate_names: Vec<String>) -> Self {
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let seasons = unique_in_order(records.iter().map(|r| r.season.as_str()));
        let mut weekdays = unique_in_order(records.iter().map(|r| r.weekday.as_str()));
        let day_periods = unique_in_order(records.iter().map(|r| r.day_period.as_str()));

        if weekdays.iter().all(|d| calendar_rank(d).is_some()) {
            weekdays.sort_by_key(|d| calendar_rank(d));
        }

        Dataset {
            records,
            covariate_names,
            years: years.into_iter().collect(),
            seasons,
            weekdays,
            day_periods,
            source: None,
        }
    }

    /// Remember where the dataset came from (shown in the UI).
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Names of the extra numeric columns, in header order.
    pub fn covariate_names(&self) -> &[String] {
        &self.covariate_names
    }

    /// Every numeric column that takes part in correlation: hour, count, then
    /// the covariates.
    pub fn numeric_columns(&self) -> Vec<String> {
        ["hour", "count"]
            .into_iter()
            .map(String::from)
            .chain(self.covariate_names.iter().cloned())
            .collect()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Distinct seasons in order of first appearance.
    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    /// Distinct weekdays; calendar order when every label is a day name,
    /// otherwise order of first appearance.
    pub fn weekdays(&self) -> &[String] {
        &self.weekdays
    }

    /// Distinct day periods in order of first appearance.
    pub fn day_periods(&self) -> &[String] {
        &self.day_periods
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

const DAY_NAMES: [(&str, &[&str]); 7] = [
    ("monday", &["mon"]),
    ("tuesday", &["tue", "tues"]),
    ("wednesday", &["wed"]),
    ("thursday", &["thu", "thur", "thurs"]),
    ("friday", &["fri"]),
    ("saturday", &["sat"]),
    ("sunday", &["sun"]),
];

/// Monday = 0 … Sunday = 6 for full or abbreviated English day names.
/// Anything else, including words that merely start like a day, is `None`.
fn calendar_rank(label: &str) -> Option<u8> {
    let lower = label.trim().trim_end_matches('.').to_ascii_lowercase();
    DAY_NAMES
        .iter()
        .position(|(full, short)| *full == lower || short.contains(&lower.as_str()))
        .map(|i| i as u8)
}
