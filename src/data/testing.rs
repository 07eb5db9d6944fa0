//! Fixtures shared by the data-layer unit tests.

use proptest::prelude::*;

use super::filter::{DayTypeFilter, FilterCriteria, YearFilter};
use super::model::{Dataset, Record};

pub fn record(
    year: i32,
    working_day: bool,
    season: &str,
    hour: u8,
    weekday: &str,
    day_period: &str,
    count: f64,
) -> Record {
    Record {
        year,
        working_day,
        season: season.to_string(),
        hour,
        weekday: weekday.to_string(),
        day_period: day_period.to_string(),
        count,
        covariates: Vec::new(),
    }
}

fn period_for(hour: u8) -> &'static str {
    match hour {
        6..=11 => "morning",
        12..=17 => "afternoon",
        18..=21 => "evening",
        _ => "night",
    }
}

/// Two years, four seasons, a full week of hours each, with `temp` and
/// `humidity` covariates. Counts are deterministic but varied.
pub fn sample_dataset() -> Dataset {
    const SEASONS: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];
    const DAYS: [&str; 7] = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    ];

    let mut records = Vec::new();
    for year in [2011, 2012] {
        for (s_idx, season) in SEASONS.iter().enumerate() {
            for (d_idx, day) in DAYS.iter().enumerate() {
                let working = d_idx < 5;
                for hour in 0..24u8 {
                    let base = if working && (hour == 8 || hour == 17) { 300.0 } else { 40.0 };
                    let count = base
                        + f64::from(hour) * 3.0
                        + (s_idx as f64) * 11.0
                        + f64::from(year - 2011) * 50.0
                        + (d_idx as f64) * 2.0;
                    let mut r = record(year, working, season, hour, day, period_for(hour), count);
                    let temp = 5.0 + (s_idx as f64) * 6.0 + f64::from(hour) * 0.4;
                    let humidity = 90.0 - f64::from(hour) * 1.5 + (d_idx as f64);
                    r.covariates = vec![temp, humidity];
                    records.push(r);
                }
            }
        }
    }
    Dataset::from_records(records, vec!["temp".to_string(), "humidity".to_string()])
}

/// Any combination of year, day type and season subset, including years
/// that are absent from the fixtures and the empty season set.
pub fn criteria_strategy() -> impl Strategy<Value = FilterCriteria> {
    let year = prop_oneof![
        Just(YearFilter::All),
        (2010..=2013i32).prop_map(YearFilter::Only),
    ];
    let day_type = proptest::sample::select(DayTypeFilter::OPTIONS.to_vec());
    let season_picks =
        proptest::sample::subsequence(vec!["Spring", "Summer", "Fall", "Winter"], 0..=4);
    (year, day_type, season_picks).prop_map(|(year, day_type, picked)| FilterCriteria {
        year,
        day_type,
        seasons: picked.into_iter().map(String::from).collect(),
    })
}
