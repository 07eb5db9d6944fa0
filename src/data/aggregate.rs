use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::filter::FilteredView;
use super::model::Record;

/// Two-sided 95% quantile of the standard normal distribution.
const Z_95: f64 = 1.959_963_984_540_054;

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

/// Mean rental count for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyMean {
    pub hour: u8,
    pub mean: f64,
    /// Number of records behind the mean.
    pub n: usize,
}

/// One panel of a faceted chart: a category label and its hourly curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    pub label: String,
    pub points: Vec<HourlyMean>,
}

/// Mean rentals for one period of the day with its 95% interval.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub period: String,
    pub n: usize,
    pub mean: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

/// How the period-of-day interval is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CiMethod {
    /// `mean ± z₀.₉₇₅ · s / √n`, with `s` the n − 1 sample deviation.
    #[default]
    Normal,
    /// 2.5th and 97.5th percentiles of `resamples` bootstrap means.
    Bootstrap { resamples: usize, seed: u64 },
}

impl CiMethod {
    pub const DEFAULT_RESAMPLES: usize = 1000;
    pub const DEFAULT_SEED: u64 = 42;

    pub fn bootstrap() -> Self {
        CiMethod::Bootstrap {
            resamples: Self::DEFAULT_RESAMPLES,
            seed: Self::DEFAULT_SEED,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CiMethod::Normal => "Normal approx.",
            CiMethod::Bootstrap { .. } => "Bootstrap",
        }
    }
}

/// Pearson coefficients between numeric columns, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Running mean
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
struct MeanAccumulator {
    sum: f64,
    n: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.n += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.n as f64
    }
}

fn hourly_curve(groups: BTreeMap<u8, MeanAccumulator>) -> Vec<HourlyMean> {
    groups
        .into_iter()
        .map(|(hour, acc)| HourlyMean {
            hour,
            mean: acc.mean(),
            n: acc.n,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Mean rentals per hour of the day, ordered by hour.
pub fn hourly_means(view: &FilteredView<'_>) -> Vec<HourlyMean> {
    let mut groups: BTreeMap<u8, MeanAccumulator> = BTreeMap::new();
    for r in view.records() {
        groups.entry(r.hour).or_default().push(r.count);
    }
    hourly_curve(groups)
}

/// Hourly means for each weekday present in the view, in dataset weekday
/// order.
pub fn weekday_hourly_means(view: &FilteredView<'_>) -> Vec<Facet> {
    faceted_hourly_means(view, view.dataset().weekdays(), |r| &r.weekday)
}

/// Hourly means for each season present in the view, in dataset season
/// order.
pub fn season_hourly_means(view: &FilteredView<'_>) -> Vec<Facet> {
    faceted_hourly_means(view, view.dataset().seasons(), |r| &r.season)
}

fn faceted_hourly_means<'a>(
    view: &FilteredView<'a>,
    order: &[String],
    key: impl Fn(&'a Record) -> &'a String,
) -> Vec<Facet> {
    let mut groups: HashMap<&str, BTreeMap<u8, MeanAccumulator>> = HashMap::new();
    for r in view.records() {
        groups
            .entry(key(r).as_str())
            .or_default()
            .entry(r.hour)
            .or_default()
            .push(r.count);
    }

    order
        .iter()
        .filter_map(|label| {
            groups.remove(label.as_str()).map(|curve| Facet {
                label: label.clone(),
                points: hourly_curve(curve),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Period of day with confidence interval
// ---------------------------------------------------------------------------

/// Mean rentals per day period with a 95% interval, in dataset period order.
pub fn period_summaries(view: &FilteredView<'_>, method: CiMethod) -> Vec<PeriodSummary> {
    let mut samples: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in view.records() {
        samples.entry(r.day_period.as_str()).or_default().push(r.count);
    }

    view.dataset()
        .day_periods()
        .iter()
        .filter_map(|period| {
            let values = samples.remove(period.as_str())?;
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let (ci_low, ci_high) = match method {
                CiMethod::Normal => normal_interval(&values, mean),
                CiMethod::Bootstrap { resamples, seed } => {
                    bootstrap_interval(&values, mean, resamples, seed)
                }
            };
            Some(PeriodSummary {
                period: period.clone(),
                n: values.len(),
                mean,
                ci_low,
                ci_high,
            })
        })
        .collect()
}

fn normal_interval(values: &[f64], mean: f64) -> (f64, f64) {
    let n = values.len();
    if n < 2 {
        return (mean, mean);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let margin = Z_95 * variance.sqrt() / (n as f64).sqrt();
    (mean - margin, mean + margin)
}

fn bootstrap_interval(values: &[f64], mean: f64, resamples: usize, seed: u64) -> (f64, f64) {
    let n = values.len();
    if n < 2 || resamples == 0 {
        return (mean, mean);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut means: Vec<f64> = (0..resamples)
        .map(|_| (0..n).map(|_| values[rng.gen_range(0..n)]).sum::<f64>() / n as f64)
        .collect();
    means.sort_by(f64::total_cmp);
    (percentile(&means, 2.5), percentile(&means, 97.5))
}

/// Linear-interpolated percentile of sorted, non-empty data.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let pos = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over hour, count and every covariate.
///
/// Each pair uses only rows where both values are finite. The diagonal is
/// 1.0; an off-diagonal pair with zero variance or fewer than two complete
/// rows is `NaN`. An empty view yields an empty matrix.
pub fn correlation_matrix(view: &FilteredView<'_>) -> CorrelationMatrix {
    if view.is_empty() {
        return CorrelationMatrix::default();
    }
    let columns = view.dataset().numeric_columns();
    let k = columns.len();
    let data: Vec<Vec<f64>> = (0..k)
        .map(|c| view.records().map(|r| r.numeric_value(c)).collect())
        .collect();

    let mut values = vec![vec![1.0; k]; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let r = pearson(&data[i], &data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { columns, values }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
