use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;

/// Write a synthetic hourly bike rental table for trying out the dashboard.
#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Output file; the extension picks the format (.csv, .json, .parquet)
    #[arg(default_value = "bike_rentals.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// One generated hour, laid out like the pandas frame the dashboard reads.
#[derive(Debug, Serialize)]
struct SampleRow {
    year: i64,
    season: &'static str,
    workingday: u8,
    #[serde(rename = "hour of the day")]
    hour: i64,
    #[serde(rename = "day of the week")]
    weekday: &'static str,
    day_period: &'static str,
    count: f64,
    temp: f64,
    humidity: f64,
    windspeed: f64,
}

const WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

fn season_for(day_of_year: u32) -> &'static str {
    match day_of_year {
        0..=78 => "Winter",
        79..=170 => "Spring",
        171..=264 => "Summer",
        265..=354 => "Fall",
        _ => "Winter",
    }
}

fn period_for(hour: u32) -> &'static str {
    match hour {
        6..=11 => "morning",
        12..=17 => "afternoon",
        18..=21 => "evening",
        _ => "night",
    }
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Commuter peaks on working days, a midday hump otherwise.
fn demand_curve(hour: f64, working: bool) -> f64 {
    if working {
        20.0 + gaussian(hour, 8.0, 1.0, 380.0)
            + gaussian(hour, 17.5, 1.3, 420.0)
            + gaussian(hour, 13.0, 2.5, 90.0)
    } else {
        15.0 + gaussian(hour, 14.0, 3.5, 330.0)
    }
}

/// Normal noise with the given standard deviation.
fn noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    std_dev * rng.sample::<f64, _>(StandardNormal)
}

fn generate(seed: u64) -> Vec<SampleRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(2 * 365 * 24);

    for (year_idx, year) in [2011i64, 2012].into_iter().enumerate() {
        for day in 0..365u32 {
            // 2011-01-01 was a Saturday
            let weekday_idx = (day as usize + 5 + year_idx * 365) % 7;
            let working = weekday_idx < 5;
            let season = season_for(day);
            let season_temp = match season {
                "Winter" => 6.0,
                "Spring" => 15.0,
                "Summer" => 27.0,
                _ => 17.0,
            };

            for hour in 0..24u32 {
                let h = f64::from(hour);
                let temp = season_temp
                    + 4.0 * ((h - 9.0) / 24.0 * std::f64::consts::TAU).sin()
                    + noise(&mut rng, 2.0);
                let humidity = (75.0 - 1.2 * (temp - 15.0) + noise(&mut rng, 8.0)).clamp(10.0, 100.0);
                let windspeed = (12.0 + noise(&mut rng, 5.0)).max(0.0);

                let comfort = (1.0 - ((temp - 24.0) / 25.0).powi(2)).max(0.2);
                let growth = 1.0 + 0.45 * year_idx as f64;
                let expected = demand_curve(h, working) * comfort * growth;
                let count = (expected + noise(&mut rng, expected.sqrt() * 2.0)).max(0.0).round();

                rows.push(SampleRow {
                    year,
                    season,
                    workingday: u8::from(working),
                    hour: i64::from(hour),
                    weekday: WEEKDAYS[weekday_idx],
                    day_period: period_for(hour),
                    count,
                    temp: (temp * 10.0).round() / 10.0,
                    humidity: humidity.round(),
                    windspeed: (windspeed * 10.0).round() / 10.0,
                });
            }
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_json(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let file = File::create(path).context("creating JSON file")?;
    serde_json::to_writer(BufWriter::new(file), rows).context("writing JSON")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let strings = |f: fn(&SampleRow) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&SampleRow) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int64, false),
        Field::new("season", DataType::Utf8, false),
        Field::new("workingday", DataType::Boolean, false),
        Field::new("hour of the day", DataType::Int64, false),
        Field::new("day of the week", DataType::Utf8, false),
        Field::new("day_period", DataType::Utf8, false),
        Field::new("count", DataType::Float64, false),
        Field::new("temp", DataType::Float64, false),
        Field::new("humidity", DataType::Float64, false),
        Field::new("windspeed", DataType::Float64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
        strings(|r| r.season),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.workingday == 1).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.hour).collect::<Vec<_>>())),
        strings(|r| r.weekday),
        strings(|r| r.day_period),
        floats(|r| r.count),
        floats(|r| r.temp),
        floats(|r| r.humidity),
        floats(|r| r.windspeed),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = GenerateArgs::parse();
    let rows = generate(args.seed);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "json" => write_json(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} hourly records to {}", rows.len(), args.output.display());
    Ok(())
}
