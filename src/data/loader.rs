use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use once_cell::sync::OnceCell;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open dataset '{}': {source}", .path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("malformed {format} data")]
    Malformed {
        format: &'static str,
        #[source]
        source: BoxError,
    },
    #[error("dataset contains no rows")]
    Empty,
}

impl LoadError {
    fn malformed(format: &'static str, source: impl Into<BoxError>) -> Self {
        LoadError::Malformed {
            format,
            source: source.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load-once cache
// ---------------------------------------------------------------------------

/// Reads the dataset on first use and hands out the same `Arc` afterwards.
///
/// Owned by whoever starts the process; there is no global instance.
#[derive(Debug)]
pub struct DatasetLoader {
    path: PathBuf,
    cache: OnceCell<Arc<Dataset>>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the source has already been read.
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Return the cached dataset, reading the source only on the first call.
    /// A failed read is not cached, so a later call retries the source.
    pub fn load(&self) -> Result<Arc<Dataset>, LoadError> {
        self.cache
            .get_or_try_init(|| {
                let dataset = load_file(&self.path)?;
                log::info!(
                    "Loaded {} rows from {} (years {:?}, seasons {:?}, covariates {:?})",
                    dataset.len(),
                    self.path.display(),
                    dataset.years(),
                    dataset.seasons(),
                    dataset.covariate_names()
                );
                Ok(Arc::new(dataset))
            })
            .map(Arc::clone)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a rental dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (pandas `to_csv`)
/// * `.json`    – `[{ "year": 2011, "season": "Spring", ... }, ...]`
/// * `.parquet` – flat columns; categories, narrow integers and dates are cast
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (headers, rows) = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    Ok(build_dataset(&headers, rows)?.with_source(path))
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Missing {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CellValue – a single untyped cell before column resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    fn is_numeric_or_null(&self) -> bool {
        matches!(
            self,
            CellValue::Integer(_) | CellValue::Float(_) | CellValue::Null
        )
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

type RawTable = (Vec<String>, Vec<Vec<CellValue>>);

fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::malformed("CSV", e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::malformed("CSV", e))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok((headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented layout, the default `df.to_json(orient='records')`.
/// Column set is taken from the first object; missing keys read as null.
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Missing {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| LoadError::malformed("JSON", e))?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::malformed("JSON", "expected top-level array"))?;

    let headers: Vec<String> = match records.first() {
        Some(JsonValue::Object(obj)) => obj.keys().cloned().collect(),
        Some(_) => return Err(LoadError::malformed("JSON", "row 0 is not an object")),
        None => return Err(LoadError::Empty),
    };

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::malformed("JSON", format!("row {i} is not an object")))?;
        rows.push(
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect(),
        );
    }

    Ok((headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`) as long as the columns are flat.
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)
        .map_err(|e| LoadError::malformed("Parquet", e))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| LoadError::malformed("Parquet", e))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| LoadError::malformed("Parquet", e))?;
        let columns = headers
            .iter()
            .zip(batch.columns())
            .map(|(name, col)| normalize_column(name, col))
            .collect::<Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }

    Ok((headers, rows))
}

/// Physical type every column is cast to before cells are read.
fn cell_type(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Boolean => Some(DataType::Boolean),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(DataType::Utf8),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Some(DataType::Int64),
        DataType::Float16 | DataType::Float32 | DataType::Float64 => Some(DataType::Float64),
        // pandas `category` and Polars `Categorical` columns
        DataType::Dictionary(_, values) => cell_type(values),
        // dates, timestamps and decimals keep their rendered value
        other if can_cast_types(other, &DataType::Utf8) => Some(DataType::Utf8),
        _ => None,
    }
}

/// Cast a column to Boolean, Utf8, Int64 or Float64.
fn normalize_column(name: &str, col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    let target = cell_type(col.data_type()).ok_or_else(|| {
        LoadError::malformed(
            "Parquet",
            format!("column '{name}' has unsupported type {}", col.data_type()),
        )
    })?;
    if col.data_type() == &target {
        return Ok(Arc::clone(col));
    }
    cast(col, &target).map_err(|e| LoadError::malformed("Parquet", e))
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col
            .as_boolean_opt()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    value.unwrap_or(CellValue::Null)
}

// ---------------------------------------------------------------------------
// Column resolution and typed conversion
// ---------------------------------------------------------------------------

const YEAR: &[&str] = &["year", "yr"];
const WORKING_DAY: &[&str] = &["workingday", "working_day"];
const SEASON: &[&str] = &["season"];
const HOUR: &[&str] = &["hour_of_the_day", "hour", "hr"];
const WEEKDAY: &[&str] = &["day_of_the_week", "weekday", "day_of_week"];
const DAY_PERIOD: &[&str] = &["day_period", "period"];
const COUNT: &[&str] = &["count", "cnt"];

fn normalize_header(h: &str) -> String {
    h.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Positions of the required columns plus every other named column.
struct ColumnMap {
    year: usize,
    working_day: usize,
    season: usize,
    hour: usize,
    weekday: usize,
    day_period: usize,
    count: usize,
    extra: Vec<usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let find = |name: &'static str, aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
                .ok_or(LoadError::MissingColumn(name))
        };

        let year = find("year", YEAR)?;
        let working_day = find("workingday", WORKING_DAY)?;
        let season = find("season", SEASON)?;
        let hour = find("hour of the day", HOUR)?;
        let weekday = find("day of the week", WEEKDAY)?;
        let day_period = find("day_period", DAY_PERIOD)?;
        let count = find("count", COUNT)?;

        let required = [year, working_day, season, hour, weekday, day_period, count];
        // pandas writes its index as an unnamed leading column
        let extra = normalized
            .iter()
            .enumerate()
            .filter(|(i, h)| !required.contains(i) && !h.is_empty() && !h.starts_with("unnamed"))
            .map(|(i, _)| i)
            .collect();

        Ok(ColumnMap {
            year,
            working_day,
            season,
            hour,
            weekday,
            day_period,
            count,
            extra,
        })
    }
}

fn build_dataset(headers: &[String], mut rows: Vec<Vec<CellValue>>) -> Result<Dataset, LoadError> {
    if rows.is_empty() {
        return Err(LoadError::Empty);
    }
    let columns = ColumnMap::resolve(headers)?;
    for row in &mut rows {
        row.resize(headers.len(), CellValue::Null);
    }

    let covariates: Vec<usize> = columns
        .extra
        .iter()
        .copied()
        .filter(|&idx| {
            let numeric = rows.iter().all(|r| r[idx].is_numeric_or_null());
            if !numeric {
                log::warn!("Ignoring non-numeric column '{}'", headers[idx]);
            }
            numeric
        })
        .collect();

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, cells) in rows.iter().enumerate() {
        let invalid = |column: &'static str, cell: &CellValue| LoadError::InvalidValue {
            row: row_no,
            column,
            value: cell.to_string(),
        };

        let year_cell = &cells[columns.year];
        let year = year_cell
            .as_integer()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| invalid("year", year_cell))?;

        let wd_cell = &cells[columns.working_day];
        let working_day = parse_flag(wd_cell).ok_or_else(|| invalid("workingday", wd_cell))?;

        let hour_cell = &cells[columns.hour];
        let hour = hour_cell
            .as_integer()
            .and_then(|h| u8::try_from(h).ok())
            .filter(|h| *h <= 23)
            .ok_or_else(|| invalid("hour of the day", hour_cell))?;

        let count_cell = &cells[columns.count];
        let count = count_cell
            .as_f64()
            .filter(|c| c.is_finite() && *c >= 0.0)
            .ok_or_else(|| invalid("count", count_cell))?;

        let season_cell = &cells[columns.season];
        let season = label(season_cell).ok_or_else(|| invalid("season", season_cell))?;
        let weekday_cell = &cells[columns.weekday];
        let weekday = label(weekday_cell).ok_or_else(|| invalid("day of the week", weekday_cell))?;
        let period_cell = &cells[columns.day_period];
        let day_period = label(period_cell).ok_or_else(|| invalid("day_period", period_cell))?;

        records.push(Record {
            year,
            working_day,
            season,
            hour,
            weekday,
            day_period,
            count,
            covariates: covariates
                .iter()
                .map(|&idx| cells[idx].as_f64().unwrap_or(f64::NAN))
                .collect(),
        });
    }

    let covariate_names = covariates.iter().map(|&idx| headers[idx].clone()).collect();
    Ok(Dataset::from_records(records, covariate_names))
}

fn parse_flag(cell: &CellValue) -> Option<bool> {
    match cell {
        CellValue::Bool(b) => Some(*b),
        CellValue::Integer(0) => Some(false),
        CellValue::Integer(1) => Some(true),
        CellValue::Float(v) if *v == 0.0 => Some(false),
        CellValue::Float(v) if *v == 1.0 => Some(true),
        CellValue::Text(s) if s.eq_ignore_ascii_case("yes") => Some(true),
        CellValue::Text(s) if s.eq_ignore_ascii_case("no") => Some(false),
        _ => None,
    }
}

/// Categorical labels may be stored as text or as integer codes.
fn label(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => Some(s.clone()),
        CellValue::Integer(i) => Some(i.to_string()),
        CellValue::Float(_) | CellValue::Bool(_) => Some(cell.to_string()),
        CellValue::Null => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        ",year,season,workingday,hour of the day,day of the week,day_period,count,temp,dteday\n";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn original_layout_csv() -> String {
        let mut text = HEADER.to_string();
        text.push_str("0,2011,Spring,1,8,Monday,morning,120,0.24,2011-01-03\n");
        text.push_str("1,2011,Spring,0,13,Saturday,afternoon,80,0.30,2011-01-01\n");
        text.push_str("2,2012,Winter,1,23,Friday,night,15,,2012-12-28\n");
        text
    }

    #[test]
    fn loads_original_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rentals.csv", &original_layout_csv());

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years(), &[2011, 2012]);
        assert_eq!(ds.covariate_names(), &["temp".to_string()]);
        assert_eq!(ds.source(), Some(path.as_path()));

        let first = &ds.records()[0];
        assert_eq!(first.hour, 8);
        assert!(first.working_day);
        assert_eq!(first.weekday, "Monday");
        assert_eq!(first.count, 120.0);
        assert!(ds.records()[2].covariates[0].is_nan());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Missing { .. }));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rentals.csv",
            "year,season,workingday,hour,weekday,count\n2011,Spring,1,8,Monday,10\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("day_period")));
    }

    #[test]
    fn hour_outside_day_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rentals.csv",
            "year,season,workingday,hour,weekday,day_period,count\n2011,Spring,1,24,Monday,night,10\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { row: 0, column: "hour of the day", .. }
        ));
    }

    #[test]
    fn negative_count_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rentals.csv",
            "year,season,workingday,hour,weekday,day_period,count\n2011,Spring,1,3,Monday,night,-4\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { column: "count", .. }));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rentals.csv", HEADER);
        assert!(matches!(load_file(&path).unwrap_err(), LoadError::Empty));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rentals.xlsx", "");
        assert!(matches!(
            load_file(&path).unwrap_err(),
            LoadError::UnsupportedFormat(ext) if ext == "xlsx"
        ));
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rentals.json",
            r#"[
                {"yr": 2011, "season": 1, "workingday": true, "hr": 7,
                 "weekday": "Tue", "period": "morning", "cnt": 55, "hum": 0.8},
                {"yr": 2012, "season": 3, "workingday": false, "hr": 19,
                 "weekday": "Sun", "period": "evening", "cnt": 70.5, "hum": null}
            ]"#,
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.seasons(), &["1".to_string(), "3".to_string()]);
        assert_eq!(ds.covariate_names(), &["hum".to_string()]);
        assert!(!ds.records()[1].working_day);
        assert_eq!(ds.records()[1].count, 70.5);
    }

    #[test]
    fn json_covariates_keep_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rentals.json",
            r#"[{"year": 2011, "season": "Fall", "workingday": 1, "hour": 9,
                 "weekday": "Monday", "day_period": "morning", "count": 80,
                 "windspeed": 12.0, "temp": 14.5, "humidity": 70}]"#,
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.covariate_names(), &["windspeed", "temp", "humidity"]);
        assert_eq!(ds.records()[0].covariates, vec![12.0, 14.5, 70.0]);
    }

    #[test]
    fn loads_parquet_columns() {
        use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int64, false),
            Field::new("season", DataType::Utf8, false),
            Field::new("workingday", DataType::Boolean, false),
            Field::new("hour", DataType::Int64, false),
            Field::new("weekday", DataType::Utf8, false),
            Field::new("day_period", DataType::Utf8, false),
            Field::new("count", DataType::Float64, false),
            Field::new("windspeed", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2011, 2012])),
                Arc::new(StringArray::from(vec!["Summer", "Fall"])),
                Arc::new(BooleanArray::from(vec![true, false])),
                Arc::new(Int64Array::from(vec![17, 2])),
                Arc::new(StringArray::from(vec!["Thursday", "Saturday"])),
                Arc::new(StringArray::from(vec!["afternoon", "night"])),
                Arc::new(Float64Array::from(vec![410.0, 12.0])),
                Arc::new(Float64Array::from(vec![Some(0.2), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rentals.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].hour, 17);
        assert_eq!(ds.records()[0].covariates, vec![0.2]);
        assert!(ds.records()[1].covariates[0].is_nan());
    }

    fn write_parquet(dir: &tempfile::TempDir, columns: Vec<(&str, ArrayRef)>) -> PathBuf {
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let path = dir.path().join("rentals.parquet");
        let mut writer =
            ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    /// Two rows with the given season and hour columns.
    fn rental_columns(season: ArrayRef, hour: ArrayRef) -> Vec<(&'static str, ArrayRef)> {
        use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};

        vec![
            ("year", Arc::new(Int64Array::from(vec![2011, 2012])) as ArrayRef),
            ("season", season),
            ("workingday", Arc::new(BooleanArray::from(vec![true, false])) as ArrayRef),
            ("hour", hour),
            ("weekday", Arc::new(StringArray::from(vec!["Monday", "Sunday"])) as ArrayRef),
            ("day_period", Arc::new(StringArray::from(vec!["morning", "night"])) as ArrayRef),
            ("count", Arc::new(Float64Array::from(vec![150.0, 9.0])) as ArrayRef),
        ]
    }

    #[test]
    fn parquet_category_column_reads_its_labels() {
        use arrow::array::{DictionaryArray, Int64Array};
        use arrow::datatypes::Int8Type;

        let seasons: DictionaryArray<Int8Type> = vec!["Winter", "Summer"].into_iter().collect();
        let dir = tempfile::tempdir().unwrap();
        let path = write_parquet(
            &dir,
            rental_columns(Arc::new(seasons), Arc::new(Int64Array::from(vec![8, 23]))),
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.seasons(), &["Winter".to_string(), "Summer".to_string()]);
        assert_eq!(ds.records()[1].season, "Summer");
    }

    #[test]
    fn parquet_narrow_integer_hours_are_widened() {
        use arrow::array::{Int8Array, StringArray, UInt16Array};

        let dir = tempfile::tempdir().unwrap();
        let mut columns = rental_columns(
            Arc::new(StringArray::from(vec!["Winter", "Winter"])),
            Arc::new(Int8Array::from(vec![8, 23])),
        );
        columns.push(("registered", Arc::new(UInt16Array::from(vec![120, 4])) as ArrayRef));
        let path = write_parquet(&dir, columns);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records()[0].hour, 8);
        assert_eq!(ds.records()[1].hour, 23);
        assert_eq!(ds.covariate_names(), &["registered".to_string()]);
        assert_eq!(ds.records()[0].covariates, vec![120.0]);
    }

    #[test]
    fn parquet_date_column_keeps_its_values() {
        use arrow::array::{Date32Array, Int64Array, StringArray};

        let dir = tempfile::tempdir().unwrap();
        let mut columns = rental_columns(
            Arc::new(StringArray::from(vec!["Winter", "Winter"])),
            Arc::new(Int64Array::from(vec![8, 23])),
        );
        // 2011-01-01 and 2011-01-02
        columns.push(("dteday", Arc::new(Date32Array::from(vec![14975, 14976])) as ArrayRef));
        let path = write_parquet(&dir, columns);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.covariate_names().is_empty());

        let col: ArrayRef = Arc::new(Date32Array::from(vec![14975]));
        let text = normalize_column("dteday", &col).unwrap();
        assert!(matches!(arrow_cell(&text, 0), CellValue::Text(s) if s == "2011-01-01"));
    }

    #[test]
    fn parquet_types_map_to_cell_types() {
        let dict = DataType::Dictionary(Box::new(DataType::Int8), Box::new(DataType::LargeUtf8));
        assert_eq!(cell_type(&dict), Some(DataType::Utf8));
        assert_eq!(cell_type(&DataType::UInt64), Some(DataType::Int64));
        assert_eq!(cell_type(&DataType::Float16), Some(DataType::Float64));
        assert_eq!(cell_type(&DataType::Utf8View), Some(DataType::Utf8));
        assert_eq!(cell_type(&DataType::Boolean), Some(DataType::Boolean));
    }

    #[test]
    fn loader_reads_source_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rentals.csv", &original_layout_csv());
        let loader = DatasetLoader::new(&path);
        assert!(!loader.is_loaded());

        let first = loader.load().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = loader.load().unwrap();

        assert!(loader.is_loaded());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let loader = DatasetLoader::new(&path);
        assert!(loader.load().is_err());

        write_file(&dir, "late.csv", &original_layout_csv());
        assert_eq!(loader.load().unwrap().len(), 3);
    }
}
