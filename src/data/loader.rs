use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::compute::{cast, cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::date32_to_datetime;
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::{LoadError, Result};
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Names of the source columns. The defaults are the data producer's names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub sale_date: String,
    pub category: String,
    pub mileage: String,
    pub age: String,
    pub sale_price: String,
    pub asking_price: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            sale_date: "Verkauf in".to_string(),
            category: "Kategorie".to_string(),
            mileage: "Kilometer_cat".to_string(),
            age: "fahrzeugalter_cat".to_string(),
            sale_price: "Verkaufspreis".to_string(),
            asking_price: "Wunschpreis".to_string(),
        }
    }
}

impl ColumnMapping {
    /// All mapped names, date first.
    pub fn names(&self) -> [&str; 6] {
        [
            &self.sale_date,
            &self.category,
            &self.mileage,
            &self.age,
            &self.sale_price,
            &self.asking_price,
        ]
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the sale dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one sale per line; `,` or `;` separated
/// * `.xlsx`    – first worksheet, header in the first row (also `.xlsm`,
///   `.xlsb`, `.xls`, `.ods`)
/// * `.json`    – `[{ "Verkauf in": "2023-10-01", "Kategorie": "SUV", ... }, ...]`
/// * `.parquet` – one column per field; dates as `Date32`/`Timestamp` or text
///
/// A row whose sale date cannot be parsed fails the whole load.
pub fn load_file(path: &Path, columns: &ColumnMapping) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path, columns),
        "json" => load_json(path, columns),
        "parquet" | "pq" => load_parquet(path, columns),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, columns),
        other => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: other.to_string(),
        }),
    }?;

    log::debug!("Parsed {} sale records from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Parse a sale date in any of the accepted text layouts.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn require_date(text: &str, row: usize) -> Result<NaiveDate> {
    parse_date(text).ok_or_else(|| LoadError::Date {
        row,
        value: text.to_string(),
    })
}

/// Rewrite a price to `.`-decimal form. Whichever of `,` and `.` comes last
/// is the decimal separator; a lone `,` is a decimal comma (`44000,50`).
fn normalize_decimal(text: &str) -> Cow<'_, str> {
    match (text.rfind(','), text.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => {
            Cow::Owned(text.replace('.', "").replace(',', "."))
        }
        (Some(_), Some(_)) => Cow::Owned(text.replace(',', "")),
        (Some(_), None) => Cow::Owned(text.replace(',', ".")),
        (None, _) => Cow::Borrowed(text),
    }
}

fn parse_price(text: &str, row: usize, column: &str) -> Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    normalize_decimal(text)
        .parse::<f64>()
        .map(Some)
        .map_err(|_| LoadError::Number {
            row,
            column: column.to_string(),
            value: text.to_string(),
        })
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, columns: &ColumnMapping) -> Result<Dataset> {
    let mut input = BufReader::new(std::fs::File::open(path)?);
    let delimiter = header_delimiter(input.fill_buf()?);
    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(input);
    read_csv(reader, columns)
}

/// Pick the field separator from the header line: `;` for exports written
/// with a German locale, `,` otherwise.
pub fn header_delimiter(head: &[u8]) -> u8 {
    let line = head.split(|&b| b == b'\n').next().unwrap_or_default();
    let count = |sep: u8| line.iter().filter(|&&b| b == sep).count();
    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}

/// Read CSV records from any source. Blank cells are missing values.
pub fn read_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    columns: &ColumnMapping,
) -> Result<Dataset> {
    let headers = reader.headers()?.clone();
    let index_of = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };

    let date_idx = index_of(&columns.sale_date)?;
    let category_idx = index_of(&columns.category)?;
    let mileage_idx = index_of(&columns.mileage)?;
    let age_idx = index_of(&columns.age)?;
    let sale_idx = index_of(&columns.sale_price)?;
    let asking_idx = index_of(&columns.asking_price)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        records.push(Record::new(
            require_date(cell(date_idx), row_no)?,
            non_empty(cell(category_idx)),
            non_empty(cell(mileage_idx)),
            non_empty(cell(age_idx)),
            parse_price(cell(asking_idx), row_no, &columns.asking_price)?,
            parse_price(cell(sale_idx), row_no, &columns.sale_price)?,
        ));
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
/// Dates may be text or epoch milliseconds (the pandas default).
fn load_json(path: &Path, columns: &ColumnMapping) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text, columns)
}

pub fn parse_json(text: &str, columns: &ColumnMapping) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text)?;

    let rows = root.as_array().ok_or_else(|| LoadError::InvalidRow {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| LoadError::InvalidRow {
            row: i,
            message: "not a JSON object".to_string(),
        })?;

        records.push(Record::new(
            json_date(obj, &columns.sale_date, i)?,
            json_text(obj, &columns.category),
            json_text(obj, &columns.mileage),
            json_text(obj, &columns.age),
            json_price(obj, &columns.asking_price, i)?,
            json_price(obj, &columns.sale_price, i)?,
        ));
    }

    Ok(Dataset::from_records(records))
}

fn json_date(obj: &Map<String, JsonValue>, column: &str, row: usize) -> Result<NaiveDate> {
    match obj.get(column) {
        Some(JsonValue::String(s)) => require_date(s, row),
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| LoadError::Date {
                row,
                value: n.to_string(),
            }),
        Some(other) => Err(LoadError::Date {
            row,
            value: other.to_string(),
        }),
        None => Err(LoadError::Date {
            row,
            value: String::new(),
        }),
    }
}

fn json_text(obj: &Map<String, JsonValue>, column: &str) -> Option<String> {
    match obj.get(column)? {
        JsonValue::Null => None,
        JsonValue::String(s) => non_empty(s),
        other => Some(other.to_string()),
    }
}

fn json_price(obj: &Map<String, JsonValue>, column: &str, row: usize) -> Result<Option<f64>> {
    match obj.get(column) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(JsonValue::String(s)) => parse_price(s, row, column),
        Some(other) => Err(LoadError::Number {
            row,
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an Excel or OpenDocument workbook. Row 1 holds
/// the column names; every following row is one sale.
fn load_spreadsheet(path: &Path, columns: &ColumnMapping) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::InvalidRow {
            row: 0,
            message: "workbook has no worksheets".to_string(),
        })??;
    read_sheet(range.rows(), columns)
}

/// Read sale records from worksheet rows, the first row being the header.
pub fn read_sheet<'a>(
    mut rows: impl Iterator<Item = &'a [Data]>,
    columns: &ColumnMapping,
) -> Result<Dataset> {
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .unwrap_or_default();
    let index_of = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };

    let date_idx = index_of(&columns.sale_date)?;
    let category_idx = index_of(&columns.category)?;
    let mileage_idx = index_of(&columns.mileage)?;
    let age_idx = index_of(&columns.age)?;
    let sale_idx = index_of(&columns.sale_price)?;
    let asking_idx = index_of(&columns.asking_price)?;

    let mut records = Vec::new();

    for (row_no, row) in rows.enumerate() {
        let cell = |idx: usize| row.get(idx).unwrap_or(&Data::Empty);

        records.push(Record::new(
            cell_date(cell(date_idx), row_no)?,
            cell_text(cell(category_idx)),
            cell_text(cell(mileage_idx)),
            cell_text(cell(age_idx)),
            cell_price(cell(asking_idx), row_no, &columns.asking_price)?,
            cell_price(cell(sale_idx), row_no, &columns.sale_price)?,
        ));
    }

    Ok(Dataset::from_records(records))
}

/// Date cells, date serial numbers and date text are all accepted.
fn cell_date(cell: &Data, row: usize) -> Result<NaiveDate> {
    match cell {
        Data::String(s) => require_date(s, row),
        other => other.as_date().ok_or_else(|| LoadError::Date {
            row,
            value: other.to_string(),
        }),
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        other => non_empty(&other.to_string()),
    }
}

fn cell_price(cell: &Data, row: usize, column: &str) -> Result<Option<f64>> {
    match cell {
        Data::Empty => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) => parse_price(s, row, column),
        other => Err(LoadError::Number {
            row,
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of sale records.
///
/// Expected schema:
/// - sale date: `Date32`, `Date64`, `Timestamp` or text
/// - category / buckets: text (other types are cast to text)
/// - prices: any numeric type; nulls are missing prices
fn load_parquet(path: &Path, columns: &ColumnMapping) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Checked against the file schema so a file without row groups still
    // reports a missing column.
    for name in columns.names() {
        builder
            .schema()
            .index_of(name)
            .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    }
    let reader = builder.build()?;

    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };

    let mut records = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result?;

        let dates = batch_column(&batch, &columns.sale_date)?;
        let category = cast(batch_column(&batch, &columns.category)?, &DataType::Utf8)?;
        let mileage = cast(batch_column(&batch, &columns.mileage)?, &DataType::Utf8)?;
        let age = cast(batch_column(&batch, &columns.age)?, &DataType::Utf8)?;
        let sale = cast_with_options(
            batch_column(&batch, &columns.sale_price)?,
            &DataType::Float64,
            &strict,
        )?;
        let asking = cast_with_options(
            batch_column(&batch, &columns.asking_price)?,
            &DataType::Float64,
            &strict,
        )?;

        let dates = arrow_dates(dates, offset)?;
        let category = category.as_string::<i32>();
        let mileage = mileage.as_string::<i32>();
        let age = age.as_string::<i32>();
        let sale = sale.as_primitive::<Float64Type>();
        let asking = asking.as_primitive::<Float64Type>();

        let text_at = |arr: &StringArray, row: usize| {
            if arr.is_null(row) {
                None
            } else {
                non_empty(arr.value(row))
            }
        };
        let price_at = |arr: &Float64Array, row: usize| {
            (!arr.is_null(row)).then(|| arr.value(row))
        };

        for (row, sale_date) in dates.into_iter().enumerate() {
            records.push(Record::new(
                sale_date,
                text_at(category, row),
                text_at(mileage, row),
                text_at(age, row),
                price_at(asking, row),
                price_at(sale, row),
            ));
        }

        offset += batch.num_rows();
    }

    Ok(Dataset::from_records(records))
}

fn batch_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

/// Convert the sale date column of one batch to dates. `offset` is the
/// index of the batch's first row in the file, for error messages.
fn arrow_dates(col: &ArrayRef, offset: usize) -> Result<Vec<NaiveDate>> {
    let null_error = |row: usize| LoadError::Date {
        row: offset + row,
        value: "<null>".to_string(),
    };

    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = cast(col, &DataType::Utf8)?;
            let text = text.as_string::<i32>();
            (0..text.len())
                .map(|row| {
                    if text.is_null(row) {
                        Err(null_error(row))
                    } else {
                        require_date(text.value(row), offset + row)
                    }
                })
                .collect()
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let days = cast(col, &DataType::Date32)?;
            let days = days.as_primitive::<Date32Type>();
            (0..days.len())
                .map(|row| {
                    if days.is_null(row) {
                        return Err(null_error(row));
                    }
                    let value = days.value(row);
                    date32_to_datetime(value)
                        .map(|dt| dt.date())
                        .ok_or_else(|| LoadError::Date {
                            row: offset + row,
                            value: value.to_string(),
                        })
                })
                .collect()
        }
        other => Err(LoadError::InvalidRow {
            row: offset,
            message: format!("sale date column has unsupported type {other:?}"),
        }),
    }
}
