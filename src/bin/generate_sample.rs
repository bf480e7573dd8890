use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use price_analyzer::data::loader::ColumnMapping;
use rand::prelude::*;
use serde_json::json;

const CATEGORIES: [(&str, f64); 4] = [
    ("SUV", 52_000.0),
    ("Kombi", 41_000.0),
    ("Limousine", 46_000.0),
    ("Kleinwagen", 24_000.0),
];
const MILEAGE: [(&str, f64); 3] = [
    ("< 50.000 km", 1.10),
    ("50.000 - 100.000 km", 0.95),
    ("> 100.000 km", 0.78),
];
const AGE: [(&str, f64); 3] = [
    ("< 3 Jahre", 1.15),
    ("3 - 6 Jahre", 0.97),
    ("> 6 Jahre", 0.80),
];

/// One generated sale.
struct Sale {
    date: NaiveDate,
    category: Option<&'static str>,
    mileage: &'static str,
    age: &'static str,
    sale_price: Option<f64>,
    asking_price: Option<f64>,
}

/// Fixed seed so repeated runs write the same sample.
const SEED: u64 = 42;

fn generate(n: usize, rng: &mut StdRng) -> Vec<Sale> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default();
    let days = 2 * 365 + 31;

    (0..n)
        .map(|_| {
            let date = start + Duration::days(rng.gen_range(0..days));
            let (category, base) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            let (mileage, mileage_factor) = MILEAGE[rng.gen_range(0..MILEAGE.len())];
            let (age, age_factor) = AGE[rng.gen_range(0..AGE.len())];

            // ~1.5% price growth per quarter since 2022Q1.
            let quarters = (date.year() - 2022) * 4 + (date.month0() / 3) as i32;
            let trend = 1.0 + 0.015 * quarters as f64;
            let noise = rng.gen_range(0.85..1.15);
            let price = (base * mileage_factor * age_factor * trend * noise).round();

            Sale {
                date,
                category: (!rng.gen_bool(0.02)).then_some(category),
                mileage,
                age,
                sale_price: (!rng.gen_bool(0.03)).then_some(price),
                asking_price: (!rng.gen_bool(0.05))
                    .then(|| (price * rng.gen_range(1.04..1.14)).round()),
            }
        })
        .collect()
}

fn write_parquet(path: &Path, sales: &[Sale], cols: &ColumnMapping) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();

    let schema = Arc::new(Schema::new(vec![
        Field::new(&cols.sale_date, DataType::Date32, false),
        Field::new(&cols.category, DataType::Utf8, true),
        Field::new(&cols.mileage, DataType::Utf8, false),
        Field::new(&cols.age, DataType::Utf8, false),
        Field::new(&cols.sale_price, DataType::Float64, true),
        Field::new(&cols.asking_price, DataType::Float64, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(
            sales
                .iter()
                .map(|s| (s.date - epoch).num_days() as i32)
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            sales.iter().map(|s| s.category).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            sales.iter().map(|s| s.mileage).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            sales.iter().map(|s| s.age).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            sales.iter().map(|s| s.sale_price).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            sales.iter().map(|s| s.asking_price).collect::<Vec<_>>(),
        )),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(path: &Path, sales: &[Sale], cols: &ColumnMapping) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).context("creating output file")?;
    wtr.write_record([
        &cols.sale_date,
        &cols.category,
        &cols.mileage,
        &cols.age,
        &cols.sale_price,
        &cols.asking_price,
    ])?;
    let price = |p: Option<f64>| p.map(|v| v.to_string()).unwrap_or_default();
    for s in sales {
        wtr.write_record([
            s.date.format("%Y-%m-%d").to_string(),
            s.category.unwrap_or_default().to_string(),
            s.mileage.to_string(),
            s.age.to_string(),
            price(s.sale_price),
            price(s.asking_price),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json(path: &Path, sales: &[Sale], cols: &ColumnMapping) -> Result<()> {
    let rows: Vec<serde_json::Value> = sales
        .iter()
        .map(|s| {
            let mut row = serde_json::Map::new();
            row.insert(cols.sale_date.clone(), json!(s.date.format("%Y-%m-%d").to_string()));
            row.insert(cols.category.clone(), json!(s.category));
            row.insert(cols.mileage.clone(), json!(s.mileage));
            row.insert(cols.age.clone(), json!(s.age));
            row.insert(cols.sale_price.clone(), json!(s.sale_price));
            row.insert(cols.asking_price.clone(), json!(s.asking_price));
            serde_json::Value::Object(row)
        })
        .collect();
    let file = std::fs::File::create(path).context("creating output file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &rows).context("writing JSON")?;
    Ok(())
}

fn main() -> Result<()> {
    let output_path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_prices.parquet".to_string())
        .into();

    let mut rng = StdRng::seed_from_u64(SEED);
    let sales = generate(5_000, &mut rng);
    let cols = ColumnMapping::default();

    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" | "pq" => write_parquet(&output_path, &sales, &cols)?,
        "csv" => write_csv(&output_path, &sales, &cols)?,
        "json" => write_json(&output_path, &sales, &cols)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} sales to {}", sales.len(), output_path.display());
    Ok(())
}
