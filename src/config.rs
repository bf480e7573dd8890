use std::path::PathBuf;

use clap::Parser;

use crate::data::loader::ColumnMapping;
use crate::data::model::Quarter;

// ---------------------------------------------------------------------------
// Business constants
// ---------------------------------------------------------------------------

// Fixed reference quarters for the comparison tiles. These could follow the
// latest quarter in the data instead; kept literal for now.
pub const CURRENT_QUARTER: Quarter = Quarter::new(2023, 4);
pub const PREVIOUS_QUARTER: Quarter = Quarter::new(2022, 4);

/// Fixed price axis so charts stay comparable across selections.
pub const CHART_Y_RANGE: (f64, f64) = (30_000.0, 80_000.0);

pub const CHART_Y_TICKS: [f64; 10] = [
    10_000.0, 20_000.0, 30_000.0, 40_000.0, 50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0,
    100_000.0,
];

pub const DEFAULT_DATA_PATH: &str = "pricedata.csv";

// ---------------------------------------------------------------------------
// CLI / environment
// ---------------------------------------------------------------------------

/// Vehicle sale price dashboard.
#[derive(Debug, Parser)]
#[command(name = "price-analyzer")]
#[command(about = "Median vehicle sale prices by quarter, type, mileage and age")]
pub struct Cli {
    /// Sale records to load at startup (.xlsx, .csv, .json, .parquet).
    #[arg(long, env = "PRICE_ANALYZER_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Optional banner image shown above the filters.
    #[arg(long, env = "PRICE_ANALYZER_HEADER_IMAGE")]
    pub header_image: Option<PathBuf>,

    /// Column holding the sale date.
    #[arg(long, env = "PRICE_ANALYZER_DATE_COLUMN", default_value = "Verkauf in")]
    pub date_column: String,

    /// Column holding the vehicle type.
    #[arg(long, env = "PRICE_ANALYZER_CATEGORY_COLUMN", default_value = "Kategorie")]
    pub category_column: String,

    /// Column holding the mileage bucket.
    #[arg(long, env = "PRICE_ANALYZER_MILEAGE_COLUMN", default_value = "Kilometer_cat")]
    pub mileage_column: String,

    /// Column holding the vehicle age bucket.
    #[arg(long, env = "PRICE_ANALYZER_AGE_COLUMN", default_value = "fahrzeugalter_cat")]
    pub age_column: String,

    /// Column holding the realised sale price.
    #[arg(long, env = "PRICE_ANALYZER_SALE_PRICE_COLUMN", default_value = "Verkaufspreis")]
    pub sale_price_column: String,

    /// Column holding the asking price.
    #[arg(long, env = "PRICE_ANALYZER_ASKING_PRICE_COLUMN", default_value = "Wunschpreis")]
    pub asking_price_column: String,
}

impl Cli {
    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping {
            sale_date: self.date_column.clone(),
            category: self.category_column.clone(),
            mileage: self.mileage_column.clone(),
            age: self.age_column.clone(),
            sale_price: self.sale_price_column.clone(),
            asking_price: self.asking_price_column.clone(),
        }
    }
}
