//! Presentation shapes for the tiles, the price chart and the median table.

use std::io;

use serde::Serialize;

use super::aggregate::{ComparisonTiles, QuarterlyAggregate};
use super::model::Quarter;
use crate::config::{CHART_Y_RANGE, CHART_Y_TICKS};

/// Placeholder for any absent aggregate.
pub const NOT_AVAILABLE: &str = "Data not available";

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub label: String,
    pub value: String,
}

/// Render the three tiles: current median, percent change, record count.
pub fn format_tiles(tiles: &ComparisonTiles) -> [Tile; 3] {
    let current = short_label(tiles.current_quarter);
    let previous = short_label(tiles.previous_quarter);

    [
        Tile {
            label: format!("Median-Verkaufspreis ({current}):"),
            value: tiles
                .current_median
                .map_or_else(|| NOT_AVAILABLE.to_string(), |m| format!("{m:.2} €")),
        },
        Tile {
            label: format!("Proz. Differenz (vs. {previous}):"),
            value: tiles
                .delta_percent
                .map_or_else(|| NOT_AVAILABLE.to_string(), |d| format!("{d:.2}%")),
        },
        Tile {
            label: "Anzahl der Fälle:".to_string(),
            value: tiles.current_count.to_string(),
        },
    ]
}

/// "Q4/2023" style used in tile headings.
fn short_label(quarter: Quarter) -> String {
    format!("Q{}/{}", quarter.quarter(), quarter.year())
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// Two price series over a shared chronological quarter axis.
///
/// The y axis is fixed so charts stay comparable across selections.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub quarters: Vec<String>,
    pub sale_price: Vec<Option<f64>>,
    pub asking_price: Vec<Option<f64>>,
    pub y_range: (f64, f64),
    pub y_ticks: Vec<f64>,
    /// Records in the whole filtered view.
    pub entries: usize,
}

impl ChartSeries {
    pub fn entries_label(&self) -> String {
        format!("n = {}", self.entries)
    }
}

pub fn format_chart(series: &QuarterlyAggregate, entries: usize) -> ChartSeries {
    ChartSeries {
        quarters: series.keys().map(ToString::to_string).collect(),
        sale_price: series.values().map(|m| m.sale_price).collect(),
        asking_price: series.values().map(|m| m.asking_price).collect(),
        y_range: CHART_Y_RANGE,
        y_ticks: CHART_Y_TICKS.to_vec(),
        entries,
    }
}

// ---------------------------------------------------------------------------
// Table + CSV
// ---------------------------------------------------------------------------

pub const TABLE_HEADERS: [&str; 2] = ["Quarter", "Median Price"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    #[serde(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "Median Price")]
    pub median_price: Option<f64>,
}

pub fn format_table(series: &QuarterlyAggregate) -> Vec<TableRow> {
    series
        .iter()
        .map(|(quarter, medians)| TableRow {
            quarter: quarter.to_string(),
            median_price: medians.sale_price,
        })
        .collect()
}

/// Write the rows as CSV. The header is written even with no rows; absent
/// medians become empty cells.
pub fn write_csv<W: io::Write>(rows: &[TableRow], writer: W) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(TABLE_HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
