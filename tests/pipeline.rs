//! End-to-end tests: load a file from disk, filter, aggregate, format.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use price_analyzer::data::dashboard::Dashboard;
use price_analyzer::data::error::LoadError;
use price_analyzer::data::filter::{filter, FilterSelection, Selection};
use price_analyzer::data::format::{write_csv, NOT_AVAILABLE};
use price_analyzer::data::loader::{load_file, ColumnMapping};
use price_analyzer::data::model::Dimension;

const SALES_CSV: &str = "\
Verkauf in,Kategorie,Kilometer_cat,fahrzeugalter_cat,Verkaufspreis,Wunschpreis
2023-02-14,SUV,<50k,0-2,42000,45000
2022-11-03,SUV,<50k,0-2,41000,44000
2023-10-20,Kombi,50-100k,3-5,44000,47000
2022-12-01,Kombi,50-100k,3-5,40000,
2023-11-30,,<50k,3-5,,46000
";

fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn csv_dashboard() -> (Dashboard, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(&dir, "sales.csv", SALES_CSV);
    let dataset = load_file(&path, &ColumnMapping::default()).unwrap();
    (Dashboard::new(Arc::new(dataset)), dir)
}

// ---------------------------------------------------------------------------
// CSV source
// ---------------------------------------------------------------------------

#[test]
fn all_values_selection_covers_whole_dataset() {
    let (dash, _dir) = csv_dashboard();
    let view = filter(dash.dataset(), &FilterSelection::default());
    assert_eq!(view.len(), 5);
    assert_eq!(dash.chart(&FilterSelection::default()).entries_label(), "n = 5");
}

#[test]
fn dropdown_options_come_from_data() {
    let (dash, _dir) = csv_dashboard();
    let categories: Vec<&str> = dash.dataset().options(Dimension::Category).collect();
    assert_eq!(categories, ["Kombi", "SUV"]);
}

#[test]
fn table_export_is_chronological_regardless_of_file_order() {
    let (dash, _dir) = csv_dashboard();
    let sel = FilterSelection {
        category: Selection::Only("SUV".into()),
        ..Default::default()
    };
    let rows = dash.table(&sel);
    let mut out = Vec::new();
    write_csv(&rows, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Quarter,Median Price\n2022Q4,41000.0\n2023Q1,42000.0\n"
    );
}

#[test]
fn tiles_compare_fourth_quarters() {
    let (dash, _dir) = csv_dashboard();
    let [median, delta, count] = dash.tiles(&FilterSelection::default());
    // 2023Q4 has 44000 and a missing price; 2022Q4 has 41000 and 40000.
    assert_eq!(median.value, "44000.00 €");
    assert_eq!(delta.value, format!("{:.2}%", (44_000.0 - 40_500.0) / 40_500.0 * 100.0));
    assert_eq!(count.value, "2");
}

#[test]
fn unknown_category_yields_placeholders() {
    let (dash, _dir) = csv_dashboard();
    let sel = FilterSelection {
        category: Selection::Only("Cabrio".into()),
        ..Default::default()
    };
    let [median, delta, count] = dash.tiles(&sel);
    assert_eq!(median.value, NOT_AVAILABLE);
    assert_eq!(delta.value, NOT_AVAILABLE);
    assert_eq!(count.value, "0");
    assert!(dash.table(&sel).is_empty());
}

#[test]
fn chart_series_keep_gaps_for_missing_prices() {
    let (dash, _dir) = csv_dashboard();
    let sel = FilterSelection {
        mileage: Selection::Only("<50k".into()),
        age: Selection::Only("3-5".into()),
        ..Default::default()
    };
    let chart = dash.chart(&sel);
    assert_eq!(chart.quarters, ["2023Q4"]);
    assert_eq!(chart.sale_price, [None]);
    assert_eq!(chart.asking_price, [Some(46_000.0)]);
    assert_eq!(chart.y_range, (30_000.0, 80_000.0));
}

#[test]
fn bad_date_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "broken.csv",
        "Verkauf in,Kategorie,Kilometer_cat,fahrzeugalter_cat,Verkaufspreis,Wunschpreis\n\
         gestern,SUV,<50k,0-2,1,2\n",
    );
    let err = load_file(&path, &ColumnMapping::default()).unwrap_err();
    assert!(matches!(err, LoadError::Date { row: 0, .. }));
    assert!(err.to_string().contains("gestern"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_file(&dir.path().join("nope.csv"), &ColumnMapping::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn german_locale_export_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "sales.csv",
        "\u{feff}Verkauf in;Kategorie;Kilometer_cat;fahrzeugalter_cat;Verkaufspreis;Wunschpreis\n\
         20.10.2023;SUV;<50k;0-2;44000,00;46000,00\n\
         05.11.2022;SUV;<50k;0-2;40000,00;\n",
    );
    let dash = Dashboard::new(Arc::new(load_file(&path, &ColumnMapping::default()).unwrap()));
    let [median, delta, count] = dash.tiles(&FilterSelection::default());
    assert_eq!(median.value, "44000.00 €");
    assert_eq!(delta.value, "10.00%");
    assert_eq!(count.value, "1");
}

// ---------------------------------------------------------------------------
// JSON source
// ---------------------------------------------------------------------------

#[test]
fn json_file_with_custom_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "sales.json",
        r#"[
            {"date": "20.10.2023", "type": "SUV", "km": "<50k", "age": "0-2", "price": 44000, "ask": 46000},
            {"date": "05.11.2022", "type": "SUV", "km": "<50k", "age": "0-2", "price": 40000, "ask": null}
        ]"#,
    );
    let columns = ColumnMapping {
        sale_date: "date".into(),
        category: "type".into(),
        mileage: "km".into(),
        age: "age".into(),
        sale_price: "price".into(),
        asking_price: "ask".into(),
    };
    let dash = Dashboard::new(Arc::new(load_file(&path, &columns).unwrap()));
    let [_, delta, _] = dash.tiles(&FilterSelection::default());
    assert_eq!(delta.value, "10.00%");
}

// ---------------------------------------------------------------------------
// Spreadsheet source
// ---------------------------------------------------------------------------

#[test]
fn xlsx_workbook_with_date_cells() {
    use rust_xlsxwriter::{Format, Workbook};

    let cols = ColumnMapping::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Preise.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("dd.mm.yyyy");
    for (col, name) in cols.names().into_iter().enumerate() {
        sheet.write_string(0, col as u16, name).unwrap();
    }
    // 2023-10-31 as a formatted date cell, then 2022-11-15 typed as text.
    sheet.write_number_with_format(1, 0, 45_230.0, &date_format).unwrap();
    sheet.write_string(1, 1, "SUV").unwrap();
    sheet.write_string(1, 2, "<50k").unwrap();
    sheet.write_string(1, 3, "0-2").unwrap();
    sheet.write_number(1, 4, 44_000.0).unwrap();
    sheet.write_number(1, 5, 46_000.0).unwrap();
    sheet.write_string(2, 0, "15.11.2022").unwrap();
    sheet.write_string(2, 1, "SUV").unwrap();
    sheet.write_string(2, 2, "<50k").unwrap();
    sheet.write_string(2, 3, "0-2").unwrap();
    sheet.write_number(2, 4, 40_000.0).unwrap();
    workbook.save(&path).unwrap();

    let dataset = load_file(&path, &cols).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[1].asking_price, None);

    let dash = Dashboard::new(Arc::new(dataset));
    let [median, delta, _] = dash.tiles(&FilterSelection::default());
    assert_eq!(median.value, "44000.00 €");
    assert_eq!(delta.value, "10.00%");
    let rows = dash.table(&FilterSelection::default());
    let quarters: Vec<&str> = rows.iter().map(|r| r.quarter.as_str()).collect();
    assert_eq!(quarters, ["2022Q4", "2023Q4"]);
}

#[test]
fn corrupt_workbook_is_a_spreadsheet_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(&dir, "Preise.xlsx", "not a zip archive");
    let err = load_file(&path, &ColumnMapping::default()).unwrap_err();
    assert!(matches!(err, LoadError::Spreadsheet(_)));
}

// ---------------------------------------------------------------------------
// Parquet source
// ---------------------------------------------------------------------------

#[test]
fn parquet_file_with_timestamps_and_integer_prices() {
    let cols = ColumnMapping::default();
    let schema = Arc::new(Schema::new(vec![
        Field::new(
            &cols.sale_date,
            DataType::Timestamp(TimeUnit::Millisecond, None),
            true,
        ),
        Field::new(&cols.category, DataType::Utf8, true),
        Field::new(&cols.mileage, DataType::Utf8, true),
        Field::new(&cols.age, DataType::Utf8, true),
        Field::new(&cols.sale_price, DataType::Int64, true),
        Field::new(&cols.asking_price, DataType::Float64, true),
    ]));

    // 2023-01-15, 2022-10-15 and 2022-11-15 at midnight UTC.
    let columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampMillisecondArray::from(vec![
            1_673_740_800_000,
            1_665_792_000_000,
            1_668_470_400_000,
        ])),
        Arc::new(StringArray::from(vec![Some("SUV"), None, Some("SUV")])),
        Arc::new(StringArray::from(vec!["<50k", "<50k", "<50k"])),
        Arc::new(StringArray::from(vec!["0-2", "0-2", "0-2"])),
        Arc::new(Int64Array::from(vec![Some(42_000), Some(41_000), None])),
        Arc::new(Float64Array::from(vec![Some(45_000.0), None, Some(43_000.0)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.parquet");
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let dataset = load_file(&path, &cols).unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.records()[1].category, None);
    assert_eq!(dataset.records()[2].sale_price, None);

    let dash = Dashboard::new(Arc::new(dataset));
    let rows = dash.table(&FilterSelection::default());
    let quarters: Vec<&str> = rows.iter().map(|r| r.quarter.as_str()).collect();
    assert_eq!(quarters, ["2022Q4", "2023Q1"]);
    assert_eq!(rows[0].median_price, Some(41_000.0));

    let chart = dash.chart(&FilterSelection::default());
    assert_eq!(chart.asking_price, [Some(43_000.0), Some(45_000.0)]);
}

#[test]
fn parquet_without_rows_still_reports_missing_column() {
    let cols = ColumnMapping::default();
    let schema = Arc::new(Schema::new(vec![
        Field::new(&cols.sale_date, DataType::Date32, true),
        Field::new(&cols.category, DataType::Utf8, true),
    ]));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.parquet");
    let file = std::fs::File::create(&path).unwrap();
    ArrowWriter::try_new(file, schema, None).unwrap().close().unwrap();

    let err = load_file(&path, &cols).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Kilometer_cat"));
}
