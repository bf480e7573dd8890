use std::collections::BTreeMap;

use super::filter::FilteredView;
use super::model::{Quarter, Record};
use crate::config::{CURRENT_QUARTER, PREVIOUS_QUARTER};

// ---------------------------------------------------------------------------
// Median
// ---------------------------------------------------------------------------

/// Median of the non-NaN values, `None` when there are none.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// Quarterly series
// ---------------------------------------------------------------------------

/// Per-quarter medians. Either may be absent when every record of the
/// quarter lacks that price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuarterMedians {
    pub sale_price: Option<f64>,
    pub asking_price: Option<f64>,
}

/// Quarter → medians, iterated chronologically.
pub type QuarterlyAggregate = BTreeMap<Quarter, QuarterMedians>;

/// Group the view by quarter and take the median of both price fields.
///
/// Missing prices are skipped per field; the record still counts for the
/// other field.
pub fn quarterly_series(view: &FilteredView<'_>) -> QuarterlyAggregate {
    let mut groups: BTreeMap<Quarter, Vec<&Record>> = BTreeMap::new();
    for record in view.records() {
        groups.entry(record.quarter()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(quarter, records)| {
            let medians = QuarterMedians {
                sale_price: median(records.iter().filter_map(|r| r.sale_price)),
                asking_price: median(records.iter().filter_map(|r| r.asking_price)),
            };
            (quarter, medians)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Comparison tiles
// ---------------------------------------------------------------------------

/// Year-over-year comparison of the median sale price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonTiles {
    pub current_quarter: Quarter,
    pub previous_quarter: Quarter,
    pub current_median: Option<f64>,
    pub previous_median: Option<f64>,
    /// Percent change from previous to current median.
    pub delta_percent: Option<f64>,
    /// Records in the current quarter only.
    pub current_count: usize,
}

/// Compare the fixed reference quarters (2023Q4 against 2022Q4).
pub fn comparison_tiles(view: &FilteredView<'_>) -> ComparisonTiles {
    comparison_tiles_between(view, CURRENT_QUARTER, PREVIOUS_QUARTER)
}

pub fn comparison_tiles_between(
    view: &FilteredView<'_>,
    current: Quarter,
    previous: Quarter,
) -> ComparisonTiles {
    let mut current_prices = Vec::new();
    let mut previous_prices = Vec::new();
    let mut current_count = 0;

    for record in view.records() {
        let quarter = record.quarter();
        if quarter == current {
            current_count += 1;
            current_prices.extend(record.sale_price);
        } else if quarter == previous {
            previous_prices.extend(record.sale_price);
        }
    }

    let current_median = median(current_prices);
    let previous_median = median(previous_prices);

    ComparisonTiles {
        current_quarter: current,
        previous_quarter: previous,
        current_median,
        previous_median,
        delta_percent: percent_change(previous_median, current_median),
        current_count,
    }
}

/// `(current - previous) / previous * 100`, absent on a missing or zero base.
pub fn percent_change(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (previous, current) {
        (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev * 100.0),
        _ => None,
    }
}

/// Total records in the view.
pub fn count(view: &FilteredView<'_>) -> usize {
    view.len()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::{filter, FilterSelection, Selection};
    use crate::data::model::Dataset;

    fn sale(y: i32, m: u32, category: &str, asking: Option<f64>, price: Option<f64>) -> Record {
        Record::new(
            NaiveDate::from_ymd_opt(y, m, 15).unwrap(),
            Some(category.to_string()),
            Some("<50k".to_string()),
            Some("0-2".to_string()),
            asking,
            price,
        )
    }

    #[test]
    fn median_of_odd_even_and_empty_sets() {
        assert_eq!(median([100.0, 200.0, 300.0]), Some(200.0));
        assert_eq!(median([300.0, 100.0, 200.0, 400.0]), Some(250.0));
        assert_eq!(median(Vec::<f64>::new()), None);
        assert_eq!(median([f64::NAN]), None);
        assert_eq!(median([f64::NAN, 5.0]), Some(5.0));
    }

    #[test]
    fn percent_change_ten_percent() {
        let delta = percent_change(Some(40_000.0), Some(44_000.0)).unwrap();
        assert_eq!(format!("{delta:.2}"), "10.00");
    }

    #[test]
    fn percent_change_absent_cases() {
        assert_eq!(percent_change(None, Some(44_000.0)), None);
        assert_eq!(percent_change(Some(0.0), Some(44_000.0)), None);
        assert_eq!(percent_change(Some(40_000.0), None), None);
        assert_eq!(percent_change(None, None), None);
    }

    #[test]
    fn quarterly_series_is_chronological_and_skips_missing_per_field() {
        let ds = Dataset::from_records(vec![
            sale(2023, 2, "SUV", Some(52_000.0), Some(48_000.0)),
            sale(2022, 11, "SUV", Some(45_000.0), None),
            sale(2022, 11, "SUV", None, Some(41_000.0)),
            sale(2022, 2, "SUV", Some(40_000.0), Some(38_000.0)),
            sale(2023, 2, "SUV", Some(54_000.0), Some(50_000.0)),
        ]);
        let series = quarterly_series(&filter(&ds, &FilterSelection::default()));

        let quarters: Vec<Quarter> = series.keys().copied().collect();
        assert!(quarters.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            quarters,
            [Quarter::new(2022, 1), Quarter::new(2022, 4), Quarter::new(2023, 1)]
        );

        let q4 = series[&Quarter::new(2022, 4)];
        assert_eq!(q4.sale_price, Some(41_000.0));
        assert_eq!(q4.asking_price, Some(45_000.0));

        let q1 = series[&Quarter::new(2023, 1)];
        assert_eq!(q1.sale_price, Some(49_000.0));
        assert_eq!(q1.asking_price, Some(53_000.0));
    }

    #[test]
    fn quarter_with_no_prices_reports_absent_medians() {
        let ds = Dataset::from_records(vec![sale(2023, 5, "SUV", None, None)]);
        let series = quarterly_series(&filter(&ds, &FilterSelection::default()));
        let q = series[&Quarter::new(2023, 2)];
        assert_eq!(q.sale_price, None);
        assert_eq!(q.asking_price, None);
    }

    #[test]
    fn comparison_tiles_use_fixed_quarters() {
        let ds = Dataset::from_records(vec![
            sale(2022, 10, "SUV", None, Some(40_000.0)),
            sale(2022, 12, "SUV", None, Some(40_000.0)),
            sale(2023, 10, "SUV", None, Some(44_000.0)),
            sale(2023, 11, "SUV", None, None),
            sale(2023, 12, "SUV", None, Some(44_000.0)),
            sale(2023, 6, "SUV", None, Some(99_000.0)),
        ]);
        let view = filter(&ds, &FilterSelection::default());
        let tiles = comparison_tiles(&view);

        assert_eq!(tiles.current_median, Some(44_000.0));
        assert_eq!(tiles.previous_median, Some(40_000.0));
        assert_eq!(format!("{:.2}", tiles.delta_percent.unwrap()), "10.00");
        assert_eq!(tiles.current_count, 3);
        assert_eq!(count(&view), 6);
    }

    #[test]
    fn comparison_without_previous_quarter_has_no_delta() {
        let ds = Dataset::from_records(vec![sale(2023, 10, "SUV", None, Some(44_000.0))]);
        let tiles = comparison_tiles(&filter(&ds, &FilterSelection::default()));
        assert_eq!(tiles.current_median, Some(44_000.0));
        assert_eq!(tiles.previous_median, None);
        assert_eq!(tiles.delta_percent, None);
        assert_eq!(tiles.current_count, 1);
    }

    #[test]
    fn unknown_category_gives_empty_tiles() {
        let ds = Dataset::from_records(vec![
            sale(2022, 10, "SUV", None, Some(40_000.0)),
            sale(2023, 10, "SUV", None, Some(44_000.0)),
        ]);
        let sel = FilterSelection {
            category: Selection::Only("Cabrio".into()),
            ..Default::default()
        };
        let view = filter(&ds, &sel);
        let tiles = comparison_tiles(&view);
        assert_eq!(tiles.current_count, 0);
        assert_eq!(tiles.current_median, None);
        assert_eq!(tiles.previous_median, None);
        assert_eq!(tiles.delta_percent, None);
        assert!(quarterly_series(&view).is_empty());
    }

    #[test]
    fn aggregation_is_repeatable() {
        let ds = Dataset::from_records(vec![
            sale(2022, 10, "SUV", Some(1.0), Some(40_000.0)),
            sale(2023, 10, "Kombi", Some(2.0), Some(44_000.0)),
        ]);
        let view = filter(&ds, &FilterSelection::default());
        assert_eq!(quarterly_series(&view), quarterly_series(&view));
        assert_eq!(comparison_tiles(&view), comparison_tiles(&view));
    }
}
