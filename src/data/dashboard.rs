use std::sync::Arc;

use super::aggregate::{comparison_tiles, count, quarterly_series};
use super::filter::{filter, FilterSelection};
use super::format::{format_chart, format_table, format_tiles, ChartSeries, TableRow, Tile};
use super::model::Dataset;

/// Entry points for the UI: one recomputation per selection, no state kept
/// between calls. Cheap to clone; every clone shares the same dataset.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
}

/// All three outputs for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub tiles: [Tile; 3],
    pub chart: ChartSeries,
    pub table: Vec<TableRow>,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Dashboard { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn tiles(&self, selection: &FilterSelection) -> [Tile; 3] {
        let view = filter(&self.dataset, selection);
        format_tiles(&comparison_tiles(&view))
    }

    /// Price series plus the record count for the `n =` annotation.
    pub fn chart(&self, selection: &FilterSelection) -> ChartSeries {
        let view = filter(&self.dataset, selection);
        format_chart(&quarterly_series(&view), count(&view))
    }

    pub fn table(&self, selection: &FilterSelection) -> Vec<TableRow> {
        let view = filter(&self.dataset, selection);
        format_table(&quarterly_series(&view))
    }

    /// Filter once and derive every output from the same view.
    pub fn view(&self, selection: &FilterSelection) -> DashboardView {
        let view = filter(&self.dataset, selection);
        let series = quarterly_series(&view);
        DashboardView {
            tiles: format_tiles(&comparison_tiles(&view)),
            chart: format_chart(&series, count(&view)),
            table: format_table(&series),
        }
    }
}
