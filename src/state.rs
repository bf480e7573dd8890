use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use price_analyzer::data::dashboard::{Dashboard, DashboardView};
use price_analyzer::data::filter::{FilterSelection, Selection};
use price_analyzer::data::format::write_csv;
use price_analyzer::data::model::Dimension;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The UI state of one window, independent of rendering.
pub struct AppState {
    /// Shared read-only dataset and the pipeline over it.
    pub dashboard: Dashboard,

    /// Current dropdown selections.
    pub selection: FilterSelection,

    /// Outputs for `selection` (cached).
    pub view: DashboardView,

    /// Banner image shown above the filters.
    pub header_image: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, header_image: Option<PathBuf>) -> Self {
        let selection = FilterSelection::default();
        let view = dashboard.view(&selection);
        Self {
            dashboard,
            selection,
            view,
            header_image,
            status_message: None,
        }
    }

    /// Change one dropdown and recompute every output.
    pub fn select(&mut self, dimension: Dimension, selection: Selection) {
        if self.selection.get(dimension) == &selection {
            return;
        }
        log::debug!("{dimension:?} → {selection}");
        self.selection.set(dimension, selection);
        self.view = self.dashboard.view(&self.selection);
    }

    /// Write the current median table to `path` as CSV.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_csv(&self.view.table, BufWriter::new(file))
            .with_context(|| format!("writing CSV to {}", path.display()))?;
        log::info!(
            "Exported {} quarters to {}",
            self.view.table.len(),
            path.display()
        );
        Ok(())
    }
}
