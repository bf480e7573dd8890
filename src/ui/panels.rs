use eframe::egui::{self, Color32, RichText, Ui};

use price_analyzer::data::filter::{Selection, ALL_VALUES_LABEL};
use price_analyzer::data::model::Dimension;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Header image
// ---------------------------------------------------------------------------

/// Render the optional banner image (centered).
pub fn header(ui: &mut Ui, state: &AppState) {
    let Some(path) = &state.header_image else {
        return;
    };
    let uri = format!("file://{}", path.display());
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add(
            egui::Image::new(uri)
                .max_width(ui.available_width())
                .max_height(160.0),
        );
    });
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Filter dropdowns
// ---------------------------------------------------------------------------

/// One dropdown per dimension; the "Total" entry clears the constraint.
pub fn filter_bar(ui: &mut Ui, state: &mut AppState) {
    // Collect options first so the state can be mutated afterwards.
    let options: Vec<(Dimension, Vec<String>)> = Dimension::ALL
        .iter()
        .map(|&dim| {
            let values = state
                .dashboard
                .dataset()
                .options(dim)
                .map(str::to_string)
                .collect();
            (dim, values)
        })
        .collect();

    let mut changes: Vec<(Dimension, Selection)> = Vec::new();

    ui.columns(options.len(), |cols: &mut [Ui]| {
        for (ui, (dim, values)) in cols.iter_mut().zip(&options) {
            let current = state.selection.get(*dim);
            ui.vertical_centered(|ui: &mut Ui| {
                ui.heading(dim.label());
            });
            egui::ComboBox::from_id_salt(dim.label())
                .selected_text(current.to_string())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for value in values {
                        let is_current = matches!(current, Selection::Only(v) if v == value);
                        if ui.selectable_label(is_current, value.as_str()).clicked() {
                            changes.push((*dim, Selection::Only(value.clone())));
                        }
                    }
                    if ui
                        .selectable_label(*current == Selection::All, ALL_VALUES_LABEL)
                        .clicked()
                    {
                        changes.push((*dim, Selection::All));
                    }
                });
        }
    });

    for (dim, selection) in changes {
        state.select(dim, selection);
    }
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// Render the three summary tiles side by side.
pub fn tiles_row(ui: &mut Ui, state: &AppState) {
    let tiles = &state.view.tiles;
    ui.columns(tiles.len(), |cols: &mut [Ui]| {
        for (ui, tile) in cols.iter_mut().zip(tiles) {
            egui::Frame::group(ui.style())
                .fill(Color32::from_gray(240))
                .show(ui, |ui: &mut Ui| {
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.strong(tile.label.as_str());
                        ui.label(RichText::new(tile.value.as_str()).size(20.0));
                    });
                });
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export CSV…").clicked() {
                save_csv_dialog(state);
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        ui.label(format!(
            "{} sales loaded, {} selected",
            state.dashboard.dataset().len(),
            state.view.chart.entries
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export median prices")
        .add_filter("CSV", &["csv"])
        .set_file_name("median_prices.csv")
        .save_file();

    if let Some(path) = file {
        match state.export_csv(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export CSV: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
