use eframe::egui::{Ui, Vec2};
use egui_extras::{Column, TableBuilder};

use price_analyzer::data::format::TABLE_HEADERS;

use crate::state::AppState;
use crate::ui::panels::save_csv_dialog;

/// Median sale price per quarter, with the CSV download button.
pub fn median_table(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("Medianpreise pro Quartal");
    });
    ui.add_space(8.0);

    let [quarter_header, price_header] = TABLE_HEADERS;

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::initial(160.0))
        .column(Column::remainder())
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong(quarter_header);
            });
            header.col(|ui| {
                ui.strong(price_header);
            });
        })
        .body(|mut body| {
            for row in &state.view.table {
                body.row(20.0, |mut cells| {
                    cells.col(|ui| {
                        ui.label(row.quarter.as_str());
                    });
                    cells.col(|ui| {
                        // Blank cell for a quarter without sale prices, as in the CSV.
                        let text = row
                            .median_price
                            .map(|m| format!("{m:.2}"))
                            .unwrap_or_default();
                        ui.label(text);
                    });
                });
            }
        });

    ui.add_space(8.0);
    if ui
        .add_sized(Vec2::new(140.0, 28.0), eframe::egui::Button::new("Download Data"))
        .clicked()
    {
        save_csv_dialog(state);
    }
}
