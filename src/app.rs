use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PriceAnalyzerApp {
    pub state: AppState,
}

impl PriceAnalyzerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for PriceAnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: filters, tiles, chart, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    panels::header(ui, &self.state);
                    panels::filter_bar(ui, &mut self.state);
                    ui.add_space(8.0);
                    panels::tiles_row(ui, &self.state);

                    ui.add_space(24.0);
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.heading("Preisentwicklung seit Q1/2022");
                    });
                    plot::price_plot(ui, &self.state.view.chart);
                    ui.label(self.state.view.chart.entries_label());

                    ui.add_space(24.0);
                    table::median_table(ui, &mut self.state);
                });
        });
    }
}
