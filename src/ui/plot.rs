use eframe::egui::{Color32, Ui};
use egui_plot::{Corner, GridMark, Legend, Line, Plot, PlotBounds, PlotPoints, Points};

use price_analyzer::data::format::ChartSeries;

const SALE_PRICE_COLOR: Color32 = Color32::from_rgb(0xb2, 0x21, 0x22);
const ASKING_PRICE_COLOR: Color32 = Color32::from_rgb(0x14, 0x1f, 0x52);

// ---------------------------------------------------------------------------
// Price chart (central panel)
// ---------------------------------------------------------------------------

/// Render median sale and asking price per quarter on a fixed price axis.
pub fn price_plot(ui: &mut Ui, chart: &ChartSeries) {
    let bounds = fixed_bounds(chart);
    let ticks = chart.y_ticks.clone();
    let tick_step = ticks
        .windows(2)
        .map(|w| w[1] - w[0])
        .next()
        .unwrap_or(10_000.0);
    let quarters = chart.quarters.clone();
    let n_quarters = quarters.len();

    Plot::new("price_plot")
        .height(360.0)
        .legend(Legend::default().position(Corner::LeftTop))
        .auto_bounds([false, false])
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_double_click_reset(false)
        .y_grid_spacer(move |_input| {
            ticks
                .iter()
                .map(|&value| GridMark {
                    value,
                    step_size: tick_step,
                })
                .collect()
        })
        .x_grid_spacer(move |_input| {
            (0..n_quarters)
                .map(|i| GridMark {
                    value: i as f64,
                    step_size: 1.0,
                })
                .collect()
        })
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if idx < 0.0 || (mark.value - idx).abs() > f64::EPSILON {
                return String::new();
            }
            quarters.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(bounds);
            for (name, values, color) in [
                ("Verkaufspreis", &chart.sale_price, SALE_PRICE_COLOR),
                ("Wunschpreis", &chart.asking_price, ASKING_PRICE_COLOR),
            ] {
                for segment in segments(values) {
                    let points: PlotPoints = segment.clone().into();
                    plot_ui.line(Line::new(points).name(name).color(color).width(4.0));
                    plot_ui.points(
                        Points::new(PlotPoints::from(segment))
                            .name(name)
                            .color(color)
                            .radius(4.0),
                    );
                }
            }
        });
}

/// Plot window: one slot per quarter on x, the configured price range on y.
/// Medians outside the y range are clipped rather than stretching the axis.
fn fixed_bounds(chart: &ChartSeries) -> PlotBounds {
    let (y_min, y_max) = chart.y_range;
    let slots = chart.quarters.len().max(1) as f64;
    PlotBounds::from_min_max([-0.5, y_min], [slots - 0.5, y_max])
}

/// Split a series into runs of consecutive present values, so a missing
/// median leaves a gap instead of being drawn as zero.
fn segments(values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(y) => current.push([i as f64, *y]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
