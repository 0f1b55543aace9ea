use eframe::egui::{self, RichText, Slider, Ui};
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints, PlotUi, Points, VLine};

use chart_studio::ChartState;
use chart_studio::curve::{sample_series, segments};
use chart_studio::plan::{RenderPlan, SeriesPlan, ValueAxisDescriptor};
use chart_studio::svg::format_tick;

use super::{UiState, color32};

const BRUSH_HEIGHT: f32 = 48.0;
const LINE_WIDTH: f32 = 2.0;
const POINT_RADIUS: f32 = 3.5;

// ---------------------------------------------------------------------------
// Line chart (central panel)
// ---------------------------------------------------------------------------

/// Render the chart for the current plan in the central panel.
pub fn chart(ui: &mut Ui, state: &ChartState, view: &mut UiState) {
    let Some(plan) = state.current_render_plan() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.loading {
                ui.spinner();
            } else {
                ui.heading("Open a file or load the sample data  (File → Open…)");
            }
        });
        return;
    };

    let chrome = &plan.chrome;
    let frame = egui::Frame::default()
        .fill(color32(chrome.background))
        .inner_margin(12.0)
        .show(ui, |ui: &mut Ui| {
            ui.visuals_mut().override_text_color = Some(color32(chrome.axis));

            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(
                    RichText::new(&plan.title)
                        .size(plan.font_size * 1.5)
                        .strong()
                        .color(color32(chrome.title)),
                );
            });

            if plan.is_empty() {
                ui.label("No columns selected.");
            }

            let height = (ui.available_height() - BRUSH_HEIGHT - 40.0).max(160.0);
            line_plot(ui, plan, view, height);
            brush(ui, plan, view);
        });

    view.chart_rect = Some(frame.response.rect);
}

fn line_plot(ui: &mut Ui, plan: &RenderPlan, view: &mut UiState, height: f32) {
    let labels = plan.category_labels();
    let n = labels.len();
    let (first, last) = view.brush_window(n);
    let y_axis = plan.y_axis.clone();
    let tooltip_axis = plan.y_axis.clone();

    Plot::new("line_chart")
        .height(height)
        .legend(Legend::default())
        .show_background(false)
        .x_axis_label(plan.x_axis.label.clone())
        .y_axis_label(plan.y_axis.label.clone())
        .x_axis_formatter(move |mark, _range| category_tick(&labels, mark.value))
        .y_axis_formatter(move |mark, _range| value_tick(&y_axis, mark.value))
        .label_formatter(move |name, value| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}: {:.2}", tooltip_axis.from_axis(value.y))
            }
        })
        .show(ui, |plot_ui: &mut PlotUi| {
            if view.brush_dirty {
                let (lo, hi) = plan.y_axis.range.unwrap_or((0.0, 1.0));
                let (lo, hi) = (plan.y_axis.to_axis(lo), plan.y_axis.to_axis(hi));
                let pad = ((hi - lo) * 0.05).max(0.5);
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [first as f64 - 0.5, lo - pad],
                    [last as f64 + 0.5, hi + pad],
                ));
                view.brush_dirty = false;
            }
            for series in &plan.series {
                draw_series(plot_ui, series, &plan.y_axis);
            }
        });
}

/// Tick label for `x`: the category at that row, blank between rows.
fn category_tick(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

/// Y tick label for an axis-space position. Log axes only label decades.
fn value_tick(axis: &ValueAxisDescriptor, position: f64) -> String {
    if !axis.log_scale {
        return format_tick(position);
    }
    if (position - position.round()).abs() > 1e-6 {
        return String::new();
    }
    format_tick(axis.from_axis(position.round()))
}

/// Series values mapped to axis space.
fn axis_positions(series: &SeriesPlan, axis: &ValueAxisDescriptor) -> Vec<Option<f64>> {
    series.values.iter().map(|v| v.map(|v| axis.to_axis(v))).collect()
}

fn draw_series(plot_ui: &mut PlotUi, series: &SeriesPlan, axis: &ValueAxisDescriptor) {
    let color = color32(series.color);
    let positions = axis_positions(series, axis);
    let baseline = axis.to_axis(axis.baseline()) as f32;

    // Every segment shares the column name so the legend shows one entry.
    for seg in sample_series(&positions, series.interpolation) {
        let mut line = Line::new(PlotPoints::from(seg))
            .name(&series.column)
            .color(color)
            .width(LINE_WIDTH);
        if series.fill {
            line = line.fill(baseline);
        }
        plot_ui.line(line);
    }

    if series.show_points {
        let points: Vec<[f64; 2]> = positions
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| [i as f64, v]))
            .collect();
        plot_ui.points(
            Points::new(PlotPoints::from(points))
                .name(&series.column)
                .color(color)
                .radius(POINT_RADIUS)
                .filled(true),
        );
    }
}

// ---------------------------------------------------------------------------
// Range brush
// ---------------------------------------------------------------------------

/// Overview strip of the first series with a draggable category window.
fn brush(ui: &mut Ui, plan: &RenderPlan, view: &mut UiState) {
    let n = plan.category_values.len();
    if n < 2 {
        return;
    }
    let stroke = color32(plan.chrome.brush);
    let (mut first, mut last) = view.brush_window(n);

    Plot::new("range_brush")
        .height(BRUSH_HEIGHT)
        .show_axes([false, false])
        .show_grid(false)
        .show_background(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui: &mut PlotUi| {
            if let Some(series) = plan.series.first() {
                for seg in segments(&axis_positions(series, &plan.y_axis)) {
                    plot_ui.line(Line::new(PlotPoints::from(seg)).color(stroke.gamma_multiply(0.5)));
                }
            }
            plot_ui.vline(VLine::new(first as f64).color(stroke).width(LINE_WIDTH));
            plot_ui.vline(VLine::new(last as f64).color(stroke).width(LINE_WIDTH));
        });

    let labels = plan.category_labels();
    let format = |v: f64, _: std::ops::RangeInclusive<usize>| {
        labels.get(v as usize).cloned().unwrap_or_default()
    };

    ui.horizontal(|ui: &mut Ui| {
        let mut changed = ui
            .add(Slider::new(&mut first, 0..=n - 1).text("from").custom_formatter(format))
            .changed();
        changed |= ui
            .add(Slider::new(&mut last, 0..=n - 1).text("to").custom_formatter(format))
            .changed();
        if changed {
            view.brush = Some((first.min(last), first.max(last)));
            view.brush_dirty = true;
        }
        if ui.button("Reset").clicked() {
            view.brush = None;
            view.brush_dirty = true;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tick() {
        let labels = vec!["2023-01".to_string(), "2023-02".to_string()];
        assert_eq!(category_tick(&labels, 1.0), "2023-02");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, -1.0), "");
        assert_eq!(category_tick(&labels, 5.0), "");
    }

    #[test]
    fn test_value_tick_on_log_axis() {
        let mut axis = ValueAxisDescriptor {
            label: "Value".into(),
            range: Some((10.0, 1000.0)),
            log_scale: true,
        };
        assert_eq!(value_tick(&axis, 2.0), "100");
        assert_eq!(value_tick(&axis, 2.5), "");
        axis.log_scale = false;
        assert_eq!(value_tick(&axis, 2.5), "2.5");
    }
}
