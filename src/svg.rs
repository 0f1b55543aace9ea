//! SVG snapshot of a [`RenderPlan`]. No external dependencies.

use crate::color::to_hex;
use crate::curve::sample_series;
use crate::plan::RenderPlan;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 90.0;
const MAX_X_LABELS: usize = 12;
const Y_TICKS: usize = 6;
const POINT_RADIUS: f64 = 4.0;
const STROKE_WIDTH: f64 = 2.0;
const FILL_OPACITY: f64 = 0.2;

/// Escape text for XML content and attribute values.
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Generate "nice" tick values covering [min, max] with roughly
/// max_ticks steps. The first tick is <= min and the last >= max.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let range = if max > min { max - min } else { 1.0 };
    let raw_step = range / (max_ticks.max(1) as f64);
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };
    let start = (min / step).floor() * step;
    let end = ((max / step).ceil() * step).max(start + step);
    let mut ticks = Vec::new();
    let mut v = start;
    while v <= end + step * 1e-3 {
        ticks.push(v);
        v += step;
    }
    ticks
}

/// Decade ticks (powers of ten) covering [min, max]; both must be > 0.
fn log_ticks(min: f64, max: f64) -> Vec<f64> {
    let lo = min.log10().floor() as i32;
    let hi = (max.log10().ceil() as i32).max(lo + 1);
    (lo..=hi).map(|e| 10f64.powi(e)).collect()
}

/// Tick label: integers without decimals, others with at most three.
pub fn format_tick(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Render `plan` as a standalone SVG document of `width` x `height` px.
pub fn render_svg(plan: &RenderPlan, width: u32, height: u32) -> String {
    let (w, h) = (width as f64, height as f64);
    let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
    let font = xml_escape(plan.font_family);
    let fs = plan.font_size as f64;
    let chrome = &plan.chrome;

    let axis = &plan.y_axis;
    let ticks = match (axis.range, axis.log_scale) {
        (Some((lo, hi)), true) => log_ticks(lo, hi),
        (None, true) => log_ticks(1.0, 10.0),
        (Some((lo, hi)), false) => nice_ticks(lo, hi, Y_TICKS),
        (None, false) => nice_ticks(0.0, 1.0, Y_TICKS),
    };
    // Plot-space bounds, in axis units (log10 on a log axis).
    let y_min = ticks.first().map_or(0.0, |t| axis.to_axis(*t));
    let y_max = ticks.last().map_or(1.0, |t| axis.to_axis(*t));
    let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

    let n = plan.category_values.len();
    let x_px = |i: f64| {
        if n <= 1 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + i / (n - 1) as f64 * plot_w
        }
    };
    // Takes an axis-space position, not a raw value.
    let y_px = |a: f64| MARGIN_TOP + plot_h - (a - y_min) / y_span * plot_h;

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\" font-family=\"{font}\" font-size=\"{fs}\">\n"
    ));
    out.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        to_hex(chrome.background)
    ));

    if !plan.title.is_empty() {
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"{}\" \
             font-weight=\"bold\" fill=\"{}\">{}</text>\n",
            w / 2.0,
            MARGIN_TOP / 2.0 + fs / 2.0,
            fs * 1.5,
            to_hex(chrome.title),
            xml_escape(&plan.title)
        ));
    }

    // Grid and y ticks
    let grid = to_hex(chrome.grid);
    let axis_color = to_hex(chrome.axis);
    for t in &ticks {
        let y = y_px(axis.to_axis(*t));
        out.push_str(&format!(
            "<line x1=\"{MARGIN_LEFT:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" \
             stroke=\"{grid}\" stroke-dasharray=\"3 3\"/>\n",
            MARGIN_LEFT + plot_w
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" fill=\"{axis_color}\">{}</text>\n",
            MARGIN_LEFT - 6.0,
            y + fs / 3.0,
            format_tick(*t)
        ));
    }

    // X tick labels, thinned to at most MAX_X_LABELS
    let stride = n.div_ceil(MAX_X_LABELS).max(1);
    for (i, label) in plan.category_labels().iter().enumerate().step_by(stride) {
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{axis_color}\">{}</text>\n",
            x_px(i as f64),
            MARGIN_TOP + plot_h + fs + 6.0,
            xml_escape(label)
        ));
    }

    // Axes
    out.push_str(&format!(
        "<path d=\"M{MARGIN_LEFT:.1} {MARGIN_TOP:.1} V{:.1} H{:.1}\" fill=\"none\" stroke=\"{axis_color}\"/>\n",
        MARGIN_TOP + plot_h,
        MARGIN_LEFT + plot_w
    ));
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{axis_color}\">{}</text>\n",
        MARGIN_LEFT + plot_w / 2.0,
        MARGIN_TOP + plot_h + fs * 2.0 + 14.0,
        xml_escape(&plan.x_axis.label)
    ));
    let y_label_y = MARGIN_TOP + plot_h / 2.0;
    out.push_str(&format!(
        "<text x=\"18\" y=\"{y_label_y:.1}\" text-anchor=\"middle\" \
         transform=\"rotate(-90 18 {y_label_y:.1})\" fill=\"{axis_color}\">{}</text>\n",
        xml_escape(&plan.y_axis.label)
    ));

    // Series, sampled in axis space
    let base_px = y_px(axis.to_axis(axis.baseline())).clamp(MARGIN_TOP, MARGIN_TOP + plot_h);
    for series in &plan.series {
        let color = to_hex(series.color);
        let positions: Vec<Option<f64>> =
            series.values.iter().map(|v| v.map(|v| axis.to_axis(v))).collect();
        for seg in sample_series(&positions, series.interpolation) {
            let mut d = String::new();
            for (j, [x, y]) in seg.iter().enumerate() {
                let cmd = if j == 0 { 'M' } else { 'L' };
                d.push_str(&format!("{cmd}{:.2} {:.2} ", x_px(*x), y_px(*y)));
            }
            if series.fill {
                if let (Some(first), Some(last)) = (seg.first(), seg.last()) {
                    out.push_str(&format!(
                        "<path d=\"{}L{:.2} {base_px:.2} L{:.2} {base_px:.2} Z\" fill=\"{color}\" \
                         fill-opacity=\"{FILL_OPACITY}\" stroke=\"none\"/>\n",
                        d,
                        x_px(last[0]),
                        x_px(first[0])
                    ));
                }
            }
            out.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{STROKE_WIDTH}\"/>\n",
                d.trim_end()
            ));
        }
        if series.show_points {
            for (i, v) in series.values.iter().enumerate() {
                if let Some(v) = v.filter(|v| v.is_finite()) {
                    out.push_str(&format!(
                        "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{POINT_RADIUS}\" fill=\"{}\" \
                         stroke=\"{color}\" stroke-width=\"{STROKE_WIDTH}\"/>\n",
                        x_px(i as f64),
                        y_px(axis.to_axis(v)),
                        to_hex(chrome.background)
                    ));
                }
            }
        }
    }

    // Legend
    let legend_y = h - 20.0;
    let mut lx = MARGIN_LEFT;
    for series in &plan.series {
        out.push_str(&format!(
            "<rect x=\"{lx:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>\n",
            legend_y - 10.0,
            to_hex(series.color)
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{legend_y:.1}\" fill=\"{axis_color}\">{}</text>\n",
            lx + 16.0,
            xml_escape(&series.column)
        ));
        lx += 16.0 + series.column.chars().count() as f64 * fs * 0.6 + 20.0;
    }

    out.push_str("</svg>\n");
    out
}
