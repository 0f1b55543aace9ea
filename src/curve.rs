//! Turns a series' values into drawable polylines for each
//! [`LineInterpolation`] mode. Shared by the on-screen plot and the SVG
//! snapshot so both draw the same shape.

use crate::config::LineInterpolation;

/// Samples per span between two data points for curved modes.
pub const SAMPLES_PER_SPAN: usize = 12;

pub type Point = [f64; 2];

/// Polylines for `values`, with x = row index. Gaps (`None`) split the
/// series into independent segments.
pub fn sample_series(values: &[Option<f64>], mode: LineInterpolation) -> Vec<Vec<Point>> {
    segments(values)
        .into_iter()
        .map(|seg| match mode {
            LineInterpolation::Linear => seg,
            LineInterpolation::Step => step(&seg),
            LineInterpolation::Monotone => monotone(&seg),
            LineInterpolation::Basis => basis(&seg),
        })
        .collect()
}

/// Runs of consecutive finite values.
pub fn segments(values: &[Option<f64>]) -> Vec<Vec<Point>> {
    let mut out = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(y) if y.is_finite() => current.push([i as f64, *y]),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Midpoint step: the value changes halfway between two x positions.
fn step(points: &[Point]) -> Vec<Point> {
    let mut out = Vec::with_capacity(points.len() * 3);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            let prev = points[i - 1];
            let mid = (prev[0] + p[0]) / 2.0;
            out.push([mid, prev[1]]);
            out.push([mid, p[1]]);
        }
        out.push(*p);
    }
    out
}

/// Monotone cubic Hermite (Fritsch–Carlson): smooth, passes through every
/// point and never overshoots between them.
fn monotone(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let deltas: Vec<f64> = points
        .windows(2)
        .map(|w| (w[1][1] - w[0][1]) / (w[1][0] - w[0][0]))
        .collect();

    let mut tangents = vec![0.0; n];
    tangents[0] = deltas[0];
    tangents[n - 1] = deltas[n - 2];
    for k in 1..n - 1 {
        tangents[k] = if deltas[k - 1] * deltas[k] <= 0.0 {
            0.0
        } else {
            (deltas[k - 1] + deltas[k]) / 2.0
        };
    }

    for k in 0..n - 1 {
        if deltas[k] == 0.0 {
            tangents[k] = 0.0;
            tangents[k + 1] = 0.0;
            continue;
        }
        let a = tangents[k] / deltas[k];
        let b = tangents[k + 1] / deltas[k];
        let s = a * a + b * b;
        if s > 9.0 {
            let tau = 3.0 / s.sqrt();
            tangents[k] = tau * a * deltas[k];
            tangents[k + 1] = tau * b * deltas[k];
        }
    }

    let mut out = Vec::with_capacity((n - 1) * SAMPLES_PER_SPAN + 1);
    out.push(points[0]);
    for k in 0..n - 1 {
        let [x0, y0] = points[k];
        let [x1, y1] = points[k + 1];
        let h = x1 - x0;
        for j in 1..=SAMPLES_PER_SPAN {
            let t = j as f64 / SAMPLES_PER_SPAN as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let y = h00 * y0 + h10 * h * tangents[k] + h01 * y1 + h11 * h * tangents[k + 1];
            out.push([x0 + t * h, y]);
        }
    }
    out
}

/// Uniform cubic B-spline with clamped ends: starts and ends on the first
/// and last point, approximates the ones in between.
fn basis(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let mut ctrl: Vec<Point> = Vec::with_capacity(points.len() + 4);
    ctrl.extend([first, first]);
    ctrl.extend_from_slice(points);
    ctrl.extend([last, last]);

    let mut out = Vec::with_capacity((ctrl.len() - 3) * SAMPLES_PER_SPAN + 1);
    out.push(first);
    for w in ctrl.windows(4) {
        for j in 1..=SAMPLES_PER_SPAN {
            let t = j as f64 / SAMPLES_PER_SPAN as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let b0 = (1.0 - t).powi(3);
            let b1 = 3.0 * t3 - 6.0 * t2 + 4.0;
            let b2 = -3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0;
            let b3 = t3;
            let blend = |axis: usize| {
                (b0 * w[0][axis] + b1 * w[1][axis] + b2 * w[2][axis] + b3 * w[3][axis]) / 6.0
            };
            out.push([blend(0), blend(1)]);
        }
    }
    out
}
