//! Render plan: the renderer-agnostic description of what to draw.
//!
//! [`build_render_plan`] is a pure function of its inputs. It is cheap
//! enough to call after every toggle, keystroke or theme switch; the
//! result holds no reference back into the dataset or the selection.

use crate::color::Rgb;
use crate::config::{ChartConfig, LineInterpolation};
use crate::data::model::{CellValue, TabularDataset};
use crate::theme::ThemeCatalog;
use crate::transform;

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPlan {
    pub column: String,
    pub color: Rgb,
    pub interpolation: LineInterpolation,
    pub show_points: bool,
    /// Shade down to the value-axis baseline.
    pub fill: bool,
    /// One entry per dataset row, after value transforms. Non-numeric
    /// cells are gaps, and so are non-positive values on a log axis.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisDescriptor {
    pub label: String,
    /// Column backing the axis, if any (the category column for x).
    pub column: Option<String>,
}

/// Value axis; `range` spans every finite value of the plotted series
/// (and zero, when areas are filled on a linear axis).
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxisDescriptor {
    pub label: String,
    pub range: Option<(f64, f64)>,
    pub log_scale: bool,
}

impl ValueAxisDescriptor {
    /// Position of `value` along the axis: `log10` on a log axis.
    pub fn to_axis(&self, value: f64) -> f64 {
        if self.log_scale { value.log10() } else { value }
    }

    /// Inverse of [`ValueAxisDescriptor::to_axis`].
    pub fn from_axis(&self, position: f64) -> f64 {
        if self.log_scale { 10f64.powf(position) } else { position }
    }

    /// Value that filled areas extend to.
    pub fn baseline(&self) -> f64 {
        match self.range {
            Some((lo, _)) if self.log_scale => lo,
            Some((lo, hi)) => 0.0f64.clamp(lo, hi),
            None if self.log_scale => 1.0,
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChromeColors {
    pub background: Rgb,
    pub grid: Rgb,
    pub title: Rgb,
    pub axis: Rgb,
    /// Stroke of the range brush under the chart.
    pub brush: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub title: String,
    pub theme: &'static str,
    /// In selection order: drives legend order, z-order and colour.
    pub series: Vec<SeriesPlan>,
    /// The category column's values in row order, unmodified.
    pub category_values: Vec<CellValue>,
    pub x_axis: AxisDescriptor,
    pub y_axis: ValueAxisDescriptor,
    pub chrome: ChromeColors,
    pub font_family: &'static str,
    pub font_size: f32,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Category values as axis tick labels.
    pub fn category_labels(&self) -> Vec<String> {
        self.category_values.iter().map(|v| v.to_string()).collect()
    }
}

/// Combine dataset, selection and configuration into a [`RenderPlan`].
///
/// Selected columns missing from `dataset` are skipped without consuming
/// a palette slot. An empty selection yields a plan with no series.
pub fn build_render_plan(
    dataset: &TabularDataset,
    category: &str,
    selected: &[String],
    config: &ChartConfig,
) -> RenderPlan {
    let theme = ThemeCatalog::get(config.theme());

    let series: Vec<SeriesPlan> = selected
        .iter()
        .filter_map(|col| dataset.column_values(col).map(|vals| (col, vals)))
        .enumerate()
        .map(|(i, (col, vals))| {
            let mut values: Vec<Option<f64>> = vals.iter().map(CellValue::as_f64).collect();
            transform::apply(&mut values, &config.transforms);
            if config.log_scale {
                for v in &mut values {
                    *v = v.filter(|v| *v > 0.0);
                }
            }
            SeriesPlan {
                column: col.clone(),
                color: theme.series_color(i),
                interpolation: config.interpolation,
                show_points: config.show_points,
                fill: config.fill_area,
                values,
            }
        })
        .collect();

    let mut range = value_range(&series);
    if config.fill_area && !config.log_scale {
        range = range.map(|(lo, hi)| (lo.min(0.0), hi.max(0.0)));
    }

    let category_values = dataset.column_values(category).unwrap_or_default();

    RenderPlan {
        title: config.title.clone(),
        theme: theme.name,
        y_axis: ValueAxisDescriptor {
            label: config.y_axis_label.clone(),
            range,
            log_scale: config.log_scale,
        },
        x_axis: AxisDescriptor {
            label: config.x_axis_label.clone(),
            column: dataset.has_column(category).then(|| category.to_string()),
        },
        series,
        category_values,
        chrome: ChromeColors {
            background: theme.background,
            grid: theme.grid,
            title: theme.title,
            axis: theme.axis,
            brush: theme.series_color(0),
        },
        font_family: theme.font_family,
        font_size: theme.font_size,
    }
}

fn value_range(series: &[SeriesPlan]) -> Option<(f64, f64)> {
    series
        .iter()
        .flat_map(|s| s.values.iter().flatten().copied())
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
