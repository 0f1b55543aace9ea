use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::theme::{DEFAULT_THEME, ThemeCatalog};

// ---------------------------------------------------------------------------
// Line interpolation
// ---------------------------------------------------------------------------

/// How consecutive points of a series are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineInterpolation {
    Linear,
    #[default]
    Monotone,
    Step,
    Basis,
}

impl LineInterpolation {
    pub const ALL: [Self; 4] = [Self::Linear, Self::Monotone, Self::Step, Self::Basis];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Monotone => "monotone",
            Self::Step => "step",
            Self::Basis => "basis",
        }
    }

    /// Human-readable label for pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Straight lines",
            Self::Monotone => "Smooth curve",
            Self::Step => "Step line",
            Self::Basis => "Basis spline",
        }
    }
}

impl fmt::Display for LineInterpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineInterpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown interpolation: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Value transforms
// ---------------------------------------------------------------------------

/// Per-series value transforms. Enabled ones apply in field order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueTransforms {
    /// Rescale each series to 0..1.
    pub normalize: bool,
    /// Running total.
    pub cumulative: bool,
    /// Share of the series total, in percent.
    pub percentage: bool,
    /// Trailing moving-average window. Windows below 2 are off.
    pub moving_average: Option<usize>,
}

impl ValueTransforms {
    pub fn is_identity(&self) -> bool {
        !self.normalize
            && !self.cumulative
            && !self.percentage
            && !matches!(self.moving_average, Some(w) if w >= 2)
    }
}

// ---------------------------------------------------------------------------
// ChartConfig
// ---------------------------------------------------------------------------

/// User-editable display options. Held in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    theme: String,
    pub interpolation: LineInterpolation,
    pub show_points: bool,
    #[serde(default)]
    pub transforms: ValueTransforms,
    /// Logarithmic value axis; non-positive values become gaps.
    #[serde(default)]
    pub log_scale: bool,
    /// Shade the area between each line and the value-axis baseline.
    #[serde(default)]
    pub fill_area: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Business Performance Over Time".to_string(),
            x_axis_label: "Time Period".to_string(),
            y_axis_label: "Value".to_string(),
            theme: DEFAULT_THEME.to_string(),
            interpolation: LineInterpolation::default(),
            show_points: true,
            transforms: ValueTransforms::default(),
            log_scale: false,
            fill_area: false,
        }
    }
}

impl ChartConfig {
    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_x_axis_label(&mut self, label: impl Into<String>) {
        self.x_axis_label = label.into();
    }

    pub fn set_y_axis_label(&mut self, label: impl Into<String>) {
        self.y_axis_label = label.into();
    }

    /// Select a theme by name. Unknown names become the default theme,
    /// the same fallback [`ThemeCatalog::get`] applies.
    pub fn set_theme(&mut self, name: &str) {
        if ThemeCatalog::contains(name) {
            self.theme = name.to_string();
        } else {
            log::warn!("Unknown theme {name:?}, using {DEFAULT_THEME:?}");
            self.theme = DEFAULT_THEME.to_string();
        }
    }

    /// Select an interpolation mode by name; unknown names become the
    /// default mode.
    pub fn set_line_interpolation(&mut self, name: &str) {
        self.interpolation = name.parse().unwrap_or_else(|e| {
            log::warn!("{e}, using {}", LineInterpolation::default());
            LineInterpolation::default()
        });
    }

    pub fn set_show_points(&mut self, show: bool) {
        self.show_points = show;
    }

    pub fn set_log_scale(&mut self, log_scale: bool) {
        self.log_scale = log_scale;
    }

    pub fn set_fill_area(&mut self, fill: bool) {
        self.fill_area = fill;
    }

    /// Set the moving-average window; 0 or 1 turns it off.
    pub fn set_moving_average(&mut self, window: usize) {
        self.transforms.moving_average = (window >= 2).then_some(window);
    }
}
