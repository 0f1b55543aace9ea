use std::fmt;
use std::str::FromStr;

use crate::data::codec::TextCodec;
use crate::data::model::TabularDataset;
use crate::error::{ChartError, ChartResult};
use crate::plan::RenderPlan;

/// Image formats the renderer can snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Svg => "SVG",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(ChartError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// The rendering primitive's snapshot capability.
pub trait SnapshotRenderer {
    /// Capture the chart currently drawn from `plan` in `format`.
    fn request_snapshot(&mut self, format: ImageFormat, plan: &RenderPlan) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Export coordination
// ---------------------------------------------------------------------------

/// Reads current state and produces export payloads; never mutates the
/// dataset, selection or configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportCoordinator {
    codec: TextCodec,
}

impl ExportCoordinator {
    pub fn new(codec: TextCodec) -> Self {
        Self { codec }
    }

    /// The dataset as delimited text.
    pub fn export_csv(&self, dataset: &TabularDataset) -> ChartResult<String> {
        log::info!("Exporting {} rows as CSV", dataset.len());
        self.codec.serialize(dataset)
    }

    /// Validate `format` and forward the snapshot request to `renderer`.
    pub fn export_image<R: SnapshotRenderer + ?Sized>(
        &self,
        format: &str,
        plan: &RenderPlan,
        renderer: &mut R,
    ) -> anyhow::Result<ImageFormat> {
        let format: ImageFormat = format.parse()?;
        log::info!("Requesting {format} snapshot");
        renderer.request_snapshot(format, plan)?;
        Ok(format)
    }
}

/// File name for an export: whitespace runs in `title` become `_`, a
/// blank title becomes `chart`.
pub fn export_file_name(title: &str, extension: &str) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "chart".to_string() } else { stem };
    format!("{stem}.{extension}")
}
