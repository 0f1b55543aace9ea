//! Chart Studio core: tabular data in, render plans and exports out.
//!
//! The desktop shell in `main.rs` is a thin egui layer over [`ChartState`];
//! everything here is independent of rendering and testable headless.

pub mod color;
pub mod config;
pub mod curve;
pub mod data;
pub mod error;
pub mod export;
pub mod plan;
pub mod state;
pub mod svg;
pub mod theme;
pub mod transform;

pub use config::{ChartConfig, LineInterpolation, ValueTransforms};
pub use data::codec::{CodecOptions, RowLengthPolicy, TextCodec};
pub use data::model::{CellValue, Row, TabularDataset};
pub use data::selection::ColumnSelection;
pub use error::{ChartError, ChartResult};
pub use export::{ExportCoordinator, ImageFormat, SnapshotRenderer, export_file_name};
pub use plan::{RenderPlan, SeriesPlan, build_render_plan};
pub use state::{ChartState, LoadOutcome, LoadTicket, SubscriptionId};
pub use theme::{Theme, ThemeCatalog};
