use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value as JsonValue};

use super::codec::{CodecOptions, TextCodec};
use super::model::TabularDataset;
use crate::error::ChartResult;

/// The fixed sample dataset (monthly revenue / expenses / profit for 2023).
const SAMPLE_DATA_JSON: &str = include_str!("../../assets/sample-data.json");

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`        – `[{ "date": "2023-01", "revenue": 45000, ... }, ...]`
/// * `.csv` / `.txt` – delimited text with the configured delimiter
/// * `.tsv`         – tab-delimited text
pub fn load_file(path: &Path, options: CodecOptions) -> Result<TabularDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let dataset = match ext.as_str() {
        "json" => {
            let rows = rows_from_json(&text).context("parsing JSON rows")?;
            TabularDataset::from_rows(rows)?
        }
        "csv" | "txt" => TextCodec::new(options)
            .parse_text(&text)
            .context("parsing delimited text")?,
        "tsv" => TextCodec::new(CodecOptions {
            delimiter: b'\t',
            ..options
        })
        .parse_text(&text)
        .context("parsing tab-delimited text")?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.columns(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON rows
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "date": "2023-01", "revenue": 45000, "expenses": 32000, "profit": 13000 },
///   ...
/// ]
/// ```
pub fn rows_from_json(text: &str) -> ChartResult<Vec<Map<String, JsonValue>>> {
    Ok(serde_json::from_str(text)?)
}

/// Rows of the built-in sample dataset.
pub fn sample_rows() -> ChartResult<Vec<Map<String, JsonValue>>> {
    rows_from_json(SAMPLE_DATA_JSON)
}
