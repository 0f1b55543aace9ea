use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use chart_studio::{ChartConfig, CodecOptions, RowLengthPolicy, ThemeCatalog};

/// Interactive line-chart studio.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Dataset to open on startup (.json, .csv, .txt or .tsv). Without it
    /// the built-in sample dataset is loaded.
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Initial theme
    #[arg(short, long, value_parser = theme_name)]
    pub theme: Option<String>,

    /// Initial line interpolation (linear, monotone, step, basis)
    #[arg(short, long)]
    pub interpolation: Option<String>,

    /// Start with a logarithmic value axis
    #[arg(long)]
    pub log_scale: bool,

    /// Shade the area under each line
    #[arg(long)]
    pub fill: bool,

    /// Field delimiter for pasted and loaded text
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Reject rows whose field count differs from the header
    #[arg(long)]
    pub strict_rows: bool,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

fn theme_name(s: &str) -> Result<String, String> {
    if ThemeCatalog::contains(s) {
        Ok(s.to_string())
    } else {
        let known: Vec<_> = ThemeCatalog::names().collect();
        Err(format!("unknown theme '{s}' (expected one of {})", known.join(", ")))
    }
}

impl Cli {
    pub fn codec_options(&self) -> Result<CodecOptions> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(CodecOptions {
            delimiter: self.delimiter as u8,
            row_policy: if self.strict_rows {
                RowLengthPolicy::Strict
            } else {
                RowLengthPolicy::Lenient
            },
        })
    }

    pub fn chart_config(&self) -> ChartConfig {
        let mut config = ChartConfig::default();
        if let Some(theme) = &self.theme {
            config.set_theme(theme);
        }
        if let Some(mode) = &self.interpolation {
            config.set_line_interpolation(mode);
        }
        config.set_log_scale(self.log_scale);
        config.set_fill_area(self.fill);
        config
    }
}
