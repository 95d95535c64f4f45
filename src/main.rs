//! COVID Explorer - COVID-19 Data Analysis
//!
//! Loads the Our World in Data COVID-19 CSV, prints the top countries by
//! cases and deaths, then shows a trend chart for a chosen country and a
//! world map of total cases.

mod charts;
mod config;
mod data;
mod error;
mod gui;
mod pipeline;
mod report;
mod stats;

use config::{AnalysisConfig, CONFIG_FILE};
use gui::NativeDisplay;
use std::io;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the report on stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = AnalysisConfig::load_or_default(Path::new(CONFIG_FILE))?;
    tracing::info!(data = %config.data_path.display(), "COVID Explorer starting");

    let mut display = NativeDisplay::new(&config);
    pipeline::run(
        &config,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut display,
    )?;

    Ok(())
}
