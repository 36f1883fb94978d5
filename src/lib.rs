//! Batch report over a catalog of titles: load a CSV, normalize it, chart a
//! fixed set of aggregates and write a summary table.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod record;
pub mod report;
pub mod summary;

use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

pub use config::AnalysisConfig;
pub use record::{Dataset, Record, UNKNOWN};
pub use report::Outcome;
pub use summary::Summary;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub charts: Vec<(&'static str, Outcome)>,
    pub summary_path: PathBuf,
    pub summary: Summary,
}

impl RunReport {
    pub fn outcome(&self, artifact: &str) -> Option<&Outcome> {
        self.charts.iter().find(|(name, _)| *name == artifact).map(|(_, o)| o)
    }
}

/// Runs the whole pipeline. A missing input file fails before any output
/// directory is created.
pub fn run(config: &AnalysisConfig) -> Result<RunReport> {
    let table = loader::load_table(&config.csv_path)?;
    let ds = normalize::normalize(&table);
    debug!("Dataset has {} records", ds.len());

    let layout = output::OutputLayout::under(&config.output_root);
    layout.ensure()?;

    let charts = report::ChartWriter::new(&layout, config).render_all(&ds)?;

    let summary = Summary::build(&ds);
    let summary_path = layout.output(summary::SUMMARY_FILE);
    summary.write(&summary_path)?;

    info!(
        "All done. Plots are in {} and summary in {}.",
        layout.plots_dir.display(),
        layout.output_dir.display()
    );
    Ok(RunReport {
        charts,
        summary_path,
        summary,
    })
}
