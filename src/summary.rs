use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::Path;

use crate::aggregate::{country_counts, type_counts};
use crate::output::write_atomic;
use crate::record::{Dataset, UNKNOWN};

pub const SUMMARY_FILE: &str = "summary_stats.csv";

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    metric: &'a str,
    value: &'a str,
}

/// Ordered metric/value highlights of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    rows: Vec<(String, String)>,
}

impl Summary {
    pub fn build(ds: &Dataset) -> Self {
        let mut rows = vec![("total_titles".to_string(), ds.len().to_string())];

        if let Some(types) = type_counts(ds) {
            for (kind, count) in types.entries() {
                rows.push((kind.clone(), count.to_string()));
            }
        }

        // empty value when no record has a year
        let years = ds.records.iter().filter_map(|r| r.year_added);
        let earliest = years.clone().min();
        let latest = years.max();
        rows.push(("earliest_year_added".to_string(), earliest.map(|y| y.to_string()).unwrap_or_default()));
        rows.push(("latest_year_added".to_string(), latest.map(|y| y.to_string()).unwrap_or_default()));

        let countries = country_counts(ds);
        rows.push(("top_country".to_string(), countries.top_key().unwrap_or(UNKNOWN).to_string()));

        Summary { rows }
    }

    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    pub fn get(&self, metric: &str) -> Option<&str> {
        self.rows.iter().find(|(m, _)| m == metric).map(|(_, v)| v.as_str())
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for (metric, value) in &self.rows {
            writer
                .serialize(SummaryRow { metric, value })
                .with_context(|| format!("Failed to serialize summary row '{}'", metric))?;
        }
        writer
            .into_inner()
            .map_err(|e| e.into_error())
            .context("Failed to flush summary table")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_csv()?;
        write_atomic(path, &bytes)?;
        info!("Saved summary to {}", path.display());
        Ok(())
    }
}
