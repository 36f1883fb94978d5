use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use log::{debug, info};
use std::path::Path;

/// Delimited file contents as read, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at `row`/`column`; short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Reads the comma-delimited file at `path`.
///
/// Fails before touching anything else when `path` is not an existing file.
pub fn load_table(path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        bail!("CSV file not found at {}", path.display());
    }
    info!("Loading CSV: {}", path.display());

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    debug!("Header columns: {:?}", headers);

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse data row {} of {}", i + 1, path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    info!("Loaded {} rows with {} columns", rows.len(), headers.len());
    Ok(RawTable { headers, rows })
}
