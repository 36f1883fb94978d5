use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

// --- Configuration Constants ---
const PLOTS_DIR: &str = "plots";
const OUTPUT_DIR: &str = "output";

/// Where artifacts land under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub plots_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl OutputLayout {
    pub fn under(root: &Path) -> Self {
        OutputLayout {
            plots_dir: root.join(PLOTS_DIR),
            output_dir: root.join(OUTPUT_DIR),
        }
    }

    /// Creates both directories; safe to call repeatedly.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.plots_dir).with_context(|| format!("Failed to create plots dir {:?}", self.plots_dir))?;
        fs::create_dir_all(&self.output_dir).with_context(|| format!("Failed to create output dir {:?}", self.output_dir))?;
        debug!("Output directories ready: {:?}, {:?}", self.plots_dir, self.output_dir);
        Ok(())
    }

    pub fn plot(&self, file_name: &str) -> PathBuf {
        self.plots_dir.join(file_name)
    }

    pub fn output(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

/// Writes `bytes` next to `path` under a temporary name, then renames it into
/// place so readers never observe a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent_dir = path.parent().ok_or_else(|| anyhow!("Artifact has no parent: {:?}", path))?;
    fs::create_dir_all(parent_dir).with_context(|| format!("Failed create parent: {:?}", parent_dir))?;
    let temp_suffix = format!(".{}.tmp", std::process::id());
    let temp_path = path.with_extension(path.extension().map_or_else(|| temp_suffix.trim_start_matches('.').to_string(), |ext| format!("{}{}", ext.to_string_lossy(), temp_suffix)));

    let mut temp_file = OpenOptions::new().write(true).create(true).truncate(true).open(&temp_path).with_context(|| format!("Failed create temp file: {:?}", temp_path))?;
    temp_file.write_all(bytes).with_context(|| format!("Failed write temp file: {:?}", temp_path))?;
    temp_file.flush().context("Failed flush temp file")?;
    drop(temp_file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("Failed rename {:?} to {:?}", temp_path, path));
    }
    Ok(())
}
