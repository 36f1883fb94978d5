use std::path::PathBuf;

use crate::aggregate::DEFAULT_CAST_CAP;

pub const DEFAULT_TOP_GENRES: usize = 12;
pub const DEFAULT_TOP_COUNTRIES: usize = 10;
pub const DEFAULT_TOP_PEOPLE: usize = 10;
pub const DEFAULT_TOP_RATINGS: usize = 20;
pub const DEFAULT_DURATION_BINS: usize = 30;

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    /// Parent of the `plots/` and `output/` directories.
    pub output_root: PathBuf,
    pub top_genres: usize,
    pub top_countries: usize,
    pub top_people: usize,
    pub top_ratings: usize,
    pub cast_cap: usize,
    pub duration_bins: usize,
}

impl AnalysisConfig {
    pub fn new(csv_path: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        AnalysisConfig {
            csv_path: csv_path.into(),
            output_root: output_root.into(),
            top_genres: DEFAULT_TOP_GENRES,
            top_countries: DEFAULT_TOP_COUNTRIES,
            top_people: DEFAULT_TOP_PEOPLE,
            top_ratings: DEFAULT_TOP_RATINGS,
            cast_cap: DEFAULT_CAST_CAP,
            duration_bins: DEFAULT_DURATION_BINS,
        }
    }
}
