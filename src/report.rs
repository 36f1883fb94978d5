//! One chart per aggregate. A chart whose data is unavailable is skipped
//! with an informational message instead of failing the run.

use anyhow::Result;
use log::info;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::aggregate::{
    actor_frequency, country_frequency, director_frequency, duration_distribution, genre_frequency, histogram,
    rating_frequency, type_counts, yearly_trend, FrequencyTable,
};
use crate::chart::{Chart, ChartBody, Rasterizer};
use crate::config::AnalysisConfig;
use crate::output::{write_atomic, OutputLayout};
use crate::record::Dataset;

// --- Artifact names ---
pub const MOVIES_VS_TV: &str = "movies_vs_tv.png";
pub const TOP_GENRES: &str = "top_genres.png";
pub const CONTENT_PER_YEAR: &str = "content_added_per_year.png";
pub const TOP_COUNTRIES: &str = "top_countries.png";
pub const RATING_DISTRIBUTION: &str = "rating_distribution.png";
pub const MOVIE_DURATIONS: &str = "movie_duration_distribution.png";
pub const SHOW_SEASONS: &str = "show_seasons_count.png";
pub const TOP_DIRECTORS: &str = "top_directors.png";
pub const TOP_ACTORS: &str = "top_actors.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(PathBuf),
    Skipped(String),
}

impl Outcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Outcome::Saved(_))
    }
}

fn skip(reason: impl Into<String>) -> Result<Outcome> {
    let reason = reason.into();
    info!("{}", reason);
    Ok(Outcome::Skipped(reason))
}

fn counts(table: &FrequencyTable) -> Vec<(String, f64)> {
    table
        .entries()
        .iter()
        .map(|(k, c)| (k.clone(), *c as f64))
        .collect()
}

pub struct ChartWriter<'a> {
    layout: &'a OutputLayout,
    config: &'a AnalysisConfig,
    rasterizer: Rasterizer,
}

impl<'a> ChartWriter<'a> {
    pub fn new(layout: &'a OutputLayout, config: &'a AnalysisConfig) -> Self {
        ChartWriter {
            layout,
            config,
            rasterizer: Rasterizer::new(),
        }
    }

    /// Renders every chart in a fixed order.
    pub fn render_all(&self, ds: &Dataset) -> Result<Vec<(&'static str, Outcome)>> {
        let durations = duration_distribution(ds);
        Ok(vec![
            (MOVIES_VS_TV, self.movies_vs_tv(ds)?),
            (TOP_GENRES, self.top_genres(ds)?),
            (CONTENT_PER_YEAR, self.yearly_trend(ds)?),
            (TOP_COUNTRIES, self.top_countries(ds)?),
            (RATING_DISTRIBUTION, self.rating_distribution(ds)?),
            (MOVIE_DURATIONS, self.movie_durations(&durations.movie_minutes)?),
            (SHOW_SEASONS, self.show_seasons(&durations.show_seasons)?),
            (TOP_DIRECTORS, self.top_directors(ds)?),
            (TOP_ACTORS, self.top_actors(ds)?),
        ])
    }

    fn save(&self, file_name: &str, chart: Chart) -> Result<Outcome> {
        let path = self.layout.plot(file_name);
        let png = self.rasterizer.render_png(&chart)?;
        write_atomic(&path, &png)?;
        info!("Saved {}", path.display());
        Ok(Outcome::Saved(path))
    }

    pub fn movies_vs_tv(&self, ds: &Dataset) -> Result<Outcome> {
        let Some(types) = type_counts(ds) else {
            return skip("No type column present; skipping movies vs TV chart.");
        };
        if types.is_empty() {
            return skip("No type values present; skipping movies vs TV chart.");
        }
        self.save(
            MOVIES_VS_TV,
            Chart {
                title: "Movies vs TV Shows".to_string(),
                x_label: String::new(),
                y_label: "Count".to_string(),
                width: 600,
                height: 400,
                body: ChartBody::Columns(counts(&types)),
            },
        )
    }

    pub fn top_genres(&self, ds: &Dataset) -> Result<Outcome> {
        let top_n = self.config.top_genres;
        let genres = genre_frequency(ds, top_n);
        if genres.is_empty() {
            return skip("No genre information available; skipping genre chart.");
        }
        self.save(
            TOP_GENRES,
            Chart {
                title: format!("Top {} Genres / Categories", top_n),
                x_label: "Count".to_string(),
                y_label: String::new(),
                width: 800,
                height: 500,
                body: ChartBody::Bars(counts(&genres)),
            },
        )
    }

    pub fn yearly_trend(&self, ds: &Dataset) -> Result<Outcome> {
        let trend = yearly_trend(ds);
        if trend.is_empty() {
            return skip("No year_added information available to plot yearly trend.");
        }
        self.save(
            CONTENT_PER_YEAR,
            Chart {
                title: "Content Added Over Years".to_string(),
                x_label: "Year".to_string(),
                y_label: "Number of Titles Added".to_string(),
                width: 800,
                height: 400,
                body: ChartBody::Line(trend.into_iter().map(|(y, c)| (y as f64, c as f64)).collect()),
            },
        )
    }

    pub fn top_countries(&self, ds: &Dataset) -> Result<Outcome> {
        let top_n = self.config.top_countries;
        let countries = country_frequency(ds, top_n);
        if countries.is_empty() {
            return skip("No records; skipping country chart.");
        }
        self.save(
            TOP_COUNTRIES,
            Chart {
                title: format!("Top {} Countries by Number of Titles", top_n),
                x_label: "Number of Titles".to_string(),
                y_label: String::new(),
                width: 800,
                height: 400,
                body: ChartBody::Bars(counts(&countries)),
            },
        )
    }

    pub fn rating_distribution(&self, ds: &Dataset) -> Result<Outcome> {
        let Some(ratings) = rating_frequency(ds, self.config.top_ratings) else {
            return skip("No rating column present");
        };
        if ratings.is_empty() {
            return skip("No rating values present; skipping rating chart.");
        }
        self.save(
            RATING_DISTRIBUTION,
            Chart {
                title: "Content Ratings Distribution".to_string(),
                x_label: "Count".to_string(),
                y_label: String::new(),
                width: 800,
                height: 600,
                body: ChartBody::Bars(counts(&ratings)),
            },
        )
    }

    pub fn movie_durations(&self, minutes: &[u32]) -> Result<Outcome> {
        if minutes.is_empty() {
            return skip("No parsed movie durations; skipping movie duration chart.");
        }
        let bins = histogram(minutes, self.config.duration_bins);
        if bins.is_empty() {
            return skip("Zero histogram bins requested; skipping movie duration chart.");
        }
        self.save(
            MOVIE_DURATIONS,
            Chart {
                title: "Distribution of Movie Durations (minutes)".to_string(),
                x_label: "Minutes".to_string(),
                y_label: "Count".to_string(),
                width: 800,
                height: 400,
                body: ChartBody::Histogram(bins),
            },
        )
    }

    pub fn show_seasons(&self, seasons: &BTreeMap<u32, usize>) -> Result<Outcome> {
        if seasons.is_empty() {
            return skip("No parsed TV show seasons; skipping seasons chart.");
        }
        self.save(
            SHOW_SEASONS,
            Chart {
                title: "Number of Seasons for TV Shows".to_string(),
                x_label: "Seasons".to_string(),
                y_label: "Count".to_string(),
                width: 800,
                height: 400,
                body: ChartBody::Columns(seasons.iter().map(|(s, c)| (s.to_string(), *c as f64)).collect()),
            },
        )
    }

    pub fn top_directors(&self, ds: &Dataset) -> Result<Outcome> {
        let top_n = self.config.top_people;
        let Some(directors) = director_frequency(ds, top_n) else {
            return skip("No director column present; skipping director chart.");
        };
        if directors.is_empty() {
            return skip("No known directors; skipping director chart.");
        }
        self.save(
            TOP_DIRECTORS,
            Chart {
                title: format!("Top {} Directors by Number of Titles", top_n),
                x_label: "Number of Titles".to_string(),
                y_label: String::new(),
                width: 800,
                height: 400,
                body: ChartBody::Bars(counts(&directors)),
            },
        )
    }

    pub fn top_actors(&self, ds: &Dataset) -> Result<Outcome> {
        let top_n = self.config.top_people;
        let cap = self.config.cast_cap;
        let Some(actors) = actor_frequency(ds, top_n, cap) else {
            return skip("No cast column present; skipping actor chart.");
        };
        if actors.is_empty() {
            return skip("No known cast members; skipping actor chart.");
        }
        self.save(
            TOP_ACTORS,
            Chart {
                title: format!("Top {} Actors/Actresses by Appearances (first {} listed)", top_n, cap),
                x_label: "Appearances".to_string(),
                y_label: String::new(),
                width: 800,
                height: 400,
                body: ChartBody::Bars(counts(&actors)),
            },
        )
    }
}
