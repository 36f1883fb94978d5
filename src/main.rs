use anyhow::Result;
use catalog_report::config::{
    DEFAULT_DURATION_BINS, DEFAULT_TOP_COUNTRIES, DEFAULT_TOP_GENRES, DEFAULT_TOP_PEOPLE, DEFAULT_TOP_RATINGS,
};
use catalog_report::aggregate::DEFAULT_CAST_CAP;
use catalog_report::{run, AnalysisConfig};
use clap::Parser;
use log::debug;
use std::path::PathBuf;

// --- CLI Arguments ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Charts and summary statistics for a catalog of movies and TV shows", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to the catalog CSV file.")]
    csv: PathBuf,

    #[arg(short, long, default_value = ".", help = "Directory that receives plots/ and output/.")]
    output_root: PathBuf,

    #[arg(long, default_value_t = DEFAULT_TOP_GENRES, help = "Number of genres in the genre chart.")]
    top_genres: usize,

    #[arg(long, default_value_t = DEFAULT_TOP_COUNTRIES, help = "Number of countries in the country chart.")]
    top_countries: usize,

    #[arg(long, default_value_t = DEFAULT_TOP_PEOPLE, help = "Number of directors and actors charted.")]
    top_people: usize,

    #[arg(long, default_value_t = DEFAULT_TOP_RATINGS, help = "Number of ratings in the rating chart.")]
    top_ratings: usize,

    #[arg(long, default_value_t = DEFAULT_CAST_CAP, help = "Cast members per title counted toward actor appearances.")]
    cast_cap: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_DURATION_BINS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
        help = "Bins in the movie duration histogram (at least 1)."
    )]
    duration_bins: usize,
}

impl From<Cli> for AnalysisConfig {
    fn from(cli: Cli) -> Self {
        AnalysisConfig {
            top_genres: cli.top_genres,
            top_countries: cli.top_countries,
            top_people: cli.top_people,
            top_ratings: cli.top_ratings,
            cast_cap: cli.cast_cap,
            duration_bins: cli.duration_bins,
            ..AnalysisConfig::new(cli.csv, cli.output_root)
        }
    }
}

// --- Main Function ---

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    debug!("Parsed arguments: {:?}", cli);

    let config = AnalysisConfig::from(cli);
    run(&config)?;
    Ok(())
}
