use anyhow::Result;
use clap::{Parser, Subcommand};
use songrec_core::{BuildOptions, Engine, RecommendationResult};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "songrec")]
#[command(about = "Recommend songs with similar lyrics from a CSV catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a song and print the most similar ones
    Recommend {
        /// CSV dataset with artist, song, link and text columns
        #[arg(long, env = "CSV_PATH")]
        dataset: PathBuf,
        /// Song title, matched exactly after trimming and lower-casing
        #[arg(long)]
        title: String,
        /// Artist, to pick one of several songs sharing the title
        #[arg(long)]
        artist: Option<String>,
        /// Number of recommendations (1-50)
        #[arg(short, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..=50))]
        k: u16,
        /// Vocabulary size cap
        #[arg(long, default_value_t = songrec_core::engine::DEFAULT_MAX_FEATURES)]
        max_features: usize,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Build the engine and print catalog and vocabulary statistics
    Stats {
        #[arg(long, env = "CSV_PATH")]
        dataset: PathBuf,
        #[arg(long, default_value_t = songrec_core::engine::DEFAULT_MAX_FEATURES)]
        max_features: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend { dataset, title, artist, k, max_features, json } => {
            let engine = build(&dataset, max_features)?;
            let result = engine.recommend(&title, k as usize, artist.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
            Ok(())
        }
        Commands::Stats { dataset, max_features } => {
            let engine = build(&dataset, max_features)?;
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
            Ok(())
        }
    }
}

fn build(dataset: &Path, max_features: usize) -> Result<Engine> {
    let options = BuildOptions { max_features, ..BuildOptions::default() };
    Ok(Engine::construct_with(dataset, &options)?)
}

fn print_result(result: &RecommendationResult) {
    println!("{} - {}", result.query.title, result.query.artist);
    for (i, rec) in result.recommendations.iter().enumerate() {
        let link = if rec.link.is_empty() { String::new() } else { format!("  {}", rec.link) };
        println!("{:>3}. {:.4}  {} - {}{}", i + 1, rec.score, rec.title, rec.artist, link);
    }
}
