use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gamedex_core::{Game, Platform, SearchEngine, SledStore};
use serde::Deserialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Raw catalog record as exported from RAWG-style dumps: genres, tags, and
/// platforms arrive as nested objects.
#[derive(Debug, Deserialize)]
struct RawGame {
    id: u64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    released: Option<String>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    metacritic: Option<i32>,
    #[serde(default)]
    genres: Vec<Named>,
    #[serde(default)]
    tags: Vec<Named>,
    #[serde(default)]
    platforms: Vec<PlatformEntry>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlatformEntry {
    #[serde(default)]
    platform: Option<Named>,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect the game-catalog TF-IDF index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from raw catalog JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Index directory (sled database)
        #[arg(long)]
        output: String,
    },
    /// Print corpus statistics for an existing index
    Stats {
        /// Index directory (sled database)
        #[arg(long)]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
        Commands::Stats { index } => print_stats(&index),
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let games = load_catalog(Path::new(input))?;
    anyhow::ensure!(!games.is_empty(), "no parseable games under {input}");

    let store = SledStore::open(output).with_context(|| format!("opening index at {output}"))?;
    let mut engine = SearchEngine::new(store);
    let ingested = engine.rebuild(games.iter())?;
    let stats = engine.index().stats();
    engine.store().close()?;

    tracing::info!(
        ingested,
        num_terms = engine.index().num_terms(),
        avg_terms_per_doc = stats.avg_terms_per_doc(),
        output,
        "index build complete"
    );
    Ok(())
}

fn print_stats(index_dir: &str) -> Result<()> {
    let store = SledStore::open(index_dir)?;
    let engine = SearchEngine::open(store)?;
    let stats = engine.index().stats();
    println!("total_docs:        {}", stats.total_docs);
    println!("distinct_terms:    {}", engine.index().num_terms());
    println!("indexed_postings:  {}", stats.indexed_terms);
    println!("avg_terms_per_doc: {:.2}", stats.avg_terms_per_doc());
    Ok(())
}

/// Collect and convert every parseable game under `input`. Per-record and
/// per-file failures are logged and skipped; only an unreadable input path
/// aborts.
fn load_catalog(input: &Path) -> Result<Vec<Game>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else {
        files.push(input.to_path_buf());
    }
    anyhow::ensure!(!files.is_empty(), "no .json/.jsonl files under {}", input.display());

    let mut games = Vec::new();
    for file in files {
        let is_jsonl = file.extension().and_then(|s| s.to_str()) == Some("jsonl");
        let result = if is_jsonl {
            load_jsonl(&file, &mut games)
        } else {
            load_json(&file, &mut games)
        };
        if let Err(err) = result {
            tracing::warn!(file = %file.display(), %err, "skipping unreadable input file");
        }
    }
    Ok(games)
}

fn load_jsonl(file: &Path, games: &mut Vec<Game>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawGame>(&line) {
            Ok(raw) => collect(convert(raw), games),
            Err(err) => {
                tracing::warn!(file = %file.display(), line = line_no + 1, %err, "skipping malformed record");
            }
        }
    }
    Ok(())
}

fn load_json(file: &Path, games: &mut Vec<Game>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let records = match json {
        serde_json::Value::Array(arr) => arr,
        other => vec![other],
    };
    for value in records {
        match serde_json::from_value::<RawGame>(value) {
            Ok(raw) => collect(convert(raw), games),
            Err(err) => {
                tracing::warn!(file = %file.display(), %err, "skipping malformed record");
            }
        }
    }
    Ok(())
}

fn collect(game: Game, games: &mut Vec<Game>) {
    match game.validate() {
        Ok(()) => games.push(game),
        Err(err) => tracing::warn!(game_id = game.id, %err, "skipping invalid game"),
    }
}

/// Flatten a raw record into the core document model. An unparseable
/// release date is dropped to None with a warning; it never skips the game.
fn convert(raw: RawGame) -> Game {
    let released = raw.released.and_then(|date| match time::Date::parse(&date, DATE_FORMAT) {
        Ok(_) => Some(date),
        Err(_) => {
            tracing::warn!(game_id = raw.id, %date, "unparseable release date, dropped");
            None
        }
    });

    Game {
        id: raw.id,
        name: raw.name,
        description: raw.description.filter(|d| !d.trim().is_empty()),
        genres: raw.genres.into_iter().map(|g| g.name).collect(),
        tags: raw.tags.into_iter().map(|t| t.name).collect(),
        platforms: raw
            .platforms
            .into_iter()
            .filter_map(|p| p.platform)
            .map(|p| Platform { name: p.name })
            .collect(),
        rating: raw.rating,
        metacritic: raw.metacritic,
        released,
    }
}
