use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use threadlens::config::Config;
use threadlens::data::{DataStore, SortOrder};
use threadlens::models::download;
use threadlens::models::{OnnxSentenceEncoder, OnnxSentimentModel};
use threadlens::output::terminal;
use threadlens::pipeline::{run_and_persist, AnalysisContext, PipelineConfig};
use threadlens::preprocess::{StemMode, TextNormalizer};
use threadlens::relevance::ComparedWith;

/// Threadlens: topic, sentiment, and relevance analysis for scraped
/// subreddit discussions.
///
/// Reads the scraper's CSV snapshots, enriches both tables with local ONNX
/// models, joins them, and writes the scored results table.
#[derive(Parser)]
#[command(name = "threadlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline over one scraped snapshot
    Analyze {
        /// Subreddit the snapshot was scraped from (e.g. AmItheAsshole)
        subreddit: String,

        /// Sort order the snapshot was scraped with
        #[arg(long, default_value = "hot")]
        sort: SortOrder,

        /// What each comment is compared against for relevance
        #[arg(long, default_value = "title-body")]
        compared_with: ComparedWith,

        /// Topic count ceiling after reduction, per table (default: 10)
        #[arg(long, default_value = "10")]
        reduce_topics: usize,

        /// Max posts to analyze (default: 500)
        #[arg(long, default_value = "500")]
        max_posts: usize,

        /// Max comments to analyze (default: 500)
        #[arg(long, default_value = "500")]
        max_comments: usize,

        /// Stem tokens instead of lemmatizing them
        #[arg(long)]
        stem: bool,
    },

    /// Download the ONNX sentiment and embedding models (~260 MB)
    DownloadModels,

    /// Show system status (model files, data directory, snapshots)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("threadlens=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            subreddit,
            sort,
            compared_with,
            reduce_topics,
            max_posts,
            max_comments,
            stem,
        } => {
            let config = Config::load()?;
            config.require_models()?;

            info!("Loading ONNX models...");
            let sentiment = OnnxSentimentModel::load(&download::sentiment_model_dir(
                &config.model_dir,
            ))?;
            let encoder = OnnxSentenceEncoder::load(&download::embedding_model_dir(
                &config.model_dir,
            ))?;

            let ctx = AnalysisContext {
                normalizer: TextNormalizer::new(),
                sentiment: Arc::new(sentiment),
                encoder: Arc::new(encoder),
            };

            let mut cfg = PipelineConfig::new(subreddit, sort);
            cfg.compared_with = compared_with;
            cfg.reduce_to = reduce_topics;
            cfg.max_posts = max_posts;
            cfg.max_comments = max_comments;
            cfg.stem_mode = if stem {
                StemMode::Stem
            } else {
                StemMode::Lemmatize
            };

            let store = DataStore::new(&config.data_dir);
            let artifacts = run_and_persist(&ctx, &cfg, &store).await?;

            terminal::display_run_summary(&artifacts, &cfg);
            println!(
                "{}",
                format!(
                    "Artifacts written under {}",
                    config.data_dir.join("results").display()
                )
                .dimmed()
            );
        }

        Commands::DownloadModels => {
            let config = Config::load()?;
            println!("Downloading models to {}", config.model_dir.display());
            download::download_models(&config.model_dir).await?;
            println!("\n{}", "All models ready.".green());
        }

        Commands::Status => {
            let config = Config::load()?;

            println!("\n{}", "=== Threadlens Status ===".bold());
            println!("  Data dir:  {}", config.data_dir.display());
            println!("  Model dir: {}", config.model_dir.display());

            let sentiment_ok = download::sentiment_files_present(&config.model_dir);
            let embedding_ok = download::embedding_files_present(&config.model_dir);
            println!("  Sentiment model: {}", present(sentiment_ok));
            println!("  Embedding model: {}", present(embedding_ok));

            let raw_dir = config.data_dir.join("raw");
            match std::fs::read_dir(&raw_dir) {
                Ok(entries) => {
                    let mut snapshots: Vec<(String, Option<chrono::DateTime<chrono::Local>>)> =
                        entries
                            .filter_map(|e| e.ok())
                            .filter(|e| {
                                e.file_name().to_string_lossy().ends_with("_posts.csv")
                            })
                            .map(|e| {
                                let scraped = e
                                    .metadata()
                                    .and_then(|m| m.modified())
                                    .ok()
                                    .map(chrono::DateTime::from);
                                (e.file_name().to_string_lossy().into_owned(), scraped)
                            })
                            .collect();
                    snapshots.sort();
                    println!("  Raw snapshots: {}", snapshots.len());
                    for (name, scraped) in snapshots {
                        match scraped {
                            Some(ts) => println!(
                                "    {name}  {}",
                                ts.format("(%Y-%m-%d %H:%M)").to_string().dimmed()
                            ),
                            None => println!("    {name}"),
                        }
                    }
                }
                Err(_) => println!("  Raw snapshots: {}", "none (raw/ missing)".dimmed()),
            }
            println!();
        }
    }

    Ok(())
}

fn present(ok: bool) -> colored::ColoredString {
    if ok {
        "present".green()
    } else {
        "missing".red()
    }
}
