//! Adindex CLI
//!
//! Opens a click log, builds the indexes, and serves the line-oriented
//! command loop on standard input.

use adindex::config::{generate_default_config, Config};
use adindex::index::IndexBuilder;
use adindex::query::QueryEngine;
use adindex::store::RecordStore;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "adindex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offset-indexed analytics over ad click/impression logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a config file (default: standard config locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a log file and answer commands from standard input
    Query {
        /// Path to the log file
        file: PathBuf,

        /// Field delimiter (overrides config)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Worker threads for query execution (overrides config, 0 = all cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_logging(&config);

    match cli.command {
        Commands::Query {
            file,
            delimiter,
            threads,
        } => {
            if let Some(delimiter) = delimiter {
                config.data.delimiter = delimiter;
            }
            if let Some(threads) = threads {
                config.query.threads = threads;
            }

            run_query(&config, &file)
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{content}");
                }
            }
            Ok(())
        }
    }
}

fn run_query(config: &Config, file: &PathBuf) -> anyhow::Result<()> {
    tracing::info!("Adindex v{}", env!("CARGO_PKG_VERSION"));

    let delim = config.data.delimiter_byte()?;

    if config.query.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.query.threads)
            .build_global()
            .context("failed to configure query worker pool")?;
    }

    let store =
        RecordStore::open(file).with_context(|| format!("failed to open log file {file:?}"))?;
    tracing::info!(path = ?file, bytes = store.len(), "record store mapped");

    let index = IndexBuilder::new(delim)
        .build(&store)
        .context("index construction failed")?;

    let engine = QueryEngine::new(&store, &index)
        .delimiter(delim)
        .chunk_size(config.query.chunk_size);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    adindex::repl::run(&engine, stdin.lock(), stdout.lock())?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| format!("adindex={}", config.logging.level)),
    );

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
