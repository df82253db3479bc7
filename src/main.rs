//! # Glosa CLI
//!
//! The `glosa` binary drives the whole system: database initialization,
//! batch ingestion from the configured sources, ad hoc queries, and the
//! HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! glosa --config ./config/glosa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `glosa init` | Create the SQLite database and run schema migrations |
//! | `glosa sources` | List configured connectors and their health |
//! | `glosa import <connector>` | Ingest from a connector (json, html) |
//! | `glosa add <reference> <comment>` | Add a single comment |
//! | `glosa search "<query>"` | Full-text search over stored comments |
//! | `glosa range "<reference>"` | Comments overlapping a verse range |
//! | `glosa serve` | Start the JSON HTTP server |

mod config;
mod connector_html;
mod connector_json;
mod db;
mod error;
mod ingest;
mod migrate;
mod models;
mod normalize;
mod query;
mod record;
mod reference;
mod server;
mod sources;
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Glosa: ingestion and search for Czech/Slovak biblical commentary.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/glosa.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "glosa",
    about = "Ingestion and search for Czech/Slovak biblical commentary",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/glosa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the comments table with its unique
    /// content-hash index, and the FTS5 full-text table. Idempotent.
    Init,

    /// List configured connectors and their health.
    Sources,

    /// Ingest data from a connector.
    ///
    /// Scans the connector, parses citations, builds canonical records,
    /// skips duplicates by content hash, and prints a batch report with
    /// one line per skipped item.
    Import {
        /// Connector name: `json` or `html`.
        connector: String,

        /// Show item counts without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of items to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Add a single comment from a citation string and text.
    Add {
        /// Citation, e.g. "Jn 1,10-18".
        reference: String,

        /// Commentary text.
        comment: String,

        #[arg(long)]
        author: Option<String>,

        /// Language code; defaults to `ingest.language` from the config.
        #[arg(long)]
        language: Option<String>,
    },

    /// Search stored comments by full text.
    Search {
        /// The search query string.
        query: String,

        /// Filter by author substring (case-insensitive).
        #[arg(long)]
        author: Option<String>,

        /// Comma-separated language codes, e.g. `cs,sk`.
        #[arg(long)]
        lang: Option<String>,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Look up comments whose verse interval overlaps a citation.
    Range {
        /// Citation, e.g. "Lk 3,10-18"; a bare "Lk 3" scans the chapter.
        reference: String,
    },

    /// Start the JSON HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Import {
            connector,
            dry_run,
            limit,
        } => {
            ingest::run_import(&cfg, &connector, dry_run, limit).await?;
        }
        Commands::Add {
            reference,
            comment,
            author,
            language,
        } => {
            run_add(&cfg, &reference, &comment, author, language).await?;
        }
        Commands::Search {
            query,
            author,
            lang,
            limit,
        } => {
            query::run_search(&cfg, &query, author, lang, limit).await?;
        }
        Commands::Range { reference } => {
            query::run_range(&cfg, &reference).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

async fn run_add(
    cfg: &config::Config,
    reference: &str,
    comment: &str,
    author: Option<String>,
    language: Option<String>,
) -> anyhow::Result<()> {
    if comment.trim().is_empty() {
        anyhow::bail!("comment must not be empty");
    }
    let parsed = reference::parse_reference(reference)?;
    let language = language.unwrap_or_else(|| cfg.ingest.language.clone());

    let raw = models::RawExtraction {
        subject: reference.to_string(),
        title: String::new(),
        comment: comment.to_string(),
        body: comment.to_string(),
        author,
        date: None,
    };
    let rec = record::build(&raw, &parsed, &language);

    let pool = db::connect(cfg).await?;
    let written = store::put_if_absent(&pool, &rec).await?;
    pool.close().await;

    if written {
        println!("Saved {} {}:{}-{} ({})", rec.book, rec.chapter, rec.verse_from, rec.verse_to, rec.id);
    } else {
        println!("Skipped: identical comment already stored.");
    }
    Ok(())
}
