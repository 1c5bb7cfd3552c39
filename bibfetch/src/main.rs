//! bibfetch - resolve a book code into one merged bibliographic record
//!
//! Prints the merged record as JSON on stdout. Logs go to stderr.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bibfetch::isbn::{self, IsbnKind};
use bibfetch::{resolve_settings, CliOverrides, Resolver, SourceId};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for bibfetch
#[derive(Parser, Debug)]
#[command(name = "bibfetch")]
#[command(about = "Resolve an ISBN into one bibliographic record from several catalog sources")]
#[command(version)]
struct Args {
    /// ISBN-10 or ISBN-13 (hyphens allowed)
    code: String,

    /// Sources to query, comma separated (google_books, open_library, isbndb, amazon)
    #[arg(short, long, value_delimiter = ',')]
    sources: Option<Vec<SourceId>>,

    /// Per-request timeout in seconds (0 disables)
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Configuration file (default: <config_dir>/bibfetch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print the record each source returned
    #[arg(long)]
    show_sources: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before the subscriber exists, since it selects the log level
    let (toml_config, config_path) =
        bibfetch_common::config::load_config_with_location(args.config.as_deref())
            .context("Failed to load configuration")?;

    // Initialize tracing (RUST_LOG overrides the configured level)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting bibfetch v{} ({} {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using built-in defaults"),
    }

    let cli = CliOverrides {
        sources: args.sources.clone(),
        timeout_secs: args.timeout_secs,
    };
    let settings = resolve_settings(&cli, &toml_config).context("Invalid configuration")?;
    let resolver = Resolver::from_settings(&settings).context("Failed to initialize sources")?;

    match isbn::classify(&args.code) {
        Some(IsbnKind::Isbn10) => info!(code = %args.code, "Resolving ISBN-10"),
        Some(IsbnKind::Isbn13) => info!(code = %args.code, "Resolving ISBN-13"),
        None => warn!(code = %args.code, "Code is not a valid ISBN, resolving anyway"),
    }

    let (merged, results) = resolver.resolve_with_sources(&args.code).await;

    let output = if args.show_sources {
        let sources: BTreeMap<_, _> = results.into_iter().collect();
        serde_json::json!({ "merged": merged, "sources": sources })
    } else {
        serde_json::to_value(&merged).context("Failed to serialize record")?
    };

    let rendered = if args.compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    }
    .context("Failed to render JSON")?;

    println!("{}", rendered);
    Ok(())
}
