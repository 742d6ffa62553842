//! Catalog-Sync main entry point
//!
//! This is the command-line interface for the Catalog-Sync catalog mirror.

use anyhow::Context;
use catalog_sync::config::{load_config_with_hash, Config};
use catalog_sync::output::{load_statistics, print_statistics, print_sync_report};
use catalog_sync::storage::open_storage;
use catalog_sync::sync::{sync_catalog, total_pages};
use clap::Parser;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Catalog-Sync: a bounded-concurrency catalog mirror
///
/// Catalog-Sync pages through a remote integration catalog with a capped
/// number of concurrent requests and stores the full list under a single
/// key in a local key/value store.
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(version)]
#[command(about = "A bounded-concurrency catalog mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without any network call
    #[arg(long, conflicts_with = "show_stored")]
    dry_run: bool,

    /// Show the catalog currently stored under the configured key and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_stored: bool,

    /// Number of stored items to list with --show-stored
    #[arg(long, default_value_t = 20, requires = "show_stored")]
    list: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.show_stored {
        handle_show_stored(&config, cli.list)?;
    } else {
        handle_sync(&config, &config_hash, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_sync=info,warn"),
            1 => EnvFilter::new("catalog_sync=debug,info"),
            2 => EnvFilter::new("catalog_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Sync Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Item URL prefix: {}", config.source.item_url_prefix);

    println!("\nSync:");
    println!("  Page size: {}", config.sync.page_size);
    println!(
        "  Max concurrent requests: {}",
        config.sync.max_concurrent_requests
    );
    if let Some(page_size) = NonZeroU32::new(config.sync.page_size) {
        println!(
            "  Example: 1000 items -> {} pages",
            total_pages(1000, page_size)
        );
    }

    println!("\nTransport:");
    println!("  Max retries: {}", config.transport.max_retries);
    println!("  Backoff: attempt x {}ms", config.transport.retry_delay_ms);
    println!("  Timeout: {}s", config.transport.timeout_secs);
    println!("  User agent: {}", config.transport.user_agent);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Store: {}", config.output.key_value_store);
    println!("  Key: {}", config.output.key);

    println!("\n✓ Configuration is valid");
}

/// Handles the --show-stored mode: prints the stored catalog
fn handle_show_stored(config: &Config, limit: usize) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(
        Path::new(&config.output.database_path),
        &config.output.key_value_store,
    )
    .context("Failed to open storage")?;
    let stats = load_statistics(&storage, &config.output.key)?;

    print_statistics(&stats, limit);
    Ok(())
}

/// Handles the main sync operation
async fn handle_sync(config: &Config, config_hash: &str, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Starting sync: page size {}, max {} concurrent requests",
        config.sync.page_size,
        config.sync.max_concurrent_requests
    );

    let report = sync_catalog(config, config_hash)
        .await
        .context("Catalog sync failed")?;

    tracing::info!("Sync completed successfully");
    if !quiet {
        print_sync_report(&report);
    }
    Ok(())
}
