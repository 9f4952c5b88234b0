//! Tag-Harvest main entry point
//!
//! This is the command-line interface for the Tag-Harvest question harvester.

use clap::Parser;
use std::path::{Path, PathBuf};
use tag_harvest::config::{hash_content, load_config_with_hash, validate, ApiKey, Config};
use tag_harvest::crawler::run_harvest;
use tag_harvest::storage::{open_store, QuestionStore};
use tracing_subscriber::EnvFilter;

/// Tag-Harvest: a polite question harvester
///
/// Fetches every Stack Exchange question carrying one tag, honoring the API's
/// backoff requests, and appends them to a local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "tag-harvest")]
#[command(version)]
#[command(about = "Harvests Stack Exchange questions for one tag", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// An optional Stack Exchange API key
    #[arg(long, value_name = "KEY")]
    key: Option<String>,

    /// Tag to harvest, overriding the configuration
    #[arg(long)]
    tag: Option<String>,

    /// Database path, overriding the configuration
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match load_effective_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tag_harvest=info,warn"),
            1 => EnvFilter::new("tag_harvest=debug,info"),
            2 => EnvFilter::new("tag_harvest=trace,debug"),
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

/// Loads the config file (or defaults) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> Result<(Config, String), Box<dyn std::error::Error>> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), hash_content(""))
        }
    };

    if let Some(key) = &cli.key {
        config.api.key = Some(ApiKey::new(key.clone()));
    }
    if let Some(tag) = &cli.tag {
        config.crawl.tag = tag.clone();
    }
    if let Some(output) = &cli.output {
        config.output.database_path = output.clone();
    }

    validate(&config)?;
    Ok((config, hash))
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Tag-Harvest Dry Run ===\n");

    println!("API:");
    println!("  Endpoint: {}/{}/questions", config.api.base_url, config.api.api_version);
    println!("  Site: {}", config.api.site);
    println!("  Filter: {}", config.api.filter);
    println!("  Page size: {}", config.api.page_size);
    println!("  Max attempts: {}", config.api.max_attempts);
    println!(
        "  API key: {}",
        if config.api.key.is_some() { "set" } else { "not set" }
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nTag: {}", config.crawl.tag);
    println!("Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))?;
    let runs = store.list_runs()?;

    println!("Crawl runs: {}", runs.len());
    for run in &runs {
        let quota = run
            .quota
            .map(|q| format!("{}/{}", q.remaining, q.max))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  #{} {} tag={} questions={} quota={}",
            run.id,
            run.crawled_at.to_rfc3339(),
            run.tag,
            run.question_count,
            quota
        );
    }
    println!("Stored questions: {}", store.count_questions()?);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    match run_harvest(config, config_hash).await {
        Ok(summary) => {
            tracing::info!(
                "Harvest completed: {} questions tagged '{}' ({} stored in total)",
                summary.questions,
                summary.tag,
                summary.receipt.total
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
