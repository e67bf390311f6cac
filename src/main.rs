//! Price-Harvest main entry point
//!
//! This is the command-line interface for the Price-Harvest price extractor.

use clap::{Parser, Subcommand};
use price_harvest::config::{load_config_with_hash, Config};
use price_harvest::fetch::RetryingFetcher;
use price_harvest::pipeline::{JsonLinesPublisher, Publisher, RequestConsumer, RequestProcessor};
use price_harvest::{HarvestError, PriceExtractor};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncWrite, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Price-Harvest: a polite product price extractor
///
/// Price-Harvest fetches product pages under per-host rate limits, extracts
/// the price and currency from their markup and publishes normalized
/// "price measured" facts.
#[derive(Parser, Debug)]
#[command(name = "price-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite product price extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Consume parse requests (one JSON object per line) and publish price facts
    Consume {
        /// Read requests from this file instead of stdin
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Append published facts to this file instead of stdout
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Fetch and extract the given URLs, printing the result for each
    Check {
        /// Product page URLs
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> price_harvest::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout may carry published facts
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(HarvestError::Config(e));
        }
    };

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    match cli.command {
        Command::Consume { input, output } => handle_consume(config, input, output, cancel).await,
        Command::Check { urls } => handle_check(config, urls, cancel).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("price_harvest=info,warn"),
            1 => EnvFilter::new("price_harvest=debug,info"),
            2 => EnvFilter::new("price_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels `cancel` on Ctrl-C
fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            cancel.cancel();
        }
    });
}

/// Handles the consume mode: requests in, facts out
async fn handle_consume(
    config: Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    cancel: CancellationToken,
) -> price_harvest::Result<()> {
    let writer: Box<dyn AsyncWrite + Unpin + Send> = match output {
        Some(path) => Box::new(
            tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?,
        ),
        None => Box::new(tokio::io::stdout()),
    };
    let publisher: Arc<dyn Publisher> = Arc::new(JsonLinesPublisher::new(writer));

    let fetcher = Arc::new(RetryingFetcher::new(config.fetcher.clone())?);
    let processor = Arc::new(
        RequestProcessor::new(fetcher, publisher)
            .with_default_currency(&config.processor.default_currency),
    );
    let consumer = RequestConsumer::new(processor);

    let stats = match input {
        Some(path) => {
            tracing::info!("Reading parse requests from {}", path.display());
            let file = tokio::fs::File::open(path).await?;
            consumer.run(BufReader::new(file), cancel).await?
        }
        None => {
            tracing::info!("Reading parse requests from stdin");
            consumer.run(BufReader::new(tokio::io::stdin()), cancel).await?
        }
    };

    tracing::info!(
        "Consume finished: {} of {} requests published",
        stats.published,
        stats.received
    );
    Ok(())
}

/// Handles the check mode: probe URLs without publishing
async fn handle_check(
    config: Config,
    urls: Vec<String>,
    cancel: CancellationToken,
) -> price_harvest::Result<()> {
    let fetcher = RetryingFetcher::new(config.fetcher)?;
    let extractor = PriceExtractor::new();

    for url in urls {
        println!("URL: {}", url);

        let fetched = match fetcher.fetch(&url, &cancel).await {
            Ok(fetched) => fetched,
            Err(e) if e.is_cancelled() => {
                println!("result: cancelled");
                break;
            }
            Err(e) => {
                println!("result: error: {}\n", e);
                continue;
            }
        };

        let result = extractor.extract(&fetched.body);
        if result.found {
            println!(
                "result: price={} currency={:?}\n",
                result.price, result.currency
            );
        } else {
            println!("result: price not found\n");
        }
    }

    Ok(())
}
