//! linkvault Bot Binary
//!
//! Runs the link bot over a line transport on stdin/stdout.
//!
//! Input lines are `<user_id> <text>`; replies are written as
//! `<user_id> <reply line>`. Logs go to stderr.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use linkvault::bot::{serve, LineTransport, LinkBot};
use linkvault::metadata::HttpScraper;
use linkvault::{Config, Context, LinkStore, Maintenance};
use tracing_subscriber::{fmt, EnvFilter};

/// linkvault bot
#[derive(Parser, Debug)]
#[command(name = "linkvault")]
#[command(about = "Save links sent to a chat bot, with their page metadata")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, env = "LINKVAULT_DATA_DIR", default_value = "./linkvault_data")]
    data_dir: String,

    /// Engine cache size in MB
    #[arg(short = 'c', long, env = "LINKVAULT_CACHE_MB", default_value = "64")]
    cache_mb: usize,

    /// Seconds between background reclaim passes
    #[arg(short = 'r', long, env = "LINKVAULT_RECLAIM_INTERVAL_SECS", default_value = "300")]
    reclaim_interval_secs: u64,

    /// Disable background reclaim
    #[arg(long)]
    no_reclaim: bool,

    /// Seconds allowed for one metadata fetch
    #[arg(short = 't', long, env = "LINKVAULT_SCRAPE_TIMEOUT_SECS", default_value = "30")]
    scrape_timeout_secs: u64,
}

/// Megabytes to bytes, `None` on overflow
fn cache_size_bytes(cache_mb: usize) -> Option<usize> {
    cache_mb.checked_mul(1024 * 1024)
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linkvault=debug"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("linkvault v{}", linkvault::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let Some(cache_bytes) = cache_size_bytes(args.cache_mb) else {
        tracing::error!("Cache size of {} MB does not fit in memory addresses", args.cache_mb);
        std::process::exit(1);
    };

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .cache_size_bytes(cache_bytes)
        .reclaim_enabled(!args.no_reclaim)
        .reclaim_interval(Duration::from_secs(args.reclaim_interval_secs))
        .scrape_timeout(Duration::from_secs(args.scrape_timeout_secs))
        .build();

    // Open store
    let store = match LinkStore::open(config.clone()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open link store: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = Context::background();

    let maintenance = if config.reclaim_enabled {
        match Maintenance::spawn(&store, &ctx, config.reclaim_interval) {
            Ok(maintenance) => Some(maintenance),
            Err(e) => {
                tracing::error!("Failed to start reclaim routine: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        tracing::info!("Background reclaim disabled");
        None
    };

    let scraper = match HttpScraper::new(config.scrape_timeout) {
        Ok(scraper) => scraper,
        Err(e) => {
            tracing::error!("Failed to build scraper: {}", e);
            std::process::exit(1);
        }
    };

    let bot = LinkBot::new(Arc::clone(&store), scraper, config.scrape_timeout);
    let mut transport = LineTransport::new(io::stdin().lock(), io::stdout().lock());

    tracing::info!("linkvault is running; reading messages from stdin");

    let exit_code = match serve(&ctx, &mut transport, &bot) {
        Ok(handled) => {
            tracing::info!("Handled {} messages", handled);
            0
        }
        Err(e) => {
            tracing::error!("Transport error: {}", e);
            1
        }
    };

    // Graceful shutdown: stop background work before releasing the engine
    ctx.cancel();
    if let Some(maintenance) = maintenance {
        maintenance.stop();
    }
    if let Err(e) = store.close() {
        tracing::error!("Error closing link store: {}", e);
    }

    tracing::info!("linkvault stopped");
    std::process::exit(exit_code);
}
