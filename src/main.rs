use std::sync::Arc;

use tracing::{error, info};

use feed_relay::feed::HttpFetcher;
use feed_relay::relay::{Relay, Scheduler};
use feed_relay::store::SqliteStore;
use feed_relay::telegram::TelegramClient;
use feed_relay::web::WebServer;
use feed_relay::{Config, Database};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = feed_relay::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feed_relay::logging::init_console_only(&config.logging.level);
    }

    config.apply_env_overrides();

    if let Err(e) = run(config).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> feed_relay::Result<()> {
    config.validate()?;

    info!("Feed relay starting");
    info!(
        "{} sources, channel {}",
        config.sources.len(),
        config.telegram.channel
    );

    let db = Database::open(&config.database.path).await?;
    let store = SqliteStore::new(db, config.database.namespace.clone());
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let messenger = TelegramClient::new(&config.telegram)?;

    let relay = Arc::new(
        Relay::new(
            Arc::new(store),
            Arc::new(messenger),
            Arc::new(fetcher),
            config.sources.clone(),
        )
        .with_instant_view(config.instant_view.clone()),
    );

    if config.scheduler.enabled {
        let scheduler = Scheduler::with_interval(relay.clone(), config.scheduler.interval_secs);
        tokio::spawn(async move { scheduler.run().await });
    } else {
        info!("Scheduler disabled; waiting for external triggers");
    }

    let server = WebServer::new(&config.server, relay)?;
    server.run().await?;
    Ok(())
}
