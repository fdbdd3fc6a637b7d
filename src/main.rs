use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use npofeed::cache::BroadcastStore;
use npofeed::pipeline::{start_feed_updater, FeedUpdater};
use npofeed::{
    BroadcastClient, BroadcastSync, ChannelProgramme, Config, FileBroadcastStore, Result,
    WebServer,
};

#[derive(Parser, Debug)]
#[command(name = "npofeed", about = "NPO Radio broadcast cache and podcast feed server")]
struct Args {
    /// Configuration file
    #[arg(long, short, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve cached feeds over HTTP, refreshing them in the background
    Serve,
    /// Sync one channel/programme pair
    Fetch {
        /// Channel key, e.g. npo-3fm
        channel: String,
        /// Programme key, e.g. 3voor12-radio
        programme: String,
    },
    /// Sync every seeded and cached pair once
    Refresh,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config = match Config::load_with_env(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", args.config.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = npofeed::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        npofeed::logging::init_console_only(&config.logging.level);
    }

    match run(args.command, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> Result<ExitCode> {
    config.validate()?;

    let store: Arc<dyn BroadcastStore> =
        Arc::new(FileBroadcastStore::new(&config.cache.path, &config.cache.namespace)?);
    let client = BroadcastClient::new(&config.remote)?;
    let sync = Arc::new(
        BroadcastSync::new(client, store.clone()).with_max_pages(config.remote.max_pages),
    );
    let seeds = config.updater.seed_keys()?;

    match command {
        Command::Serve => {
            if !config.web.enabled {
                warn!("Web server is disabled in configuration; nothing to serve");
                return Ok(ExitCode::SUCCESS);
            }

            if config.updater.enabled {
                let updater =
                    FeedUpdater::new(sync, seeds).with_interval(config.updater.interval_secs);
                start_feed_updater(updater);
            }

            let server = WebServer::new(&config.web, &config.feed, store)?;
            info!("Serving feeds at {}", config.web.base_url);
            server.run().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch { channel, programme } => {
            let key = ChannelProgramme::new(channel, programme)?;
            let outcome = sync.sync(&key).await?;
            info!(
                "{}: {} start, {} record(s) cached",
                key, outcome.mode, outcome.total
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Refresh => {
            let report = sync.refresh_all(&seeds).await;
            for (key, reason) in &report.failed {
                error!("{}: {}", key, reason);
            }
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
