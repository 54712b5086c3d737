mod connection_tracker;
mod protocol;
mod score_saver;
mod server_config;
mod sqlite_store;
mod web_server;
mod ws_handler;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use common::config::ConfigManager;
use common::leaderboard::{InMemoryScoreStore, LeaderboardService, ScoreGateway};
use common::{log, logger};
use connection_tracker::ConnectionTracker;
use server_config::ServerConfig;
use sqlite_store::SqliteScoreStore;
use web_server::{run_web_server, WebServerState};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[command(name = "snake_leaderboard_server")]
struct Args {
    /// YAML config file; defaults are used when it does not exist.
    #[arg(long, default_value = "snake_server_config.yaml")]
    config: String,

    /// Overrides `bind_address` from the config file.
    #[arg(long)]
    bind: Option<String>,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager = ConfigManager::<_, ServerConfig>::from_yaml_file(&args.config);
    let mut config = config_manager.get_config()?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    log!("Loaded config from {}", args.config);

    match config.database_path.clone() {
        Some(path) => {
            let store = SqliteScoreStore::open(&path)?;
            log!("Storing scores in {}", path);
            serve(store, config).await
        }
        None => {
            log!("No database_path configured, scores are kept in memory");
            serve(InMemoryScoreStore::new(), config).await
        }
    }
}

async fn serve<G: ScoreGateway>(
    store: G,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ConnectionTracker::new();
    let state = WebServerState {
        leaderboard: LeaderboardService::new(store, config.leaderboard_size),
        tracker: tracker.clone(),
        game_settings: Arc::new(config.game.clone()),
    };

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }

        log!(
            "Shutdown signal received, notifying {} client(s)...",
            tracker.active_sessions().await
        );
        tracker.notify_shutdown();

        tokio::time::sleep(SHUTDOWN_GRACE).await;
    };

    run_web_server(
        state,
        &config.bind_address,
        config.static_files_path.as_deref(),
        shutdown_signal,
    )
    .await?;

    log!("Server shut down gracefully");

    Ok(())
}
