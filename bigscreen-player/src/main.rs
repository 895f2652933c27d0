//! Bigscreen Player - main entry point
//!
//! Unattended continuous playback daemon: checks API permissions, starts the
//! live monitor and the playback controller, then runs until terminated.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bigscreen_player::catalogue::{Gateway, HttpMediaApi};
use bigscreen_player::config::Config;
use bigscreen_player::playback::{
    CandidateBuilder, LiveMonitor, PlaybackController, PlayerControl, PlayerSupervisor, PlayQueue,
    QueueManager,
};

/// Command-line arguments for bigscreen-player
#[derive(Parser, Debug)]
#[command(name = "bigscreen-player")]
#[command(about = "Unattended continuous playback of a remote media catalogue")]
#[command(version)]
struct Args {
    /// API key presented to the media service
    #[arg(env = "BIGSCREEN_API_KEY")]
    api_key: String,

    /// Configuration file location
    #[arg(short, long, default_value = "./config.toml", env = "BIGSCREEN_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bigscreen_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;

    info!(api_base_url = %config.api_base_url, "starting bigscreen player");

    let api = HttpMediaApi::new(&config.api_base_url, &args.api_key)
        .context("failed to build api client")?;
    let gateway = Arc::new(Gateway::new(Arc::new(api)));

    // Refuse to run without the capabilities playback needs.
    let permissions = gateway
        .permissions()
        .await
        .context("permission check returned no data")?;
    if !permissions.vod_uris {
        error!("do not have \"vodUris\" api permission");
        std::process::exit(1);
    }
    if config.play_live_streams && !permissions.stream_uris {
        error!("do not have \"streamUris\" api permission");
        std::process::exit(1);
    }
    info!("initialised");

    let (supervisor, player_events) =
        PlayerSupervisor::new(&config.player_command, &config.audio_output);

    // Clear stray player processes left over from a previous run.
    supervisor.stop().await;

    let builder = CandidateBuilder::new(config.quality_ids.clone(), config.denylisted_ids.clone());
    let queue = PlayQueue::new();
    let queue_manager = QueueManager::new(
        Arc::clone(&gateway),
        builder.clone(),
        config.playlist_ids.clone(),
        config.media_item_ids.clone(),
        config.randomise,
        queue.clone(),
    );

    let player: Arc<dyn PlayerControl> = supervisor.clone();
    let controller = PlaybackController::new(Arc::clone(&gateway), player, queue, queue_manager);
    controller.start(player_events);

    if config.play_live_streams {
        let monitor = LiveMonitor::new(
            Arc::clone(&gateway),
            builder,
            config.allowlisted_stream_ids.clone(),
            Arc::clone(&controller),
        );
        tokio::spawn(monitor.run());
    }

    controller.advance().await;

    shutdown_signal().await;
    info!("shutting down");
    supervisor.stop().await;
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
