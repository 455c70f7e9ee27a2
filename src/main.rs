use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sample_capture::{
    config::{ControllerConfig, RecorderConfig},
    controller, recorder, CaptureDeviceFactory, CaptureService, Config, ConfirmClient,
    ControllerState, RecorderClient, RecorderState, SessionTracker, SettingsStore, TrackerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sample-capture", version, about = "Two-node musical sample capture")]
struct Cli {
    /// Service configuration file (extension optional)
    #[arg(short, long, default_value = "config/sample-capture")]
    config: String,

    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand)]
enum Role {
    /// Accept capture requests and drive the recorder
    Controller,
    /// Perform captures for the controller
    Recorder,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Sample Capture v{}", env!("CARGO_PKG_VERSION"));

    match cli.role {
        Role::Controller => run_controller(cfg.controller).await,
        Role::Recorder => run_recorder(cfg.recorder).await,
    }
}

async fn run_controller(cfg: ControllerConfig) -> Result<()> {
    let settings = Arc::new(SettingsStore::load(&cfg.settings_path)?);
    info!("Recorder endpoint: {}", settings.get().await.recorder_endpoint);

    let sessions = Arc::new(SessionTracker::new(TrackerConfig {
        session_timeout: cfg.session_timeout(),
        retention: cfg.session_retention(),
        ..TrackerConfig::default()
    }));
    let sweeper = Arc::clone(&sessions).spawn_sweeper(cfg.sweep_interval());

    let recorder = RecorderClient::new(cfg.dispatch_timeout())?;
    let app = controller::create_router(ControllerState::new(settings, sessions, recorder));

    serve(&cfg.bind, cfg.port, app, "controller").await?;
    sweeper.abort();
    Ok(())
}

async fn run_recorder(cfg: RecorderConfig) -> Result<()> {
    let device = CaptureDeviceFactory::create(cfg.device)?;
    let confirmer = ConfirmClient::new(
        cfg.controller_url.clone(),
        cfg.confirm_retries,
        Duration::from_millis(cfg.confirm_backoff_ms),
    )?;
    let captures = Arc::new(CaptureService::new(
        device,
        cfg.recordings_path.clone(),
        cfg.sample_rate,
        cfg.channels,
        cfg.max_concurrent_captures,
        confirmer,
    )?);
    info!("Confirmations go to {} ({:?} ack)", cfg.controller_url, cfg.ack_mode);

    let app = recorder::create_router(RecorderState::new(captures, cfg.ack_mode));

    serve(&cfg.bind, cfg.port, app, "recorder").await
}

async fn serve(bind: &str, port: u16, app: axum::Router, role: &str) -> Result<()> {
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("{} listening on {}", role, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
