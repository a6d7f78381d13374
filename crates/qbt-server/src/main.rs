use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use qbt_client::QbitClient;
use qbt_common::{
    ExporterConfig, LogLevel, RawConfig,
    config::{
        DEFAULT_EXPORTER_ADDRESS, DEFAULT_EXPORTER_PORT, DEFAULT_METRICS_PREFIX,
        DEFAULT_REQUEST_TIMEOUT_SECS,
    },
};
use qbt_metrics::{ExporterState, MetricsAggregator, exporter_router};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "qbittorrent-exporter",
    about = "Prometheus exporter for the qBittorrent Web API"
)]
struct Cli {
    /// qBittorrent Web UI host, optionally with scheme and path
    #[arg(long, env = "QBITTORRENT_HOST")]
    host: Option<String>,

    #[arg(long, env = "QBITTORRENT_PORT")]
    port: Option<String>,

    #[arg(long, env = "QBITTORRENT_USER", default_value = "")]
    username: String,

    #[arg(long, env = "QBITTORRENT_PASS", default_value = "", hide_env_values = true)]
    password: String,

    #[arg(long, env = "EXPORTER_ADDRESS", default_value = DEFAULT_EXPORTER_ADDRESS)]
    exporter_address: String,

    #[arg(long, env = "EXPORTER_PORT", default_value_t = DEFAULT_EXPORTER_PORT)]
    exporter_port: u16,

    /// TRACE, DEBUG, INFO, WARNING, ERROR or CRITICAL
    #[arg(long, env = "EXPORTER_LOG_LEVEL", default_value = "INFO")]
    log_level: String,

    #[arg(long, env = "METRICS_PREFIX", default_value = DEFAULT_METRICS_PREFIX)]
    metrics_prefix: String,

    /// Per-request timeout against the daemon
    #[arg(
        long,
        env = "QBITTORRENT_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,
}

impl From<Cli> for RawConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            username: cli.username,
            password: cli.password,
            exporter_address: cli.exporter_address,
            exporter_port: cli.exporter_port,
            log_level: cli.log_level,
            metrics_prefix: cli.metrics_prefix,
            request_timeout_secs: cli.request_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = ExporterConfig::from_parts(Cli::parse().into());
    let level = config
        .as_ref()
        .map(|config| config.log_level)
        .unwrap_or_default();
    init_tracing(level)?;

    let config = match config {
        Ok(config) => Arc::new(config),
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return Ok(ExitCode::FAILURE);
        }
    };

    info!("Exporter is starting up");
    let client = match QbitClient::new(&config.daemon) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!(error = %err, "invalid qBittorrent address");
            return Ok(ExitCode::FAILURE);
        }
    };
    info!(
        daemon = client.base_url(),
        authenticated = config.daemon.has_credentials(),
        "qBittorrent client ready"
    );

    let aggregator = MetricsAggregator::new(client, Arc::clone(&config));
    let app = exporter_router(Arc::new(ExporterState::new(aggregator)));

    let addr = format!("{}:{}", config.listen_address, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Exporter listening on port {}", config.listen_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Exporter has shutdown");

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(level: LogLevel) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env().add_directive(level.as_directive().parse()?);
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .init();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
