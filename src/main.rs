use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsis_exporter::{
    config::Config,
    decoder::{LockVocabulary, RowDecoder},
    metrics::ModemMetrics,
    modem::ModemClient,
    poller::ScrapeOrchestrator,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "docsis-exporter")]
#[command(about = "Prometheus exporter for Netgear DOCSIS cable modem channel statistics")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Modem base URL (overrides config file)
    #[arg(short = 'm', long, value_name = "URL")]
    modem_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("docsis_exporter={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DOCSIS exporter v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file (env overrides applied inside)
    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(modem_url) = cli.modem_url {
        config.modem.url = modem_url;
    }

    info!("Using modem at {}", config.modem.url);

    let metrics = Arc::new(ModemMetrics::new()?);
    let client = ModemClient::new(&config.modem)?;
    let decoder = RowDecoder::new(LockVocabulary::default());
    let mut orchestrator =
        ScrapeOrchestrator::new(client, decoder, metrics.clone(), &config.scrape);

    // No scraping is possible without a session; a failed startup login is fatal.
    info!("Logging in to modem");
    orchestrator.authenticate().await?;

    let web_server = WebServer::new(&config.web, metrics)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );

    // Create a channel to signal when the server is ready or fails to bind
    let (server_ready_tx, server_ready_rx) = tokio::sync::oneshot::channel();

    // Start the web server in a separate task
    let server_handle = tokio::spawn(async move {
        // This will signal immediately when bind succeeds/fails, then block until shutdown
        if let Err(e) = web_server.serve_with_signal(server_ready_tx).await {
            tracing::error!("Web server failed: {}", e);
        }
    });

    // Wait for the server bind result (success or failure)
    match server_ready_rx.await {
        Ok(Ok(())) => {
            info!("Web server is now listening, starting scrape loop");
        }
        Ok(Err(bind_error)) => {
            tracing::error!("Failed to bind web server: {}", bind_error);
            return Err(bind_error);
        }
        Err(_) => {
            tracing::error!("Web server task completed without signaling");
            return Err(anyhow::anyhow!("Web server failed to start"));
        }
    }

    tokio::spawn(async move {
        orchestrator.run().await;
    });

    // Wait for the server to complete (this will block until shutdown)
    server_handle.await?;

    Ok(())
}
