use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cnl_backend::config::load_config;
use cnl_backend::observability::{logging, metrics};
use cnl_backend::HttpServer;

/// Backend del sitio web de Comercio y Negocios Latam SAC.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file. Environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "cnl-backend starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        general_limit = config.rate_limit.general.max_requests,
        contact_limit = config.rate_limit.contact.max_requests,
        email_configured = !config.email.user.is_empty(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
