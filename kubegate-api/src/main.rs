//! kubegate API server

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use kubegate_api::config::GatewayConfig;
use kubegate_api::kubernetes::Gateway;
use kubegate_api::{routes, shutdown, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--print-sample-config") {
        print!("{}", GatewayConfig::generate_sample());
        return Ok(());
    }

    let config = GatewayConfig::load()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Keep the file writer alive until exit
    let _log_guard = config.logging.init()?;
    info!("Configuration loaded successfully");

    if config.auth.is_default_secret() {
        warn!("auth.jwt_secret not set, using default (INSECURE for production!)");
    }

    let gateway = match Gateway::connect(config.gateway_options(), config.describer()).await {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Startup failed: {}", e);
            return Err(e.into());
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, gateway));
    let app = routes::router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("kubegate API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}
