//! medlink-uplink server entry point.
//!
//! Spawns the database and log-shipping supervisors and serves the
//! readiness endpoint.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use medlink_uplink::api;
use medlink_uplink::app_state::AppState;
use medlink_uplink::config::UplinkConfig;
use medlink_uplink::health::HealthReporter;
use medlink_uplink::shipper::LogShipper;
use medlink_uplink::sink::{MySqlSink, TcpLogSink};
use medlink_uplink::uplink::Supervisor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = UplinkConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting medlink-uplink");

    // Spawn the two supervisors; each owns its connection for the process
    // lifetime and retries transient failures on the fixed delay.
    let database = Supervisor::spawn(MySqlSink::new(config.database.clone()), config.retry_delay);
    let log_uplink =
        Supervisor::spawn(TcpLogSink::new(config.log_sink.clone()), config.retry_delay);

    let shipper = LogShipper::new(log_uplink, "app");
    let health = HealthReporter::new(database.state_receiver());

    let app_state = AppState {
        health,
        database,
        shipper: shipper.clone(),
    };

    // Build router
    let app = Router::new()
        .merge(api::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");
    shipper.info(format!(
        "Backend up and running on PORT : {}",
        config.listen_addr.port()
    ));

    axum::serve(listener, app).await?;

    Ok(())
}
