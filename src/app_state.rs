//! Shared application state injected into all Axum handlers.

use crate::health::HealthReporter;
use crate::shipper::LogShipper;
use crate::sink::SqlStatement;
use crate::uplink::UplinkHandle;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Readiness view of the database uplink, for `/health`.
    pub health: HealthReporter,
    /// Database uplink handle; route handlers enqueue statements here.
    pub database: UplinkHandle<SqlStatement>,
    /// Remote log shipper handle.
    pub shipper: LogShipper,
}
