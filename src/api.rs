//! HTTP surface: the readiness endpoint.
//!
//! Routing for the CRUD API lives outside this crate; the uplink service
//! only mounts `GET /health`, the externally observable contract of the
//! health reporter.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::app_state::AppState;

/// Health check response body.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// `GET /health` — readiness of the database uplink.
///
/// Returns `200 {"status":"ok"}` once the connection is ready (raw link
/// open and session setup complete), `500 {"status":"db_error"}` in every
/// other state.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.health.is_ready() {
        (StatusCode::OK, Json(HealthResponse { status: "ok" }))
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse { status: "db_error" }),
        )
    }
}

/// Routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tokio::sync::watch;
    use tower::ServiceExt;

    use super::*;
    use crate::health::HealthReporter;
    use crate::shipper::LogShipper;
    use crate::uplink::{ConnectionState, UplinkHandle};

    fn state_with(db_state: ConnectionState) -> (AppState, watch::Sender<ConnectionState>) {
        let (database, _sql_rx, state_tx) = UplinkHandle::detached(db_state);
        let (log_handle, _log_rx, _log_tx) = UplinkHandle::detached(ConnectionState::Disconnected);
        let app_state = AppState {
            health: HealthReporter::new(state_tx.subscribe()),
            database,
            shipper: LogShipper::new(log_handle, "app"),
        };
        (app_state, state_tx)
    }

    async fn get_health(app_state: AppState) -> (StatusCode, serde_json::Value) {
        let app = routes().with_state(app_state);
        let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
            panic!("request build failed");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router call failed");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(body) = serde_json::from_slice(&bytes) else {
            panic!("body is not JSON");
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_reports_ok_when_ready() {
        let (app_state, _tx) = state_with(ConnectionState::Ready);
        let (status, body) = get_health(app_state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn health_reports_failure_when_not_ready() {
        for db_state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
        ] {
            let (app_state, _tx) = state_with(db_state);
            let (status, body) = get_health(app_state).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{db_state:?}");
            assert_eq!(body["status"], "db_error");
        }
    }

    #[tokio::test]
    async fn health_follows_state_changes() {
        let (app_state, tx) = state_with(ConnectionState::Disconnected);

        let (status, _) = get_health(app_state.clone()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        tx.send_replace(ConnectionState::Ready);
        let (status, _) = get_health(app_state).await;
        assert_eq!(status, StatusCode::OK);
    }
}
