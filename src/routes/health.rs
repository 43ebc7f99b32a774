//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe (is the service running?)
//! - /ready, /readyz   - Readiness probe (is the identity store reachable?)
//! - /version          - Build info for deployment verification

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if the service is running)
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Operating mode
    pub mode: &'static str,
    /// Identity store status
    pub store: StoreStatus,
    /// Current timestamp
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct StoreStatus {
    pub backend: &'static str,
    pub reachable: bool,
}

fn json_ok<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body)
        .unwrap_or_else(|_| r#"{"healthy":false,"error":"Serialization failed"}"#.to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

/// Liveness probe. Returns 200 whenever the process is serving requests,
/// regardless of store reachability.
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let reachable = state.store.ping().await.is_ok();

    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.uptime_seconds(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        store: StoreStatus {
            backend: state.store.backend_name(),
            reachable,
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    json_ok(StatusCode::OK, &response)
}

/// Readiness probe. Returns 200 only if the identity store answers;
/// without it no login or identity lookup can succeed.
pub async fn readiness_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let reachable = state.store.ping().await.is_ok();

    let response = HealthResponse {
        healthy: reachable,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.uptime_seconds(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        store: StoreStatus {
            backend: state.store.backend_name(),
            reachable,
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    let status = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    json_ok(status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "warden",
    };

    json_ok(StatusCode::OK, &response)
}
