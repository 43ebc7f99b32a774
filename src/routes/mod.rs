//! HTTP routes for Warden

pub mod admin_identities;
pub mod auth_routes;
pub mod health;

pub use admin_identities::handle_admin_request;
pub use auth_routes::handle_auth_request;
pub use health::{health_check, readiness_check, version_info};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::types::WardenError;

pub(crate) type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Error payload shape shared by every route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// Response Helpers
// =============================================================================

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

/// Map an error to its HTTP response.
///
/// The error's own display string is the body, so unauthorized causes
/// stay collapsed: they were already merged when the error was built.
pub(crate) fn error_response(err: WardenError) -> Response<BoxBody> {
    let code = match &err {
        WardenError::BadRequest(_) => "BAD_REQUEST",
        WardenError::Unauthorized => "UNAUTHORIZED",
        WardenError::Forbidden(_) => "FORBIDDEN",
        WardenError::NotFound(_) => "NOT_FOUND",
        WardenError::Conflict(_) => "CONFLICT",
        WardenError::Database(_) => "DB_ERROR",
        WardenError::Internal(_) | WardenError::Config(_) => "INTERNAL_ERROR",
    };

    let (status, message) = err.into_status_code_and_body();
    json_response(
        status,
        &ErrorResponse {
            error: message,
            code: Some(code.into()),
        },
    )
}

pub(crate) fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub(crate) fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub(crate) fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

pub(crate) async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, WardenError> {
    let body = req
        .collect()
        .await
        .map_err(|e| WardenError::BadRequest(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > 10240 {
        return Err(WardenError::BadRequest("Request body too large".into()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| WardenError::BadRequest(format!("Invalid JSON: {}", e)))
}

pub(crate) fn get_auth_header(req: &Request<hyper::body::Incoming>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}
