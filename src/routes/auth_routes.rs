//! HTTP routes for authentication
//!
//! - POST /auth/login    - Authenticate credentials and get a JWT token
//! - GET  /auth/me       - Current caller info from the token
//! - POST /auth/password - Rotate the caller's password
//!
//! Every credential failure in login maps to the same generic 401 body so
//! callers cannot probe which usernames exist; the specific cause is only
//! visible in server logs.

use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{authorize, CallerContext, Role};
use crate::routes::{
    cors_preflight, error_response, get_auth_header, json_response, parse_json_body, BoxBody,
    ErrorResponse, SuccessResponse,
};
use crate::server::AppState;
use crate::store::{Identity, IdentityStatus};
use crate::types::WardenError;
use zeroize::Zeroizing;

/// New passwords shorter than this are rejected before hashing
pub(crate) const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Identity fields that may travel outward. Built explicitly so the
/// password hash can never ride along.
#[derive(Debug, Serialize)]
pub struct IdentitySummary {
    pub id: String,
    pub username: String,
    pub roles: Vec<Role>,
    pub status: IdentityStatus,
}

impl IdentitySummary {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            username: identity.username.clone(),
            roles: identity.roles.clone(),
            status: identity.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub identity: IdentitySummary,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

// =============================================================================
// Flows
// =============================================================================

/// Login flow: verify credentials, mint a token bound to the identity and
/// its roles at this moment.
pub(crate) async fn login(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<AuthResponse, WardenError> {
    let identity = state.authenticator.authenticate(username, password).await?;
    let token = state.jwt.issue(&identity)?;

    info!("Login successful: {}", identity.username);

    Ok(AuthResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.expiry_seconds(),
        identity: IdentitySummary::from_identity(&identity),
    })
}

/// Password rotation flow: re-verify the current password, then store a
/// fresh-salted hash of the replacement.
pub(crate) async fn change_password(
    state: &AppState,
    caller: &CallerContext,
    current_password: &str,
    new_password: &str,
) -> Result<(), WardenError> {
    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(WardenError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    // Same collapsed rejection as login if the current password is wrong
    let identity = state
        .authenticator
        .authenticate(&caller.username, current_password)
        .await?;

    let hasher = Arc::clone(&state.hasher);
    let plaintext = Zeroizing::new(new_password.to_string());
    let new_hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| WardenError::Internal(format!("Hash task failed: {}", e)))??;

    state.store.set_password_hash(&identity.id, &new_hash).await?;

    info!("Password rotated: {}", identity.username);
    Ok(())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /auth/login
async fn handle_login(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let mut body: LoginRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };

    if body.username.is_empty() || body.password.is_empty() {
        return json_response(
            StatusCode::BAD_REQUEST,
            &ErrorResponse {
                error: "Missing required fields: username, password".into(),
                code: None,
            },
        );
    }

    let password = Zeroizing::new(std::mem::take(&mut body.password));

    match login(&state, &body.username, &password).await {
        Ok(resp) => json_response(StatusCode::OK, &resp),
        Err(e) => error_response(e),
    }
}

/// GET /auth/me
///
/// Echoes the claims of a valid token. Stateless: no storage lookup, so
/// the answer is as fresh as the token's issuance time.
async fn handle_me(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let caller = match authorize(&state.jwt, get_auth_header(&req), &[]) {
        Ok(c) => c,
        Err(e) => {
            warn!("Rejected /auth/me request: {}", e);
            return error_response(e.into());
        }
    };

    json_response(
        StatusCode::OK,
        &MeResponse {
            id: caller.id,
            username: caller.username,
            roles: caller.roles,
        },
    )
}

/// POST /auth/password
async fn handle_change_password(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let caller = match authorize(&state.jwt, get_auth_header(&req), &[]) {
        Ok(c) => c,
        Err(e) => {
            warn!("Rejected password change request: {}", e);
            return error_response(e.into());
        }
    };

    let mut body: PasswordChangeRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };

    if body.current_password.is_empty() || body.new_password.is_empty() {
        return json_response(
            StatusCode::BAD_REQUEST,
            &ErrorResponse {
                error: "Missing required fields: currentPassword, newPassword".into(),
                code: None,
            },
        );
    }

    let current = Zeroizing::new(std::mem::take(&mut body.current_password));
    let replacement = Zeroizing::new(std::mem::take(&mut body.new_password));

    match change_password(&state, &caller, &current, &replacement).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Password updated".into(),
            },
        ),
        Err(e) => error_response(e),
    }
}

// =============================================================================
// Main Router
// =============================================================================

/// Handle auth-related HTTP requests.
///
/// Returns Some(response) if the request was handled, None if not an auth
/// route.
pub async fn handle_auth_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let method = req.method();

    if !path.starts_with("/auth") {
        return None;
    }

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    // Remove query string for matching
    let path = path.split('?').next().unwrap_or(path).to_string();

    let response = match (method, path.as_str()) {
        (&Method::POST, "/auth/login") => handle_login(req, state).await,
        (&Method::GET, "/auth/me") => handle_me(req, state).await,
        (&Method::POST, "/auth/password") => handle_change_password(req, state).await,

        // Method not allowed
        (_, "/auth/login") | (_, "/auth/me") | (_, "/auth/password") => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &ErrorResponse {
                error: "Method not allowed".into(),
                code: None,
            },
        ),

        // Auth endpoint not found
        _ => json_response(
            StatusCode::NOT_FOUND,
            &ErrorResponse {
                error: "Auth endpoint not found".into(),
                code: None,
            },
        ),
    };

    Some(response)
}
