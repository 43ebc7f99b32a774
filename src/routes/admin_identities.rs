//! Admin identity management routes
//!
//! - POST /admin/identities - Create an identity
//! - GET  /admin/identities - List identity summaries
//!
//! Both operations require the `admin` role. The guard runs before any
//! handler code, so a caller without the role never reaches the store.

use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::auth::{authorize, CallerContext, Role};
use crate::routes::auth_routes::{IdentitySummary, MIN_PASSWORD_LEN};
use crate::routes::{
    cors_preflight, error_response, get_auth_header, json_response, parse_json_body, BoxBody,
    ErrorResponse,
};
use crate::server::AppState;
use crate::store::NewIdentity;
use crate::types::WardenError;

#[derive(Debug, Deserialize)]
pub struct CreateIdentityRequest {
    pub username: String,
    pub password: String,
    /// Defaults to `["user"]` when omitted
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

// =============================================================================
// Flows
// =============================================================================

pub(crate) async fn create_identity(
    state: &AppState,
    caller: &CallerContext,
    username: &str,
    password: &str,
    roles: Option<Vec<Role>>,
) -> Result<IdentitySummary, WardenError> {
    if username.len() < 3 || username.len() > 50 {
        return Err(WardenError::BadRequest(
            "Username must be between 3 and 50 characters".into(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(WardenError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let hasher = Arc::clone(&state.hasher);
    let plaintext = Zeroizing::new(password.to_string());
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| WardenError::Internal(format!("Hash task failed: {}", e)))??;

    let created = state
        .store
        .insert(NewIdentity {
            username: username.to_string(),
            password_hash,
            roles: roles.unwrap_or_else(|| vec![Role::User]),
        })
        .await?;

    info!(
        "Identity created: {} (by admin {})",
        created.username, caller.username
    );
    Ok(IdentitySummary::from_identity(&created))
}

pub(crate) async fn list_identities(
    state: &AppState,
) -> Result<Vec<IdentitySummary>, WardenError> {
    let all = state.store.list().await?;
    Ok(all.iter().map(IdentitySummary::from_identity).collect())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /admin/identities
async fn handle_create_identity(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    caller: CallerContext,
) -> Response<BoxBody> {
    let mut body: CreateIdentityRequest = match parse_json_body(req).await {
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

    match create_identity(&state, &caller, &body.username, &password, body.roles).await {
        Ok(summary) => json_response(StatusCode::CREATED, &summary),
        Err(e) => error_response(e),
    }
}

/// GET /admin/identities
async fn handle_list_identities(state: Arc<AppState>) -> Response<BoxBody> {
    match list_identities(&state).await {
        Ok(summaries) => json_response(StatusCode::OK, &summaries),
        Err(e) => error_response(e),
    }
}

// =============================================================================
// Main Router
// =============================================================================

/// Handle admin HTTP requests.
///
/// Returns Some(response) if the request was handled, None if not an
/// admin route.
pub async fn handle_admin_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let method = req.method();

    if !path.starts_with("/admin") {
        return None;
    }

    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    // Every admin operation requires the admin role
    let caller = match authorize(&state.jwt, get_auth_header(&req), &[Role::Admin]) {
        Ok(c) => c,
        Err(e) => {
            warn!("Rejected {} {} request: {}", method, path, e);
            return Some(error_response(e.into()));
        }
    };

    let path = path.split('?').next().unwrap_or(path).to_string();

    let response = match (method, path.as_str()) {
        (&Method::POST, "/admin/identities") => handle_create_identity(req, state, caller).await,
        (&Method::GET, "/admin/identities") => handle_list_identities(state).await,

        (_, "/admin/identities") => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &ErrorResponse {
                error: "Method not allowed".into(),
                code: None,
            },
        ),

        _ => json_response(
            StatusCode::NOT_FOUND,
            &ErrorResponse {
                error: "Admin endpoint not found".into(),
                code: None,
            },
        ),
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IdentityStore, MemoryIdentityStore, NewIdentity};
    use clap::Parser;

    async fn admin_state() -> (AppState, CallerContext) {
        let args = crate::Args::parse_from([
            "warden",
            "--dev-mode",
            "--hash-mem-kib",
            "8",
            "--hash-iterations",
            "1",
            "--hash-parallelism",
            "1",
        ]);
        let store = Arc::new(MemoryIdentityStore::new());
        let state = AppState::new(args, store).unwrap();

        let admin = state
            .store
            .insert(NewIdentity {
                username: "root".into(),
                password_hash: state.hasher.hash("RootSecret1!").unwrap(),
                roles: vec![Role::User, Role::Admin],
            })
            .await
            .unwrap();

        let token = state.jwt.issue(&admin).unwrap();
        let caller = authorize(
            &state.jwt,
            Some(&format!("Bearer {}", token)),
            &[Role::Admin],
        )
        .unwrap();

        (state, caller)
    }

    #[tokio::test]
    async fn test_create_identity_defaults_to_user_role() {
        let (state, caller) = admin_state().await;

        let summary = create_identity(&state, &caller, "bob", "BobSecret1!", None)
            .await
            .unwrap();
        assert_eq!(summary.username, "bob");
        assert_eq!(summary.roles, vec![Role::User]);

        // The new identity can log in
        let identity = state
            .authenticator
            .authenticate("bob", "BobSecret1!")
            .await
            .unwrap();
        assert_eq!(identity.username, "bob");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let (state, caller) = admin_state().await;

        create_identity(&state, &caller, "bob", "BobSecret1!", None)
            .await
            .unwrap();
        let err = create_identity(&state, &caller, "bob", "OtherSecret1!", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_validation_rules() {
        let (state, caller) = admin_state().await;

        let err = create_identity(&state, &caller, "ab", "LongEnough1!", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = create_identity(&state, &caller, "bob", "short", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_token_cannot_pass_admin_guard() {
        let (state, _) = admin_state().await;

        let user = state
            .store
            .insert(NewIdentity {
                username: "carol".into(),
                password_hash: state.hasher.hash("CarolSecret1!").unwrap(),
                roles: vec![Role::User],
            })
            .await
            .unwrap();
        let token = state.jwt.issue(&user).unwrap();

        let err = authorize(
            &state.jwt,
            Some(&format!("Bearer {}", token)),
            &[Role::Admin],
        )
        .unwrap_err();
        assert_eq!(err, crate::types::AuthError::InsufficientRole);
    }

    #[tokio::test]
    async fn test_list_excludes_hash_material() {
        let (state, caller) = admin_state().await;
        create_identity(&state, &caller, "bob", "BobSecret1!", None)
            .await
            .unwrap();

        let summaries = list_identities(&state).await.unwrap();
        assert_eq!(summaries.len(), 2);

        let json = serde_json::to_string(&summaries).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
