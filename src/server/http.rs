//! HTTP server implementation
//!
//! hyper http1 with TokioIo. Requests are dispatched by path prefix:
//! `/auth/*` and `/admin/*` consume the request; everything else is
//! matched exactly.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::{Authenticator, JwtValidator, PasswordHasher};
use crate::config::Args;
use crate::routes;
use crate::store::IdentityStore;
use crate::types::WardenError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state.
///
/// Everything here is immutable after startup: the signing key, the
/// hasher work factor and the store handle are built once in `main` and
/// read concurrently by every request worker. No locks, no per-session
/// state.
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn IdentityStore>,
    pub hasher: Arc<PasswordHasher>,
    pub jwt: Arc<JwtValidator>,
    pub authenticator: Authenticator,
    started_at: Instant,
}

impl AppState {
    /// Build the state from validated configuration and a store handle
    pub fn new(args: Args, store: Arc<dyn IdentityStore>) -> Result<Self, WardenError> {
        let hasher = Arc::new(args.password_hasher()?);
        let jwt = Arc::new(args.jwt_validator()?);
        let authenticator = Authenticator::new(Arc::clone(&store), Arc::clone(&hasher));

        Ok(Self {
            args,
            store,
            hasher,
            jwt,
            authenticator,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Run the HTTP server until the process exits
pub async fn run(state: Arc<AppState>) -> Result<(), WardenError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Warden listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - insecure defaults in effect");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    // Auth routes (/auth/*) consume the request
    if path.starts_with("/auth") {
        if let Some(response) = routes::handle_auth_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(not_found_response(&path));
    }

    // Admin routes (/admin/*) consume the request; the role guard runs
    // inside before any handler
    if path.starts_with("/admin") {
        if let Some(response) = routes::handle_admin_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(not_found_response(&path));
    }

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            to_boxed(routes::health_check(Arc::clone(&state)).await)
        }

        // Readiness probe - requires a reachable identity store
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            to_boxed(routes::readiness_check(Arc::clone(&state)).await)
        }

        // Version info for deployment verification
        (Method::GET, "/version") => to_boxed(routes::version_info()),

        // CORS preflight
        (Method::OPTIONS, _) => routes::cors_preflight(),

        _ => not_found_response(&path),
    };

    Ok(response)
}

fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(|never| match never {}).boxed())
}

fn not_found_response(path: &str) -> Response<BoxBody> {
    let body = serde_json::json!({ "error": format!("Not found: {}", path) }).to_string();

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)).map_err(|never| match never {}).boxed())
        .unwrap()
}
