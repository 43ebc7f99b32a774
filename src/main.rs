//! Warden - identity and access gateway

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warden::{
    auth::Role,
    config::Args,
    db::MongoClient,
    server,
    store::{IdentityStore, MemoryIdentityStore, MongoIdentityStore, NewIdentity},
    WardenError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("warden={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Warden - Identity & Access Gateway");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!(
        "Mode: {}",
        if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" }
    );
    info!("Token expiry: {}s", args.jwt_expiry_seconds);
    info!(
        "Hash cost: m={} KiB, t={}, p={}",
        args.hash_mem_kib, args.hash_iterations, args.hash_parallelism
    );
    info!("======================================");

    // Connect the identity store (MongoDB; in-memory fallback in dev mode)
    let store: Arc<dyn IdentityStore> =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => match MongoIdentityStore::new(client).await {
                Ok(store) => {
                    info!("Identity store: MongoDB ({})", args.mongodb_db);
                    Arc::new(store)
                }
                Err(e) => {
                    error!("Failed to open identity collection: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                if args.dev_mode {
                    warn!(
                        "MongoDB connection failed (dev mode, using in-memory store): {}",
                        e
                    );
                    Arc::new(MemoryIdentityStore::new())
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    // Create application state (immutable after this point)
    let state = match server::AppState::new(args.clone(), Arc::clone(&store)) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    // Seed a dev identity if requested
    if args.dev_mode {
        if let (Some(username), Some(password)) = (&args.seed_username, &args.seed_password) {
            match seed_identity(&state, username, password).await {
                Ok(()) => info!("Seeded dev identity: {} (roles: user, admin)", username),
                Err(WardenError::Conflict(_)) => {
                    info!("Seed identity already exists: {}", username)
                }
                Err(e) => {
                    error!("Failed to seed identity: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    // Run the server
    if let Err(e) = server::run(Arc::new(state)).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn seed_identity(
    state: &server::AppState,
    username: &str,
    password: &str,
) -> Result<(), WardenError> {
    let password_hash = state.hasher.hash(password)?;
    state
        .store
        .insert(NewIdentity {
            username: username.to_string(),
            password_hash,
            roles: vec![Role::User, Role::Admin],
        })
        .await?;
    Ok(())
}
