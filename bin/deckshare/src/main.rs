//! # deckshare
//!
//! The entry point that assembles the application from the plugins enabled
//! at compile time.

mod config;
mod sweeper;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deck_api::{build_router, AppState, RouterConfig};
use deck_core::{
    AccessController, AccountService, ClientDirectory, ClientRepo, CredentialHasher,
    IdentityProvider, ImageStore, MutationService, PresentationRepo, ShareIdGenerator, UserRepo,
};

use crate::config::Settings;

#[cfg(not(all(feature = "db-sqlite", feature = "storage-local", feature = "auth-simple")))]
compile_error!("deckshare needs the db-sqlite, storage-local and auth-simple features");

// Feature-gated imports
#[cfg(feature = "db-sqlite")]
use deck_db_sqlite::{SqliteClientRepo, SqlitePresentationRepo, SqliteUserRepo};

#[cfg(feature = "storage-local")]
use deck_storage_local::LocalImageStore;

#[cfg(feature = "auth-simple")]
use deck_auth_simple::{Argon2Hasher, JwtIdentityProvider, RandomShareIdGenerator};

const DEFAULT_LOG_FILTER: &str =
    "deckshare=info,deck_api=info,deck_core=info,deck_db_sqlite=info,deck_storage_local=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(settings.log_json);
    info!(host = %settings.host, port = settings.port, "configuration loaded");

    // 1. Persistence
    #[cfg(feature = "db-sqlite")]
    let (presentation_repo, user_repo, client_repo) = {
        let pool = deck_db_sqlite::connect(&settings.database_url)
            .await
            .context("failed to open database")?;
        (
            Arc::new(SqlitePresentationRepo::new(pool.clone())) as Arc<dyn PresentationRepo>,
            Arc::new(SqliteUserRepo::new(pool.clone())) as Arc<dyn UserRepo>,
            Arc::new(SqliteClientRepo::new(pool)) as Arc<dyn ClientRepo>,
        )
    };

    // 2. Image storage
    #[cfg(feature = "storage-local")]
    let images: Arc<dyn ImageStore> = {
        tokio::fs::create_dir_all(&settings.upload_dir)
            .await
            .with_context(|| format!("failed to create {}", settings.upload_dir.display()))?;
        Arc::new(LocalImageStore::new(
            settings.upload_dir.clone(),
            settings.upload_url_prefix(),
        ))
    };

    // 3. Credentials and identity
    #[cfg(feature = "auth-simple")]
    let (hasher, share_ids, identity) = (
        Arc::new(Argon2Hasher::new()) as Arc<dyn CredentialHasher>,
        Arc::new(RandomShareIdGenerator::new()) as Arc<dyn ShareIdGenerator>,
        Arc::new(JwtIdentityProvider::new(
            settings.jwt_secret.expose_secret().as_bytes(),
            chrono::Duration::hours(settings.jwt_expiry_hours),
        )) as Arc<dyn IdentityProvider>,
    );

    // 4. Services
    let presentations = Arc::new(MutationService::new(
        presentation_repo.clone(),
        images.clone(),
        hasher.clone(),
        share_ids,
    ));
    let state = AppState {
        access: Arc::new(AccessController::new(presentation_repo, hasher.clone())),
        presentations: presentations.clone(),
        accounts: Arc::new(AccountService::new(user_repo, hasher, identity.clone())),
        clients: Arc::new(ClientDirectory::new(client_repo)),
        images,
        identity,
    };

    let sweeper = if settings.sweep_interval_secs > 0 {
        Some(sweeper::spawn(
            presentations,
            Duration::from_secs(settings.sweep_interval_secs),
        ))
    } else {
        info!("expiry sweeper disabled");
        None
    };

    // 5. HTTP
    let router = build_router(
        state,
        &RouterConfig {
            cors_origin: settings
                .cors_origin
                .parse()
                .context("cors_origin is not a valid header value")?,
            max_body_bytes: settings.max_body_bytes,
            upload_dir: settings.upload_dir.clone(),
        },
    );

    let addr = SocketAddr::new(
        settings.host.parse().context("host is not a valid IP address")?,
        settings.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "deckshare listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
