//! Start-up wiring: loader invocation, store-mode construction, router
//! assembly, and the serve loop.
//!
//! The store wiring for each resource kind is built exactly once, as one of
//! three concrete constructions (mutable, immutable, composite). Services
//! receive the resulting trait object and never learn which wiring is
//! active.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use thunder_oauth::credentials::hash_client_secret;
use thunder_store::app::{ApplicationFileStore, SecretHasher};
use thunder_store::memory::{InMemoryApplicationStore, InMemoryOrganizationUnitStore};
use thunder_store::ou::OrganizationUnitFileStore;
use thunder_store::{
    ApplicationStore, CompositeApplicationStore, CompositeOrganizationUnitStore, ExistenceChecker,
    LoaderError, OrganizationUnitStore, ResourceLoader, ResourceStore, StoreMode,
};

use crate::config::{ConfigError, ServerConfig};
use crate::handlers::{application, health, ou};
use crate::security;
use crate::service::{ApplicationService, OrganizationUnitService};

/// Bound on connection draining after a shutdown signal.
pub const SHUTDOWN_DRAIN: Duration = Duration::from_secs(5);

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Organization-unit operations
    pub organization_units: Arc<OrganizationUnitService>,
    /// Application operations
    pub applications: Arc<ApplicationService>,
}

/// Fatal start-up failures. The process exits non-zero on any of these.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Declared resources failed to load
    #[error("resource loading failed: {0}")]
    Loader(#[from] LoaderError),

    /// The listener could not bind
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TLS termination belongs to the fronting proxy
    #[error("server.http_only=false requires external TLS termination; refusing to start")]
    TlsNotSupported,

    /// The serve loop failed
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load declared resources and wire the per-kind stores.
///
/// # Errors
///
/// [`StartupError::Loader`] when any declared resource is malformed or
/// duplicated.
pub async fn build_state(config: &ServerConfig, home: &Path) -> Result<AppState, StartupError> {
    let resources = Arc::new(ResourceStore::new());
    let ou_mode = config.organization_unit_store_mode();
    let app_mode = config.application_store_mode();
    info!(?ou_mode, ?app_mode, "wiring resource stores");

    let ou_db = Arc::new(InMemoryOrganizationUnitStore::new());
    let app_db = Arc::new(InMemoryApplicationStore::new());

    let loader = ResourceLoader::new(
        home.join("repository").join("resources"),
        Arc::clone(&resources),
    );
    if ou_mode != StoreMode::Mutable {
        // The OU wiring injects no mutable-side existence checker; the
        // database is assumed to have been provisioned consistently.
        loader.load(&thunder_store::ou::resource_config(None)).await?;
    }
    if app_mode != StoreMode::Mutable {
        let hasher: SecretHasher = Arc::new(|secret: &str| hash_client_secret(secret));
        let checker = (app_mode == StoreMode::Composite)
            .then(|| Arc::clone(&app_db) as Arc<dyn ExistenceChecker>);
        loader
            .load(&thunder_store::app::resource_config(hasher, checker))
            .await?;
    }

    let ou_file = Arc::new(OrganizationUnitFileStore::new(Arc::clone(&resources)));
    let app_file = Arc::new(ApplicationFileStore::new(Arc::clone(&resources)));

    let ou_store: Arc<dyn OrganizationUnitStore> = match ou_mode {
        StoreMode::Mutable => ou_db,
        StoreMode::Immutable => ou_file,
        StoreMode::Composite => Arc::new(CompositeOrganizationUnitStore::new(ou_file, ou_db)),
    };
    let app_store: Arc<dyn ApplicationStore> = match app_mode {
        StoreMode::Mutable => app_db,
        StoreMode::Immutable => app_file,
        StoreMode::Composite => Arc::new(CompositeApplicationStore::new(app_file, app_db)),
    };

    Ok(AppState {
        organization_units: Arc::new(OrganizationUnitService::new(ou_store)),
        applications: Arc::new(ApplicationService::new(app_store)),
    })
}

/// Assemble the admin router: health is open, everything else sits behind
/// the security gate.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .merge(ou::routes())
        .merge(application::routes())
        .layer(middleware::from_fn(security::require_authentication));

    Router::new()
        .route("/health", get(health::health))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}

/// Bind, serve, and drain on SIGINT/SIGTERM with a bounded grace period.
///
/// # Errors
///
/// Any [`StartupError`]; the binary maps these to a non-zero exit.
pub async fn run(config: ServerConfig, home: &Path) -> Result<(), StartupError> {
    if !config.server.http_only {
        return Err(StartupError::TlsNotSupported);
    }
    security::warn_if_disabled();

    let state = build_state(&config, home).await?;
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.hostname, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "admin surface listening");

    let shutdown = CancellationToken::new();
    {
        let token = shutdown.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("shutdown signal received; draining");
            token.cancel();
        });
    }

    let server = axum::serve(listener, router).with_graceful_shutdown({
        let token = shutdown.clone();
        async move { token.cancelled().await }
    });

    tokio::select! {
        result = server => result.map_err(StartupError::Serve)?,
        () = async {
            shutdown.cancelled().await;
            tokio::time::sleep(SHUTDOWN_DRAIN).await;
        } => {
            warn!("drain deadline exceeded; exiting with connections open");
        }
    }
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
