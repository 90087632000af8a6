//! Store selection and the serve loop.

use crate::{AppState, PageLimits, ServerSettings, StoreKind, router};
use scp_database::{MemoryStore, PostgresStore, establish_pool, run_migrations};
use scp_error::{ConfigError, ScpArchiveResult, ServerError, ServerErrorKind};
use scp_integrity::ReferenceManager;
use scp_interface::DocumentStore;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

/// Open the configured store and serve the API until Ctrl-C.
#[instrument(skip(settings), fields(store = %settings.store(), bind = %settings.bind_address()))]
pub async fn run(settings: &ServerSettings) -> ScpArchiveResult<()> {
    match settings.store() {
        StoreKind::Memory => serve(MemoryStore::new(), settings).await,
        StoreKind::Postgres => {
            let url = settings
                .database_url()
                .as_deref()
                .ok_or_else(|| ConfigError::for_setting("database_url", "is not set"))?;
            let pool = establish_pool(url, *settings.pool_size())?;
            if *settings.run_migrations() {
                run_migrations(&pool)?;
            }
            serve(PostgresStore::new(pool), settings).await
        }
    }
}

/// Serve the API over `store`.
pub async fn serve<S>(store: S, settings: &ServerSettings) -> ScpArchiveResult<()>
where
    S: DocumentStore + 'static,
    S::TaleId: FromStr + Serialize,
{
    let manager =
        ReferenceManager::new(Arc::new(store)).with_delete_policy(*settings.scp_delete_policy());
    let limits = PageLimits::new(*settings.default_page_size(), *settings.max_page_size());
    let app = router(AppState::new(manager, limits));

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Bind(address.clone(), e.to_string())))?;
    info!(address = %address, policy = %settings.scp_delete_policy(), "SCP archive listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;

    info!("SCP archive stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
