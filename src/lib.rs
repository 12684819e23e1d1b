#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod storage;
pub mod telemetry;

use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use crate::storage::{InMemoryMessageStore, MessageStore, PostgresMessageStore};
use std::sync::Arc;
use tokio::sync::watch;

/// The wired-up services, sharing one store.
#[derive(Debug)]
pub struct App {
    pub message_service: MessageService,
    pub health_service: HealthService,
}

impl App {
    #[must_use]
    pub fn new(config: &Config, store: Arc<dyn MessageStore>) -> Self {
        Self {
            message_service: MessageService::new(Arc::clone(&store)),
            health_service: HealthService::new(store, config.health.clone()),
        }
    }
}

/// Opens the configured store: Postgres when a database URL is set,
/// otherwise an in-memory store, seeded with demo data if requested.
///
/// # Errors
/// Returns an error if the database is unreachable, a migration fails, or seeding fails.
pub async fn init_store(config: &Config) -> anyhow::Result<Arc<dyn MessageStore>> {
    if let Some(url) = &config.database_url {
        let pool = storage::init_pool(url, &config.database).await?;
        storage::run_migrations(&pool).await?;
        if config.seed {
            tracing::warn!("Demo seeding is only applied to the in-memory store; ignoring");
        }
        tracing::info!("Using Postgres message store");
        return Ok(Arc::new(PostgresMessageStore::new(pool)));
    }

    let store = InMemoryMessageStore::new();
    if config.seed {
        storage::seed::seed_demo_messages(&store).await?;
    }
    tracing::info!("Using in-memory message store");
    Ok(Arc::new(store))
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach structured logs.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        tracing::error!(panic = %info, %location, "Panic occurred");
    }));
}
