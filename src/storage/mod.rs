use crate::config::DatabaseConfig;
use crate::domain::filter::MessageFilter;
use crate::domain::message::Message;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod memory;
pub mod message_repo;
pub mod records;
pub mod seed;

pub use memory::InMemoryMessageStore;
pub use message_repo::PostgresMessageStore;

pub type DbPool = Pool<Postgres>;

/// Persistence boundary for messages.
///
/// Batch operations return the ids they actually touched so callers can
/// tell an empty match from a partial one. Whether a batch is isolated from
/// concurrent writers is up to the implementation.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    async fn create(&self, message: &Message) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>>;

    /// Returns every message matching `filter`, newest first.
    async fn scan(&self, filter: &MessageFilter) -> Result<Vec<Message>>;

    /// Returns each recipient address once, sorted ascending.
    async fn distinct_recipients(&self) -> Result<Vec<String>>;

    /// Overwrites `read_timestamp` on every listed message that exists.
    async fn set_read_timestamp(&self, ids: &[Uuid], read_at: Option<OffsetDateTime>) -> Result<Vec<Uuid>>;

    /// Removes every listed message that exists.
    async fn delete(&self, ids: &[Uuid]) -> Result<Vec<Uuid>>;

    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> Result<()>;
}

/// Initializes the database connection pool.
///
/// # Errors
/// Returns `sqlx::Error` if the connection fails.
pub async fn init_pool(url: &str, config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await
}

/// Applies pending schema migrations.
///
/// # Errors
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
