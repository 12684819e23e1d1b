use crate::domain::filter::MessageFilter;
use crate::domain::message::Message;
use crate::error::Result;
use crate::storage::records::MessageRecord;
use crate::storage::{DbPool, MessageStore};
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "id, recipient_address, sender_address, content, sent_timestamp, read_timestamp";

/// Postgres-backed store.
///
/// Batch updates and deletes run as one statement inside a transaction, so a
/// batch never observes a half-applied concurrent batch.
#[derive(Clone, Debug)]
pub struct PostgresMessageStore {
    pool: DbPool,
}

impl PostgresMessageStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Appends one `AND`-joined clause per present filter parameter.
    fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a MessageFilter) {
        let mut clauses = builder.separated(" AND ");
        clauses.push(" WHERE TRUE");

        if let Some(recipient) = &filter.recipient {
            clauses.push("recipient_address = ").push_bind_unseparated(recipient);
        }
        if filter.unread_only {
            clauses.push("read_timestamp IS NULL");
        }
        if let Some(start) = filter.window.start {
            clauses.push("sent_timestamp >= ").push_bind_unseparated(start);
        }
        if let Some(end) = filter.window.end {
            clauses.push("sent_timestamp <= ").push_bind_unseparated(end);
        }
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    #[tracing::instrument(level = "debug", skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO messages (id, recipient_address, sender_address, content, sent_timestamp, read_timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(message.id)
        .bind(&message.recipient_address)
        .bind(&message.sender_address)
        .bind(&message.content)
        .bind(message.sent_timestamp)
        .bind(message.read_timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn scan(&self, filter: &MessageFilter) -> Result<Vec<Message>> {
        let mut builder = QueryBuilder::new(format!("SELECT {MESSAGE_COLUMNS} FROM messages"));
        Self::push_filter(&mut builder, filter);
        builder.push(" ORDER BY sent_timestamp DESC, id DESC");

        let records = builder.build_query_as::<MessageRecord>().fetch_all(&self.pool).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn distinct_recipients(&self) -> Result<Vec<String>> {
        let recipients =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT recipient_address FROM messages ORDER BY recipient_address")
                .fetch_all(&self.pool)
                .await?;
        Ok(recipients)
    }

    #[tracing::instrument(level = "debug", skip(self, ids), fields(batch_count = ids.len()))]
    async fn set_read_timestamp(&self, ids: &[Uuid], read_at: Option<OffsetDateTime>) -> Result<Vec<Uuid>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_scalar::<_, Uuid>("UPDATE messages SET read_timestamp = $1 WHERE id = ANY($2) RETURNING id")
            .bind(read_at)
            .bind(ids)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    #[tracing::instrument(level = "debug", skip(self, ids), fields(batch_count = ids.len()))]
    async fn delete(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query_scalar::<_, Uuid>("DELETE FROM messages WHERE id = ANY($1) RETURNING id")
            .bind(ids)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
