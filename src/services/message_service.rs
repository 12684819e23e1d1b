use crate::domain::address::EmailAddress;
use crate::domain::filter::{MessageFilter, TimeWindow};
use crate::domain::message::{Message, now_micros};
use crate::error::{AppError, Result};
use crate::storage::MessageStore;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) sent_total: Counter<u64>,
    pub(crate) marked_total: Counter<u64>,
    pub(crate) deleted_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("messenger-server");
        Self {
            sent_total: meter
                .u64_counter("messenger_messages_sent_total")
                .with_description("Total send attempts, by outcome")
                .build(),
            marked_total: meter
                .u64_counter("messenger_messages_marked_total")
                .with_description("Messages whose read state was changed")
                .build(),
            deleted_total: meter
                .u64_counter("messenger_messages_deleted_total")
                .with_description("Messages removed from the store")
                .build(),
        }
    }
}

/// The inbox operations.
///
/// The service is stateless; everything lives in the injected store. Batch
/// operations are only as atomic as the store makes them.
#[derive(Clone, Debug)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store, metrics: Metrics::new() }
    }

    /// Lists every message sent within `window`, newest first.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if the window is inverted.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list(&self, window: TimeWindow) -> Result<Vec<Message>> {
        self.query(MessageFilter::all().within(window)).await
    }

    /// Fetches a single message.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no message has this id.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Message> {
        self.store.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Lists each recipient that has at least one message, sorted ascending.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the store fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_recipients(&self) -> Result<Vec<String>> {
        self.store.distinct_recipients().await
    }

    /// Lists a recipient's messages, optionally restricted to a time window and to unread ones.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if the window is inverted.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_for_recipient(&self, address: &str, window: TimeWindow, unread_only: bool) -> Result<Vec<Message>> {
        self.query(MessageFilter::for_recipient(address).unread(unread_only).within(window)).await
    }

    /// Stamps `read_timestamp` with the current time on every listed message that exists.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if `ids` is empty.
    /// Returns `AppError::NotFound` if none of the ids exist.
    #[tracing::instrument(err(level = "debug"), skip(self, ids), fields(batch_count = ids.len()))]
    pub async fn mark_read(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        self.set_read_state(ids, Some(now_micros()), "read").await
    }

    /// Clears `read_timestamp` on every listed message that exists.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if `ids` is empty.
    /// Returns `AppError::NotFound` if none of the ids exist.
    #[tracing::instrument(err(level = "debug"), skip(self, ids), fields(batch_count = ids.len()))]
    pub async fn mark_unread(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        self.set_read_state(ids, None, "unread").await
    }

    /// Validates both addresses and stores a new unread message.
    ///
    /// Nothing is written when either address is rejected.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if an address is not a canonical email address.
    #[tracing::instrument(err(level = "warn"), skip(self, content), fields(content_len = content.len()))]
    pub async fn send(&self, content: String, recipient_address: &str, sender_address: &str) -> Result<Message> {
        let recipient = parse_address("recipient", recipient_address)?;
        let sender = parse_address("sender", sender_address)?;

        let message = Message::new(&recipient, &sender, content, now_micros());
        match self.store.create(&message).await {
            Ok(()) => {
                tracing::debug!(message_id = %message.id, "Message stored");
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "success")]);
                Ok(message)
            }
            Err(e) => {
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "failure")]);
                Err(e)
            }
        }
    }

    /// Deletes a single message.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no message has this id.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_many(&[id]).await.map(|_| ())
    }

    /// Deletes every listed message that exists and returns their ids.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if `ids` is empty.
    /// Returns `AppError::NotFound` if none of the ids exist.
    #[tracing::instrument(err(level = "debug"), skip(self, ids), fields(batch_count = ids.len()))]
    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        require_ids(ids)?;

        let deleted = self.store.delete(ids).await?;
        if deleted.is_empty() {
            return Err(AppError::NotFound);
        }

        self.metrics.deleted_total.add(deleted.len() as u64, &[]);
        tracing::debug!(deleted = deleted.len(), "Messages deleted");
        Ok(deleted)
    }

    async fn query(&self, filter: MessageFilter) -> Result<Vec<Message>> {
        if filter.window.is_inverted() {
            return Err(AppError::BadRequest("start must not be after end".into()));
        }
        self.store.scan(&filter).await
    }

    async fn set_read_state(&self, ids: &[Uuid], read_at: Option<OffsetDateTime>, state: &'static str) -> Result<Vec<Uuid>> {
        require_ids(ids)?;

        let updated = self.store.set_read_timestamp(ids, read_at).await?;
        if updated.is_empty() {
            return Err(AppError::NotFound);
        }

        self.metrics.marked_total.add(updated.len() as u64, &[KeyValue::new("state", state)]);
        tracing::debug!(updated = updated.len(), state, "Read state changed");
        Ok(updated)
    }
}

fn require_ids(ids: &[Uuid]) -> Result<()> {
    if ids.is_empty() {
        return Err(AppError::BadRequest("At least one message id is required".into()));
    }
    Ok(())
}

fn parse_address(role: &str, input: &str) -> Result<EmailAddress> {
    input.parse().map_err(|e| AppError::BadRequest(format!("Invalid {role} address '{input}': {e}")))
}
