use crate::domain::filter::MessageFilter;
use crate::domain::message::{Message, sort_newest_first};
use crate::error::{AppError, Result};
use crate::storage::MessageStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{BTreeSet, HashSet};
use time::OffsetDateTime;
use uuid::Uuid;

/// Process-local store backed by a concurrent map.
///
/// Each record is read and written atomically, but batch operations walk the
/// id list one entry at a time: a concurrent delete can remove a message
/// between two steps of a batch, in which case it is simply not reported.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: DashMap<Uuid, Message>,
}

impl InMemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: &Message) -> Result<()> {
        if self.messages.contains_key(&message.id) {
            tracing::error!(message_id = %message.id, "Duplicate message id");
            return Err(AppError::Internal);
        }
        self.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        Ok(self.messages.get(&id).map(|entry| entry.value().clone()))
    }

    async fn scan(&self, filter: &MessageFilter) -> Result<Vec<Message>> {
        let predicate = filter.compile();
        let mut messages: Vec<Message> =
            self.messages.iter().filter(|entry| predicate(entry.value())).map(|entry| entry.value().clone()).collect();
        sort_newest_first(&mut messages);
        Ok(messages)
    }

    async fn distinct_recipients(&self) -> Result<Vec<String>> {
        let recipients: BTreeSet<String> =
            self.messages.iter().map(|entry| entry.value().recipient_address.clone()).collect();
        Ok(recipients.into_iter().collect())
    }

    async fn set_read_timestamp(&self, ids: &[Uuid], read_at: Option<OffsetDateTime>) -> Result<Vec<Uuid>> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in unique(ids) {
            if let Some(mut entry) = self.messages.get_mut(&id) {
                entry.read_timestamp = read_at;
                updated.push(id);
            }
        }
        Ok(updated)
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        Ok(unique(ids).into_iter().filter(|id| self.messages.remove(id).is_some()).collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Deduplicates ids while keeping first-seen order.
fn unique(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::TimeWindow;
    use time::macros::datetime;

    fn message(recipient: &str, sent: OffsetDateTime) -> Message {
        Message {
            id: Uuid::new_v4(),
            recipient_address: recipient.to_string(),
            sender_address: "sender@test.com".to_string(),
            content: format!("to {recipient}"),
            sent_timestamp: sent,
            read_timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryMessageStore::new();
        let msg = message("a@x.com", datetime!(2025-01-01 0:00 UTC));

        store.create(&msg).await.unwrap();

        assert_eq!(store.find_by_id(msg.id).await.unwrap(), Some(msg));
        assert_eq!(store.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = InMemoryMessageStore::new();
        let msg = message("a@x.com", datetime!(2025-01-01 0:00 UTC));
        store.create(&msg).await.unwrap();

        assert!(matches!(store.create(&msg).await, Err(AppError::Internal)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_filters_and_orders_newest_first() {
        let store = InMemoryMessageStore::new();
        let first = message("a@x.com", datetime!(2025-01-01 0:00 UTC));
        let second = message("a@x.com", datetime!(2025-01-02 0:00 UTC));
        let other = message("b@x.com", datetime!(2025-01-03 0:00 UTC));
        for m in [&first, &second, &other] {
            store.create(m).await.unwrap();
        }

        let all = store.scan(&MessageFilter::all()).await.unwrap();
        assert_eq!(all.iter().map(|m| m.id).collect::<Vec<_>>(), [other.id, second.id, first.id]);

        let windowed = store
            .scan(&MessageFilter::for_recipient("a@x.com").within(TimeWindow::new(
                Some(datetime!(2025-01-02 0:00 UTC)),
                None,
            )))
            .await
            .unwrap();
        assert_eq!(windowed, [second]);
    }

    #[tokio::test]
    async fn test_distinct_recipients_sorted() {
        let store = InMemoryMessageStore::new();
        for recipient in ["b@x.com", "a@x.com", "b@x.com"] {
            store.create(&message(recipient, datetime!(2025-01-01 0:00 UTC))).await.unwrap();
        }

        assert_eq!(store.distinct_recipients().await.unwrap(), ["a@x.com", "b@x.com"]);
    }

    #[tokio::test]
    async fn test_batch_updates_skip_missing_and_duplicate_ids() {
        let store = InMemoryMessageStore::new();
        let msg = message("a@x.com", datetime!(2025-01-01 0:00 UTC));
        store.create(&msg).await.unwrap();
        let read_at = datetime!(2025-01-02 0:00 UTC);

        let updated = store.set_read_timestamp(&[msg.id, Uuid::new_v4(), msg.id], Some(read_at)).await.unwrap();
        assert_eq!(updated, [msg.id]);
        assert_eq!(store.find_by_id(msg.id).await.unwrap().unwrap().read_timestamp, Some(read_at));

        let deleted = store.delete(&[Uuid::new_v4(), msg.id]).await.unwrap();
        assert_eq!(deleted, [msg.id]);
        assert!(store.is_empty());
    }
}
