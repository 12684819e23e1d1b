use crate::domain::message::Message;
use crate::error::Result;
use crate::storage::MessageStore;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const DEMO_USER_1: &str = "user1@test.com";
pub const DEMO_USER_2: &str = "user2@test.com";

const DEMO_MESSAGE_COUNT: i64 = 10;
const DEMO_READ_CUTOFF: i64 = 5;
const DEMO_EPOCH: OffsetDateTime = datetime!(2025-01-01 0:00 UTC);

/// Builds the demo inbox: ten messages alternating between the two demo
/// users, sent one day apart from 2025-01-01. Messages 0..=5 were read the
/// day after they were sent; the rest are unread.
#[must_use]
pub fn demo_messages() -> Vec<Message> {
    (0..DEMO_MESSAGE_COUNT)
        .map(|i| {
            let (recipient, sender) = if i % 2 == 0 { (DEMO_USER_1, DEMO_USER_2) } else { (DEMO_USER_2, DEMO_USER_1) };
            let sent = DEMO_EPOCH + Duration::days(i);
            Message {
                id: Uuid::new_v4(),
                recipient_address: recipient.to_string(),
                sender_address: sender.to_string(),
                content: format!(
                    "This is a test message that pre-populates the in-memory database at runtime. It is test message number {i}."
                ),
                sent_timestamp: sent,
                read_timestamp: (i <= DEMO_READ_CUTOFF).then(|| sent + Duration::days(1)),
            }
        })
        .collect()
}

/// Inserts the demo inbox into `store`.
///
/// # Errors
/// Returns the first store error encountered.
#[tracing::instrument(skip(store))]
pub async fn seed_demo_messages(store: &dyn MessageStore) -> Result<usize> {
    let messages = demo_messages();
    for message in &messages {
        store.create(message).await?;
    }
    tracing::info!(count = messages.len(), "Seeded demo messages");
    Ok(messages.len())
}
