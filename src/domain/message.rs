use crate::domain::address::EmailAddress;
use std::cmp::Reverse;
use time::OffsetDateTime;
use uuid::Uuid;

/// A single inbox entry.
///
/// Only `read_timestamp` changes after creation; every other field is fixed
/// when the message is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub recipient_address: String,
    pub sender_address: String,
    pub content: String,
    pub sent_timestamp: OffsetDateTime,
    /// `None` while the message is unread.
    pub read_timestamp: Option<OffsetDateTime>,
}

impl Message {
    /// Builds a freshly sent, unread message with a new random id.
    ///
    /// `sent_at` is truncated to microseconds, the resolution Postgres stores.
    #[must_use]
    pub fn new(recipient: &EmailAddress, sender: &EmailAddress, content: String, sent_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_address: recipient.as_str().to_owned(),
            sender_address: sender.as_str().to_owned(),
            content,
            sent_timestamp: truncate_to_micros(sent_at),
            read_timestamp: None,
        }
    }

    #[must_use]
    pub const fn is_unread(&self) -> bool {
        self.read_timestamp.is_none()
    }
}

/// Drops sub-microsecond precision so a timestamp survives a `TIMESTAMPTZ`
/// round trip unchanged.
#[must_use]
pub fn truncate_to_micros(ts: OffsetDateTime) -> OffsetDateTime {
    ts.replace_microsecond(ts.microsecond()).unwrap_or(ts)
}

/// Current UTC time at microsecond resolution.
#[must_use]
pub fn now_micros() -> OffsetDateTime {
    truncate_to_micros(OffsetDateTime::now_utc())
}

/// Orders messages most-recent-first, breaking timestamp ties by id so the
/// result is stable across stores.
pub fn sort_newest_first(messages: &mut [Message]) {
    messages.sort_by_key(|m| Reverse((m.sent_timestamp, m.id)));
}
