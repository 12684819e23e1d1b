use crate::domain::filter::TimeWindow;
use crate::domain::message::Message;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    pub recipient_address: String,
    pub sender_address: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_timestamp: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_timestamp: Option<OffsetDateTime>,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            recipient_address: m.recipient_address,
            sender_address: m.sender_address,
            content: m.content,
            sent_timestamp: m.sent_timestamp,
            read_timestamp: m.read_timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
    pub recipient_address: String,
    pub sender_address: String,
}

/// Optional `?start=&end=` bounds, RFC 3339 encoded.
#[derive(Debug, Default, Deserialize)]
pub struct TimeWindowQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

impl From<TimeWindowQuery> for TimeWindow {
    fn from(query: TimeWindowQuery) -> Self {
        Self::new(query.start, query.end)
    }
}
