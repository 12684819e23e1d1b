use crate::domain::message::Message;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRecord {
    pub(crate) id: Uuid,
    pub(crate) recipient_address: String,
    pub(crate) sender_address: String,
    pub(crate) content: String,
    pub(crate) sent_timestamp: OffsetDateTime,
    pub(crate) read_timestamp: Option<OffsetDateTime>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            recipient_address: record.recipient_address,
            sender_address: record.sender_address,
            content: record.content,
            sent_timestamp: record.sent_timestamp,
            read_timestamp: record.read_timestamp,
        }
    }
}
