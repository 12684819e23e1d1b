use crate::domain::message::Message;
use time::OffsetDateTime;

/// An inclusive `[start, end]` range over `sent_timestamp`; a missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self { start: None, end: None }
    }

    #[must_use]
    pub fn contains(&self, ts: OffsetDateTime) -> bool {
        self.start.is_none_or(|start| ts >= start) && self.end.is_none_or(|end| ts <= end)
    }

    /// True when both bounds are present and `start` lies after `end`.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }
}

pub type Predicate = Box<dyn Fn(&Message) -> bool + Send + Sync>;

/// Conjunctive message filter.
///
/// Each present parameter contributes one predicate; absent parameters
/// contribute nothing and so always match. Stores that can push filtering
/// down (see `PostgresMessageStore`) translate the same fields into clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub recipient: Option<String>,
    pub unread_only: bool,
    pub window: TimeWindow,
}

impl MessageFilter {
    /// Matches every message.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_recipient(address: impl Into<String>) -> Self {
        Self { recipient: Some(address.into()), ..Self::default() }
    }

    #[must_use]
    pub const fn unread(mut self, unread_only: bool) -> Self {
        self.unread_only = unread_only;
        self
    }

    #[must_use]
    pub const fn within(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Collects one predicate per present filter parameter.
    #[must_use]
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates: Vec<Predicate> = Vec::new();

        if let Some(recipient) = self.recipient.clone() {
            predicates.push(Box::new(move |m| m.recipient_address == recipient));
        }
        if self.unread_only {
            predicates.push(Box::new(Message::is_unread));
        }
        if let Some(start) = self.window.start {
            predicates.push(Box::new(move |m| m.sent_timestamp >= start));
        }
        if let Some(end) = self.window.end {
            predicates.push(Box::new(move |m| m.sent_timestamp <= end));
        }

        predicates
    }

    /// Combines [`Self::predicates`] with logical AND into a single matcher.
    #[must_use]
    pub fn compile(&self) -> impl Fn(&Message) -> bool + Send + Sync + use<> {
        let predicates = self.predicates();
        move |m| predicates.iter().all(|p| p(m))
    }

    #[cfg(test)]
    fn matches(&self, message: &Message) -> bool {
        self.compile()(message)
    }
}
