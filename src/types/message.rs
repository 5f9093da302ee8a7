use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The author of a message.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the tutor.
    User,

    /// Produced by the tutor service, or by the client on its behalf when a
    /// request fails.
    Assistant,
}

/// Opaque message identifier, unique within a session.
///
/// Identifiers are derived from the creation time in unix milliseconds and
/// strictly increase in insertion order.
#[derive(
    Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// The identifier carried by a message before a store has accepted it.
    pub const UNASSIGNED: MessageId = MessageId(0);

    /// Derive the identifier that follows `last` for a message created at `at`.
    pub fn next_after(last: MessageId, at: OffsetDateTime) -> MessageId {
        let millis = (at.unix_timestamp_nanos() / 1_000_000).max(0) as u64;
        MessageId(millis.max(last.0.saturating_add(1)))
    }

    /// The raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single entry in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Identifier assigned by the conversation store.
    pub id: MessageId,

    /// Who wrote the message.
    pub role: Role,

    /// The message text.
    pub content: String,

    /// When the message was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,

    /// Feedback left on an assistant message; `None` until the user votes.
    pub liked: Option<bool>,

    /// Whether this assistant message reports a failed request.
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    /// Create a message with the given role and content, timestamped now.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::UNASSIGNED,
            role,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
            liked: None,
            is_error: false,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message flagged as an error report.
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(content)
        }
    }

    /// Override the creation timestamp.
    pub fn with_created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }

    /// Returns true for messages written by the tutor side.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
