//! In-memory conversation record.
//!
//! The store is append-only.  Apart from feedback on assistant messages,
//! nothing in a message changes once it is stored, and messages are never
//! removed or reordered.

use crate::types::{Message, MessageId, Role};

/// Greeting the tutor opens every session with.
pub const GREETING: &str = "Hello! I'm your AI tutor. How can I assist you today? Whether you \
need help with programming concepts, math problems, or just want to explore a topic, I'm here \
to help!";

/// Ordered list of the messages exchanged in one session.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
    last_id: MessageId,
}

impl ConversationStore {
    /// Creates a store seeded with the tutor's greeting.
    pub fn new() -> Self {
        let mut store = Self::empty();
        store.append(Message::assistant(GREETING));
        store
    }

    /// Creates a store with no messages at all.
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            last_id: MessageId::UNASSIGNED,
        }
    }

    /// Appends a message and returns the identifier assigned to it.
    ///
    /// Whatever id the message carried is replaced; every other field is
    /// stored as given.
    pub fn append(&mut self, mut message: Message) -> MessageId {
        let id = MessageId::next_after(self.last_id, message.created_at);
        message.id = id;
        self.last_id = id;
        self.messages.push(message);
        id
    }

    /// Records feedback on an assistant message.
    ///
    /// Unknown ids and user messages are left alone.  Returns true when the
    /// message was found and accepts feedback.
    pub fn set_liked(&mut self, id: MessageId, value: bool) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) if message.role == Role::Assistant => {
                message.liked = Some(value);
                true
            }
            _ => false,
        }
    }

    /// The full conversation in display order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        // Ids strictly increase with insertion order.
        self.messages
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.messages[idx])
    }

    /// Looks up a message by its 1-based display position.
    pub fn by_position(&self, position: usize) -> Option<&Message> {
        position
            .checked_sub(1)
            .and_then(|idx| self.messages.get(idx))
    }

    /// The most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Number of messages flagged as error reports.
    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_error).count()
    }

    /// Returns the number of messages in the conversation.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the conversation holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
