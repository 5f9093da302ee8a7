//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation,
//! the composer input, the typing indicator and the toast, and drives the
//! send lifecycle against a [`Transport`].

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Error;
use crate::chat::store::ConversationStore;
use crate::client::Transport;
use crate::error::Result;
use crate::observability::{
    SESSION_COPIES, SESSION_FEEDBACK, SESSION_REFUSED_SUBMISSIONS, SESSION_SUBMISSIONS,
};
use crate::types::{
    AssistantReply, ConnectionStatus, Message, MessageId, Role, Toast, ToastKind, ToastSlot,
};

/// Canned prompts offered beneath the conversation.
pub const QUICK_REPLIES: [&str; 4] = [
    "Explain Python decorators",
    "Help with calculus problem",
    "What's machine learning?",
    "Show me a code example",
];

/// Text of the toast confirming a copied message.
pub const COPIED_TOAST: &str = "Message copied to clipboard!";

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Where the session is in the send lifecycle.
///
/// `Resolved` and `Failed` are passed through while a reply is recorded; a
/// session at rest is always `Idle`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SendState {
    /// No outstanding request; input is accepted.
    Idle,
    /// A request is in flight; further submissions are refused.
    Submitting,
    /// The reply arrived and is being recorded.
    Resolved,
    /// The request failed and the failure is being recorded.
    Failed,
}

/// Why a submission did not start.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The input was empty or whitespace.
    EmptyInput,
    /// Another send is still in flight.
    Busy,
    /// The pending send was not issued by this session, or has already been
    /// completed.
    ForeignSend,
}

/// Proof that a send is in flight.
///
/// Handed out by [`ChatSession::begin_submit`] and consumed by
/// [`ChatSession::complete`]; while one exists the session refuses new
/// submissions.  A token is only accepted by the session that issued it.
#[derive(Debug)]
#[must_use = "a pending send must be completed or the session stays busy"]
pub struct PendingSend {
    session: u64,
    text: String,
    user_message: MessageId,
}

impl PendingSend {
    /// The text to hand to the transport.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The id of the user message recorded for this send.
    pub fn user_message(&self) -> MessageId {
        self.user_message
    }
}

/// How a submission ended.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Nothing was sent.
    Refused(Refusal),
    /// The reply was recorded under `reply`.
    Resolved {
        /// Id of the assistant message holding the reply.
        reply: MessageId,
        /// Whether the placeholder text stood in for a missing reply.
        placeholder: bool,
    },
    /// The failure was recorded under `reply`.
    Failed {
        /// Id of the error-flagged assistant message.
        reply: MessageId,
        /// The transport failure.
        error: Error,
    },
}

impl SubmitOutcome {
    /// The assistant message recorded for this submission, if one was.
    pub fn reply(&self) -> Option<MessageId> {
        match self {
            SubmitOutcome::Refused(_) => None,
            SubmitOutcome::Resolved { reply, .. } | SubmitOutcome::Failed { reply, .. } => {
                Some(*reply)
            }
        }
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Messages written by the user.
    pub user_messages: usize,
    /// Messages written by (or on behalf of) the tutor.
    pub assistant_messages: usize,
    /// Assistant messages that report a failure.
    pub error_messages: usize,
    /// Assistant messages marked helpful.
    pub liked: usize,
    /// Assistant messages marked unhelpful.
    pub disliked: usize,
    /// Total number of chat requests made.
    pub total_requests: u64,
    /// Status recorded by the most recent probe or send.
    pub connection_status: ConnectionStatus,
}

/// A chat session that manages conversation state and tutor interactions.
pub struct ChatSession<T: Transport> {
    id: u64,
    transport: T,
    store: ConversationStore,
    input: String,
    state: SendState,
    in_flight: Option<MessageId>,
    typing: bool,
    toast: ToastSlot,
    request_count: u64,
}

impl<T: Transport> ChatSession<T> {
    /// Creates a new session whose conversation opens with the greeting.
    pub fn new(transport: T) -> Self {
        Self::with_store(transport, ConversationStore::new())
    }

    /// Creates a new session around an existing conversation.
    pub fn with_store(transport: T, store: ConversationStore) -> Self {
        Self {
            id: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            transport,
            store,
            input: String::new(),
            state: SendState::Idle,
            in_flight: None,
            typing: false,
            toast: ToastSlot::new(),
            request_count: 0,
        }
    }

    /// The transport used for requests.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The conversation record.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// The conversation in display order.
    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// Replaces the composer input.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The composer input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether a submission would currently be accepted.
    pub fn input_enabled(&self) -> bool {
        self.state == SendState::Idle
    }

    /// Fills the composer with the quick reply at `index` and returns it.
    pub fn apply_quick_reply(&mut self, index: usize) -> Option<&'static str> {
        let reply = QUICK_REPLIES.get(index).copied()?;
        self.set_input(reply);
        Some(reply)
    }

    /// Where the session is in the send lifecycle.
    pub fn state(&self) -> SendState {
        self.state
    }

    /// Whether the typing indicator should be shown.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Status recorded by the most recent probe or send.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.transport.connection_status()
    }

    /// Probes the tutor service and returns the resulting status.
    pub async fn check_health(&self) -> ConnectionStatus {
        let status = self.transport.check_health().await;
        tracing::info!(%status, "health probe complete");
        status
    }

    /// Starts a send from the composer input.
    ///
    /// On success the user message is recorded, the input cleared, the typing
    /// indicator raised, and the returned token must be passed to
    /// [`ChatSession::complete`] with the transport's result.
    pub fn begin_submit(&mut self) -> std::result::Result<PendingSend, Refusal> {
        if self.state != SendState::Idle {
            SESSION_REFUSED_SUBMISSIONS.click();
            tracing::debug!(state = ?self.state, "submission refused while a send is in flight");
            return Err(Refusal::Busy);
        }
        if self.input.trim().is_empty() {
            return Err(Refusal::EmptyInput);
        }

        let text = std::mem::take(&mut self.input);
        let user_message = self.store.append(Message::user(text.clone()));
        self.state = SendState::Submitting;
        self.in_flight = Some(user_message);
        self.typing = true;
        self.request_count = self.request_count.saturating_add(1);
        SESSION_SUBMISSIONS.click();
        tracing::info!(%user_message, "submitting");

        Ok(PendingSend {
            session: self.id,
            text,
            user_message,
        })
    }

    /// Records the outcome of a send started with [`ChatSession::begin_submit`].
    ///
    /// A token issued by another session is refused with
    /// [`Refusal::ForeignSend`] and leaves this session untouched.
    pub fn complete(
        &mut self,
        pending: PendingSend,
        result: Result<AssistantReply>,
    ) -> SubmitOutcome {
        if pending.session != self.id || self.in_flight != Some(pending.user_message) {
            tracing::warn!(
                user_message = %pending.user_message,
                "refusing to complete a send this session did not start"
            );
            return SubmitOutcome::Refused(Refusal::ForeignSend);
        }
        let outcome = match result {
            Ok(reply) => {
                self.state = SendState::Resolved;
                let placeholder = reply.placeholder;
                let reply = self.store.append(Message::assistant(reply.content));
                tracing::info!(
                    user_message = %pending.user_message,
                    %reply,
                    placeholder,
                    "send resolved"
                );
                SubmitOutcome::Resolved { reply, placeholder }
            }
            Err(error) => {
                self.state = SendState::Failed;
                let reply = self
                    .store
                    .append(Message::assistant_error(error.user_message()));
                self.toast.show(error.toast_text(), ToastKind::Error);
                tracing::warn!(
                    user_message = %pending.user_message,
                    %reply,
                    error = %error,
                    "send failed"
                );
                SubmitOutcome::Failed { reply, error }
            }
        };
        self.in_flight = None;
        self.typing = false;
        self.state = SendState::Idle;
        outcome
    }

    /// Submits the composer input and waits for the outcome.
    pub async fn submit_input(&mut self) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(refusal) => return SubmitOutcome::Refused(refusal),
        };
        let result = self.transport.send_message(pending.text()).await;
        self.complete(pending, result)
    }

    /// Places `text` in the composer and submits it.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        if !self.input_enabled() {
            SESSION_REFUSED_SUBMISSIONS.click();
            return SubmitOutcome::Refused(Refusal::Busy);
        }
        self.set_input(text);
        self.submit_input().await
    }

    /// Records feedback on an assistant message.
    ///
    /// Returns false when the id is unknown or names a user message.
    pub fn set_liked(&mut self, id: MessageId, value: bool) -> bool {
        if !self.store.set_liked(id, value) {
            return false;
        }
        SESSION_FEEDBACK.click();
        true
    }

    /// Returns the text of message `id` for the clipboard and confirms the
    /// copy with an info toast.
    pub fn copy_message(&mut self, id: MessageId) -> Option<&str> {
        self.store.get(id)?;
        SESSION_COPIES.click();
        self.toast.show(COPIED_TOAST, ToastKind::Info);
        self.store.get(id).map(|message| message.content.as_str())
    }

    /// The toast currently on screen, if any.
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.visible()
    }

    /// Removes and returns the toast currently on screen, if any.
    pub fn take_toast(&mut self) -> Option<Toast> {
        self.toast.take()
    }

    /// Dismisses the toast once its display time has elapsed.
    pub fn dismiss_expired_toast(&mut self) -> bool {
        self.toast.tick()
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let messages = self.store.all();
        let count_role = |role: Role| messages.iter().filter(|m| m.role == role).count();
        let count_liked =
            |value: bool| messages.iter().filter(|m| m.liked == Some(value)).count();
        SessionStats {
            message_count: messages.len(),
            user_messages: count_role(Role::User),
            assistant_messages: count_role(Role::Assistant),
            error_messages: self.store.error_count(),
            liked: count_liked(true),
            disliked: count_liked(false),
            total_requests: self.request_count,
            connection_status: self.connection_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::types::ConnectionMonitor;

    /// Transport that replays scripted results.
    #[derive(Default)]
    struct ScriptedTransport {
        results: Mutex<VecDeque<Result<AssistantReply>>>,
        sent: Mutex<Vec<String>>,
        calls: AtomicUsize,
        monitor: ConnectionMonitor,
    }

    impl ScriptedTransport {
        fn with(results: Vec<Result<AssistantReply>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        async fn check_health(&self) -> ConnectionStatus {
            self.monitor.set(ConnectionStatus::Online);
            ConnectionStatus::Online
        }

        async fn send_message(&self, text: &str) -> Result<AssistantReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(text.to_string());
            let result = self
                .results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::unknown("script exhausted")));
            let status = match &result {
                Ok(_) => ConnectionStatus::Online,
                Err(err) => err.connection_status(),
            };
            self.monitor.set(status);
            result
        }

        fn connection_status(&self) -> ConnectionStatus {
            self.monitor.get()
        }
    }

    #[tokio::test]
    async fn successful_send_appends_two_messages() {
        let transport = ScriptedTransport::with(vec![Ok(AssistantReply::new("4"))]);
        let mut session = ChatSession::new(transport);

        let outcome = session.submit("2+2").await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Resolved {
                placeholder: false,
                ..
            }
        ));

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "2+2");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "4");
        assert!(!messages[2].is_error);
        assert_eq!(Some(messages[2].id), outcome.reply());
        assert_eq!(session.connection_status(), ConnectionStatus::Online);
        assert_eq!(session.transport().calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_typing());
        assert_eq!(session.state(), SendState::Idle);
        assert!(session.toast().is_none());
    }

    #[tokio::test]
    async fn server_failure_records_error_and_toast() {
        let transport = ScriptedTransport::with(vec![Err(Error::request_failed(500, ""))]);
        let mut session = ChatSession::new(transport);

        let outcome = session.submit("hi").await;
        assert!(matches!(&outcome, SubmitOutcome::Failed { error, .. } if error.is_server_error()));

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "hi");
        assert!(messages[2].is_error);
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(messages[2].content.contains("HTTP 500"));
        assert_eq!(session.connection_status(), ConnectionStatus::Error);

        let toast = session.toast().expect("failure should raise a toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(session.stats().error_messages, 1);
    }

    #[tokio::test]
    async fn connectivity_failure_goes_offline() {
        let transport = ScriptedTransport::with(vec![Err(Error::unreachable(
            "TypeError: Failed to fetch",
            None,
        ))]);
        let mut session = ChatSession::new(transport);

        session.submit("hi").await;
        let last = session.messages().last().unwrap();
        assert!(last.is_error);
        assert!(last.content.contains("internet connection"));
        assert_eq!(session.connection_status(), ConnectionStatus::Offline);
    }

    #[tokio::test]
    async fn unknown_failure_shows_raw_message() {
        let transport =
            ScriptedTransport::with(vec![Err(Error::unknown("unexpected end of stream"))]);
        let mut session = ChatSession::new(transport);

        session.submit("hi").await;
        assert_eq!(
            session.messages().last().unwrap().content,
            "unexpected end of stream"
        );
        assert_eq!(session.connection_status(), ConnectionStatus::Error);
    }

    #[test]
    fn whitespace_input_is_ignored() {
        let transport = ScriptedTransport::default();
        let mut session = ChatSession::new(transport);

        for input in ["", "   ", "\n\t "] {
            let outcome = tokio_test::block_on(session.submit(input));
            assert!(matches!(outcome, SubmitOutcome::Refused(Refusal::EmptyInput)));
        }
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.transport().calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), SendState::Idle);
    }

    #[test]
    fn second_submission_refused_while_in_flight() {
        let transport = ScriptedTransport::default();
        let mut session = ChatSession::new(transport);

        session.set_input("first");
        let pending = session.begin_submit().unwrap();
        assert_eq!(pending.text(), "first");
        assert_eq!(session.input(), "");
        assert!(session.is_typing());
        assert!(!session.input_enabled());
        assert_eq!(session.state(), SendState::Submitting);

        session.set_input("second");
        assert_eq!(session.begin_submit().unwrap_err(), Refusal::Busy);
        let outcome = tokio_test::block_on(session.submit("third"));
        assert!(matches!(outcome, SubmitOutcome::Refused(Refusal::Busy)));
        assert_eq!(session.message_count(), 2);

        session.complete(pending, Ok(AssistantReply::new("done")));
        assert!(session.input_enabled());
        assert_eq!(session.message_count(), 3);
        assert_eq!(session.transport().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn each_submission_sends_once() {
        let transport = ScriptedTransport::with(vec![
            Ok(AssistantReply::new("a")),
            Err(Error::unreachable("connection refused", None)),
            Ok(AssistantReply::empty()),
        ]);
        let mut session = ChatSession::new(transport);

        for (n, text) in ["one", "two", "three"].into_iter().enumerate() {
            let before = session.message_count();
            tokio_test::block_on(session.submit(text));
            assert_eq!(session.message_count(), before + 2);
            assert_eq!(session.transport().calls.load(Ordering::SeqCst), n + 1);
        }
        assert_eq!(
            *session.transport().sent.lock().unwrap(),
            vec!["one", "two", "three"]
        );
        assert_eq!(session.stats().total_requests, 3);
    }

    #[test]
    fn submitted_text_is_kept_as_typed() {
        let transport = ScriptedTransport::with(vec![Ok(AssistantReply::new("ok"))]);
        let mut session = ChatSession::new(transport);

        tokio_test::block_on(session.submit("  padded  "));
        assert_eq!(session.messages()[1].content, "  padded  ");
        assert_eq!(*session.transport().sent.lock().unwrap(), vec!["  padded  "]);
    }

    #[test]
    fn quick_reply_fills_input() {
        let mut session = ChatSession::new(ScriptedTransport::default());
        assert_eq!(session.apply_quick_reply(2), Some("What's machine learning?"));
        assert_eq!(session.input(), "What's machine learning?");
        assert_eq!(session.apply_quick_reply(4), None);
        assert_eq!(session.input(), "What's machine learning?");
    }

    #[tokio::test]
    async fn feedback_is_counted() {
        let transport = ScriptedTransport::with(vec![Ok(AssistantReply::new("4"))]);
        let mut session = ChatSession::new(transport);
        let reply = session.submit("2+2").await.reply().unwrap();

        assert!(session.set_liked(reply, true));
        let user = session.messages()[1].id;
        assert!(!session.set_liked(user, true));

        let greeting = session.messages()[0].id;
        assert!(session.set_liked(greeting, false));
        let stats = session.stats();
        assert_eq!(stats.liked, 1);
        assert_eq!(stats.disliked, 1);
        assert!(session.toast().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn copy_returns_text_and_toasts() {
        let transport = ScriptedTransport::with(vec![Ok(AssistantReply::new("4"))]);
        let mut session = ChatSession::new(transport);
        let reply = session.submit("2+2").await.reply().unwrap();
        let user = session.messages()[1].id;

        assert_eq!(session.copy_message(reply), Some("4"));
        let toast = session.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Info);
        assert_eq!(toast.text, COPIED_TOAST);

        assert_eq!(session.copy_message(user), Some("2+2"));
        assert!(session.messages().iter().all(|m| m.liked.is_none()));

        tokio::time::advance(crate::types::TOAST_DURATION).await;
        assert!(session.dismiss_expired_toast());
        assert!(session.toast().is_none());
    }

    #[test]
    fn copy_unknown_message_is_noop() {
        let mut session = ChatSession::new(ScriptedTransport::default());
        assert_eq!(session.copy_message(MessageId::UNASSIGNED), None);
        assert!(session.toast().is_none());
    }

    #[test]
    fn complete_refuses_tokens_from_other_sessions() {
        let mut first = ChatSession::new(ScriptedTransport::default());
        let mut second = ChatSession::new(ScriptedTransport::default());

        first.set_input("for the first session");
        let theirs = first.begin_submit().unwrap();
        second.set_input("for the second session");
        let ours = second.begin_submit().unwrap();

        let outcome = second.complete(theirs, Ok(AssistantReply::new("misrouted")));
        assert!(matches!(outcome, SubmitOutcome::Refused(Refusal::ForeignSend)));
        assert_eq!(second.message_count(), 2);
        assert_eq!(second.state(), SendState::Submitting);
        assert!(second.is_typing());

        let outcome = second.complete(ours, Ok(AssistantReply::new("right place")));
        assert!(matches!(outcome, SubmitOutcome::Resolved { .. }));
        assert_eq!(second.messages()[2].content, "right place");
        assert!(second.input_enabled());

        assert_eq!(first.message_count(), 2);
        assert!(!first.input_enabled());
    }

    #[tokio::test]
    async fn health_check_updates_status() {
        let session = ChatSession::new(ScriptedTransport::default());
        assert_eq!(session.connection_status(), ConnectionStatus::Offline);
        assert_eq!(session.check_health().await, ConnectionStatus::Online);
        assert_eq!(session.connection_status(), ConnectionStatus::Online);
    }
}
