//! Logging trait for transport operations.
//!
//! This module provides the [`TransportLogger`] trait that allows callers to
//! capture every chat exchange passing through the [`TransportClient`].
//!
//! [`TransportClient`]: crate::TransportClient

use crate::{AssistantReply, ChatRequest, Error};

/// A trait for logging chat traffic.
///
/// # Example
///
/// ```rust,ignore
/// use intellitutor::{AssistantReply, ChatRequest, Error, TransportLogger};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl TransportLogger for FileLogger {
///     fn log_request(&self, request: &ChatRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "-> {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_reply(&self, reply: &AssistantReply) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "<- {}", reply.content).unwrap();
///     }
///
///     fn log_failure(&self, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "!! {error}").unwrap();
///     }
/// }
/// ```
pub trait TransportLogger: Send + Sync {
    /// Log a chat request just before it is sent.
    fn log_request(&self, request: &ChatRequest);

    /// Log the reply produced for a successful request.
    ///
    /// Placeholder replies substituted for empty or malformed bodies are
    /// logged here too.
    fn log_reply(&self, reply: &AssistantReply);

    /// Log a failed request.
    fn log_failure(&self, error: &Error);
}
