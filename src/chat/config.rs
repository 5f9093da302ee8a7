//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_ORIGIN;

/// Label sent as `user_id` when none is configured.
pub const DEFAULT_USER_ID: &str = "intellitutor-cli";

/// Command-line arguments for the intellitutor-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Origin of the tutor service.
    #[arrrg(optional, "Tutor service origin (default: https://tutor-app-adk.onrender.com)", "URL")]
    pub origin: Option<String>,

    /// Label identifying this client to the service.
    #[arrrg(optional, "User label sent with each message (default: intellitutor-cli)", "ID")]
    pub user_id: Option<String>,

    /// Per-request timeout.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Skip the health probe at startup.
    #[arrrg(flag, "Do not probe /health at startup")]
    pub skip_health_check: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Origin of the tutor service.
    pub origin: String,

    /// Label sent as `user_id`; `None` omits the field.
    pub user_id: Option<String>,

    /// Per-request timeout; `None` leaves the transport's defaults alone.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to probe the health endpoint at startup.
    pub health_check: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Origin: the hosted tutor service
    /// - User id: intellitutor-cli
    /// - Timeout: none
    /// - Color: enabled
    /// - Health check: enabled
    pub fn new() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            user_id: Some(DEFAULT_USER_ID.to_string()),
            timeout: None,
            use_color: true,
            health_check: true,
        }
    }

    /// Sets the service origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Sets or clears the user label.
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Sets or clears the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets whether to probe the service at startup.
    pub fn with_health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            origin: args.origin.unwrap_or(defaults.origin),
            user_id: args.user_id.or(defaults.user_id),
            timeout: args.timeout_secs.map(Duration::from_secs),
            use_color: !args.no_color,
            health_check: !args.skip_health_check,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.user_id.as_deref(), Some(DEFAULT_USER_ID));
        assert!(config.timeout.is_none());
        assert!(config.use_color);
        assert!(config.health_check);
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            origin: Some("http://localhost:8000".to_string()),
            user_id: Some("student-7".to_string()),
            timeout_secs: Some(45),
            no_color: true,
            skip_health_check: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.origin, "http://localhost:8000");
        assert_eq!(config.user_id.as_deref(), Some("student-7"));
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));
        assert!(!config.use_color);
        assert!(!config.health_check);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_origin("http://127.0.0.1:9000/tutor")
            .with_user_id(None)
            .with_timeout(Some(Duration::from_secs(10)))
            .without_color()
            .with_health_check(false);

        assert_eq!(config.origin, "http://127.0.0.1:9000/tutor");
        assert!(config.user_id.is_none());
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert!(!config.use_color);
        assert!(!config.health_check);
    }
}
