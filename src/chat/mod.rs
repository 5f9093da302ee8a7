//! Chat application module for conversations with the tutor.
//!
//! This module provides the state behind a chat front end and a plain-text
//! REPL built on top of it. It supports:
//!
//! - An append-only conversation with per-message feedback
//! - A send lifecycle with an explicit in-flight guard
//! - Connection status, typing indicator and toast notifications
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`store`]: the conversation record
//! - [`session`]: composer input, send lifecycle and notifications
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing and handling
//! - [`render`]: terminal output

mod commands;
mod config;
mod render;
mod session;
mod store;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_USER_ID};
pub use render::{
    ASSISTANT_LABEL, PlainTextRenderer, Renderer, USER_LABEL, format_message, format_time,
};
pub use session::{
    COPIED_TOAST, ChatSession, PendingSend, QUICK_REPLIES, Refusal, SendState, SessionStats,
    SubmitOutcome,
};
pub use store::{ConversationStore, GREETING};
