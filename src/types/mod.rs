// Public modules
pub mod chat_request;
pub mod connection_status;
pub mod message;
pub mod toast;

// Re-exports
pub use chat_request::{AssistantReply, ChatRequest, ChatResponse, EMPTY_REPLY_TEXT};
pub use connection_status::{ConnectionMonitor, ConnectionStatus};
pub use message::{Message, MessageId, Role};
pub use toast::{TOAST_DURATION, Toast, ToastKind, ToastSlot};
