// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{DEFAULT_ORIGIN, Transport, TransportClient};
pub use client_logger::TransportLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use types::*;
