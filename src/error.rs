//! Error types for the IntelliTutor chat core.
//!
//! Every failure the transport can observe is folded into one of a small
//! number of kinds.  Each kind knows which [`ConnectionStatus`] it implies and
//! how to describe itself to the person at the keyboard.

use std::error;
use std::fmt;
use std::sync::Arc;

use crate::types::ConnectionStatus;

/// The main error type for the IntelliTutor chat core.
#[derive(Clone, Debug)]
pub enum Error {
    /// There is no network path to the tutor service.
    Unreachable {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The tutor service answered with a non-2xx status.
    RequestFailed {
        /// HTTP status code.
        status_code: u16,
        /// Body or reason text returned alongside the status.
        message: String,
    },

    /// The tutor service answered 2xx with a body of an unexpected shape.
    MalformedResponse {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Uncategorized failure.
    Unknown {
        /// Human-readable error message.
        message: String,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new unreachable error.
    pub fn unreachable(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Unreachable {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new request-failed error.
    pub fn request_failed(status_code: u16, message: impl Into<String>) -> Self {
        Error::RequestFailed {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new malformed-response error.
    pub fn malformed_response(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::MalformedResponse {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Error::Unknown {
            message: message.into(),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if the tutor service could not be reached.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Unreachable { .. })
    }

    /// Returns true if the tutor service answered with an error status.
    pub fn is_request_failed(&self) -> bool {
        matches!(self, Error::RequestFailed { .. })
    }

    /// Returns true if the response body had an unexpected shape.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Error::MalformedResponse { .. })
    }

    /// Returns true if this error is uncategorized.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Error::Unknown { .. })
    }

    /// Returns true if the server reported a failure on its side (5xx).
    ///
    /// Gateways in front of the tutor service answer 502-504 while it is
    /// waking up, so these are worth retrying by hand.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::RequestFailed { status_code, .. } if (500..=599).contains(status_code))
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::RequestFailed { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the message text carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Error::Unreachable { message, .. }
            | Error::RequestFailed { message, .. }
            | Error::MalformedResponse { message, .. }
            | Error::Unknown { message }
            | Error::HttpClient { message, .. }
            | Error::Url { message, .. } => message,
        }
    }

    /// Best-effort check for a cross-origin (CORS) rejection.
    ///
    /// Transports rarely surface CORS distinctly from other network failures,
    /// so this only looks at the message text and may miss real cases.
    pub fn mentions_cross_origin(&self) -> bool {
        let message = self.message().to_ascii_lowercase();
        message.contains("cors") || message.contains("cross-origin")
    }

    /// The connection status implied by this error.
    pub fn connection_status(&self) -> ConnectionStatus {
        match self {
            Error::Unreachable { .. } => ConnectionStatus::Offline,
            // A 2xx with a surprising body still proves the service is up.
            Error::MalformedResponse { .. } => ConnectionStatus::Online,
            _ => ConnectionStatus::Error,
        }
    }

    /// Text shown inline in the conversation when a send fails.
    pub fn user_message(&self) -> String {
        let base = match self {
            Error::Unreachable { .. } => {
                "I can't reach the tutor service right now. Please check your internet \
                 connection and try again."
                    .to_string()
            }
            Error::RequestFailed { status_code, .. } if self.is_server_error() => format!(
                "The tutor service is having trouble on its end (HTTP {status_code}). \
                 It may be starting up; please try again in a moment."
            ),
            Error::RequestFailed { status_code, .. } => {
                format!("The tutor service rejected the request (HTTP {status_code}).")
            }
            Error::MalformedResponse { message, .. } => {
                format!("The tutor sent a response I couldn't read: {message}")
            }
            Error::Unknown { message } => message.clone(),
            Error::HttpClient { message, .. } | Error::Url { message, .. } => {
                format!("Sorry, I encountered an error: {message}")
            }
        };
        if self.mentions_cross_origin() {
            format!("{base} The service may be refusing cross-origin requests.")
        } else {
            base
        }
    }

    /// Short text for the error toast that accompanies a failed send.
    pub fn toast_text(&self) -> &'static str {
        match self {
            Error::Unreachable { .. } => "You appear to be offline",
            Error::RequestFailed { .. } if self.is_server_error() => "Tutor service unavailable",
            Error::RequestFailed { .. } => "Request rejected by the tutor service",
            _ => "Something went wrong",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unreachable { message, .. } => {
                write!(f, "Service unreachable: {message}")
            }
            Error::RequestFailed {
                status_code,
                message,
            } => {
                if message.is_empty() {
                    write!(f, "Request failed with status {status_code}")
                } else {
                    write!(f, "Request failed with status {status_code}: {message}")
                }
            }
            Error::MalformedResponse { message, .. } => {
                write!(f, "Malformed response: {message}")
            }
            Error::Unknown { message } => {
                write!(f, "Unknown error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Unreachable { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::MalformedResponse { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::malformed_response(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for IntelliTutor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_maps_to_offline() {
        let err = Error::unreachable("connection refused", None);
        assert!(err.is_unreachable());
        assert_eq!(err.connection_status(), ConnectionStatus::Offline);
        assert!(err.user_message().contains("internet connection"));
        assert_eq!(err.toast_text(), "You appear to be offline");
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::request_failed(503, "Service Unavailable");
        assert!(err.is_request_failed());
        assert!(err.is_server_error());
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.connection_status(), ConnectionStatus::Error);
        assert!(err.user_message().contains("HTTP 503"));
        assert!(err.user_message().contains("try again"));
    }

    #[test]
    fn client_errors_are_rejections() {
        let err = Error::request_failed(422, "");
        assert!(!err.is_server_error());
        assert_eq!(
            err.user_message(),
            "The tutor service rejected the request (HTTP 422)."
        );
        assert_eq!(err.to_string(), "Request failed with status 422");
    }

    #[test]
    fn unknown_uses_raw_message() {
        let err = Error::unknown("stream ended early");
        assert_eq!(err.user_message(), "stream ended early");
        assert_eq!(err.connection_status(), ConnectionStatus::Error);
        assert_eq!(err.to_string(), "Unknown error: stream ended early");
    }

    #[test]
    fn cross_origin_hint() {
        let err = Error::unknown("blocked by CORS policy");
        assert!(err.mentions_cross_origin());
        assert!(err.user_message().ends_with("cross-origin requests."));

        let err = Error::unreachable("connection refused", None);
        assert!(!err.mentions_cross_origin());
    }

    #[test]
    fn malformed_response_keeps_service_online() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_malformed_response());
        assert_eq!(err.connection_status(), ConnectionStatus::Online);
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn url_errors_convert() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::Url { source: Some(_), .. }));
        assert!(err.to_string().starts_with("URL error:"));
    }
}
