use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, header};
use url::Url;

use crate::client_logger::TransportLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CHAT_MALFORMED_RESPONSES, CHAT_REQUEST_DURATION, CHAT_REQUEST_ERRORS, CHAT_REQUESTS,
    CHAT_UNREACHABLE, HEALTH_PROBE_FAILURES, HEALTH_PROBES,
};
use crate::types::{
    AssistantReply, ChatRequest, ChatResponse, ConnectionMonitor, ConnectionStatus,
};

/// Origin of the hosted tutor service.
pub const DEFAULT_ORIGIN: &str = "https://tutor-app-adk.onrender.com/";

/// Longest slice of an error body carried into [`Error::RequestFailed`].
const ERROR_BODY_LIMIT: usize = 200;

/// Outbound calls to the tutor service.
///
/// Implementations never let a raw transport failure escape: every outcome is
/// either a reply or one of the [`Error`] kinds, and every call leaves the
/// resulting [`ConnectionStatus`] behind for [`Transport::connection_status`].
/// Calls are independent; callers that need single-flight must enforce it.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Probe the health endpoint.  Never fails; the outcome is the status.
    async fn check_health(&self) -> ConnectionStatus;

    /// Submit one message and wait for the tutor's reply.
    async fn send_message(&self, text: &str) -> Result<AssistantReply>;

    /// Status recorded by the most recent probe or send.
    fn connection_status(&self) -> ConnectionStatus;
}

/// HTTP client for the tutor service.
#[derive(Clone)]
pub struct TransportClient {
    client: ReqwestClient,
    origin: Url,
    health_url: Url,
    chat_url: Url,
    user_id: Option<String>,
    timeout: Option<Duration>,
    monitor: Arc<ConnectionMonitor>,
    logger: Option<Arc<dyn TransportLogger>>,
}

impl TransportClient {
    /// Create a client for the hosted tutor service with no user label.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `origin` defaults to [`DEFAULT_ORIGIN`].  No timeout is applied unless
    /// one is given.
    pub fn with_options(
        origin: Option<&str>,
        user_id: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let origin = normalize_origin(origin.unwrap_or(DEFAULT_ORIGIN))?;
        let health_url = origin.join("health")?;
        let chat_url = origin.join("chat")?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            origin,
            health_url,
            chat_url,
            user_id,
            timeout,
            monitor: Arc::new(ConnectionMonitor::default()),
            logger: None,
        })
    }

    /// Attach a logger that sees every chat request and its outcome.
    pub fn with_logger(mut self, logger: Arc<dyn TransportLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The origin requests are sent to.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// The label sent as `user_id` with each chat request.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Shared handle on the connection status this client maintains.
    pub fn monitor(&self) -> Arc<ConnectionMonitor> {
        Arc::clone(&self.monitor)
    }

    /// Create and return default headers for API requests.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Probe `GET <origin>/health` and record the resulting status.
    pub async fn check_health(&self) -> ConnectionStatus {
        HEALTH_PROBES.click();
        let status = match self.client.get(self.health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => ConnectionStatus::Online,
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "health probe rejected");
                ConnectionStatus::Error
            }
            Err(e) => {
                let err = classify_send_error(e);
                tracing::warn!(error = %err, "health probe failed");
                err.connection_status()
            }
        };
        if status != ConnectionStatus::Online {
            HEALTH_PROBE_FAILURES.click();
        }
        let previous = self.monitor.set(status);
        if previous != status {
            tracing::info!(%previous, %status, "connection status changed");
        }
        status
    }

    /// Send `text` to `POST <origin>/chat` and return the tutor's reply.
    ///
    /// A 2xx answer without a usable `full_response` yields
    /// [`AssistantReply::empty`] rather than an error.
    pub async fn send_message(&self, text: &str) -> Result<AssistantReply> {
        let request = ChatRequest::new(text).with_user_id(self.user_id.clone());
        CHAT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }
        tracing::debug!(url = %self.chat_url, chars = text.chars().count(), "sending chat request");

        let start = Instant::now();
        let result = self.post_chat(&request).await;
        CHAT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        match &result {
            Ok(reply) => {
                self.monitor.set(ConnectionStatus::Online);
                if let Some(logger) = &self.logger {
                    logger.log_reply(reply);
                }
                tracing::debug!(placeholder = reply.placeholder, "chat reply received");
            }
            Err(err) => {
                CHAT_REQUEST_ERRORS.click();
                if err.is_unreachable() {
                    CHAT_UNREACHABLE.click();
                }
                self.monitor.set(err.connection_status());
                if let Some(logger) = &self.logger {
                    logger.log_failure(err);
                }
                tracing::warn!(error = %err, "chat request failed");
            }
        }
        result
    }

    async fn post_chat(&self, request: &ChatRequest) -> Result<AssistantReply> {
        let response = self
            .client
            .post(self.chat_url.clone())
            .headers(Self::default_headers())
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if is_connectivity_failure(&e) {
                Error::unreachable(
                    format!("Connection lost: {}", error_chain(&e)),
                    Some(Box::new(e)),
                )
            } else {
                Error::unknown(format!("Failed to read response: {}", error_chain(&e)))
            }
        })?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                truncate(body.trim(), ERROR_BODY_LIMIT)
            };
            return Err(Error::request_failed(status.as_u16(), message));
        }

        Ok(parse_reply(&body))
    }
}

impl fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportClient")
            .field("origin", &self.origin.as_str())
            .field("user_id", &self.user_id)
            .field("timeout", &self.timeout)
            .field("status", &self.monitor.get())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl Transport for TransportClient {
    async fn check_health(&self) -> ConnectionStatus {
        TransportClient::check_health(self).await
    }

    async fn send_message(&self, text: &str) -> Result<AssistantReply> {
        TransportClient::send_message(self, text).await
    }

    fn connection_status(&self) -> ConnectionStatus {
        self.monitor.get()
    }
}

/// Parse a 2xx body, degrading to the placeholder reply on any surprise.
fn parse_reply(body: &str) -> AssistantReply {
    match serde_json::from_str::<ChatResponse>(body) {
        Ok(response) => AssistantReply::from(response),
        Err(e) => {
            let err = Error::from(e);
            CHAT_MALFORMED_RESPONSES.click();
            tracing::warn!(error = %err, "substituting placeholder reply");
            AssistantReply::empty()
        }
    }
}

/// Parse the origin and make sure it ends in `/` so endpoint joins append.
fn normalize_origin(origin: &str) -> Result<Url> {
    let mut url = Url::parse(origin)?;
    if url.cannot_be_a_base() {
        return Err(Error::url(format!("{origin} cannot be used as a base URL"), None));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn classify_send_error(e: reqwest::Error) -> Error {
    if is_connectivity_failure(&e) {
        Error::unreachable(
            format!("Connection error: {}", error_chain(&e)),
            Some(Box::new(e)),
        )
    } else {
        Error::unknown(format!("Request failed: {}", error_chain(&e)))
    }
}

fn is_connectivity_failure(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || looks_like_connectivity(&error_chain(e))
}

/// Message-text heuristic for failures the transport doesn't flag as connect
/// errors, e.g. a connection reset while the request is in flight.
fn looks_like_connectivity(message: &str) -> bool {
    const PATTERNS: &[&str] = &[
        "failed to fetch",
        "network error",
        "connection refused",
        "connection reset",
        "connection closed",
        "dns error",
        "failed to lookup address",
        "no route to host",
        "network is unreachable",
    ];
    let message = message.to_ascii_lowercase();
    PATTERNS.iter().any(|pattern| message.contains(pattern))
}

/// Render an error with its sources, which is where reqwest keeps the detail.
fn error_chain(e: &dyn StdError) -> String {
    let mut rendered = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
