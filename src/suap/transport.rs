//! HTTP transport seam for provider calls
//!
//! The adapter only talks to the provider through [`HttpTransport`], so the
//! candidate-endpoint logic can be exercised against a scripted transport.
//! [`ReqwestTransport`] is the production implementation.

use async_trait::async_trait;
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;

/// Body of an outbound request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl RequestBody {
    /// Short label used in log lines
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RequestBody::Empty => "empty",
            RequestBody::Form(_) => "form",
            RequestBody::Json(_) => "json",
        }
    }
}

/// Outbound request to the identity provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ProviderRequest {
    #[must_use]
    pub fn post(url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: reqwest::Method::POST,
            url: url.into(),
            bearer: None,
            body,
        }
    }

    #[must_use]
    pub fn get_with_bearer(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            url: url.into(),
            bearer: Some(token.into()),
            body: RequestBody::Empty,
        }
    }
}

/// Status and raw body of a provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

impl ProviderResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// Parse the body as JSON, if it is JSON
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Failure to get any HTTP response from a candidate
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connect: {0}")]
    Connect(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("tls: {0}")]
    Tls(String),
    #[error("request: {0}")]
    Other(String),
}

/// Sends provider requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return whatever the provider answered
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response was received at all.
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, TransportError>;
}

/// `reqwest`-backed transport with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests are bounded by `timeout`
    ///
    /// Redirects are not followed; a moved endpoint shows up as a non-success
    /// status and the next candidate is tried.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("suap-auth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| classify_reqwest_error(&e))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Json(value) => builder.json(&value),
        };

        let response = builder.send().await.map_err(|e| classify_reqwest_error(&e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        Ok(ProviderResponse { status, body })
    }
}

/// Map a reqwest error onto the transport failure kinds the adapter reports
fn classify_reqwest_error(error: &reqwest::Error) -> TransportError {
    let message = error_chain_message(error);

    if error.is_timeout() {
        TransportError::Timeout(message)
    } else if looks_like_tls_failure(&message) {
        TransportError::Tls(message)
    } else if error.is_connect() {
        TransportError::Connect(message)
    } else {
        TransportError::Other(message)
    }
}

fn error_chain_message(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn looks_like_tls_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["certificate", "tls", "handshake"]
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_statuses() {
        assert!(ProviderResponse::new(200, "{}").is_success());
        assert!(ProviderResponse::new(201, "{}").is_success());
        assert!(!ProviderResponse::new(204, "").is_success());
        assert!(!ProviderResponse::new(401, "").is_success());
    }

    #[test]
    fn test_json_body_parsing() {
        assert!(ProviderResponse::new(200, r#"{"access":"x"}"#).json().is_some());
        assert!(ProviderResponse::new(200, "<html>").json().is_none());
    }

    #[test]
    fn test_tls_markers() {
        assert!(looks_like_tls_failure(
            "error sending request: invalid peer certificate: UnknownIssuer"
        ));
        assert!(!looks_like_tls_failure("connection refused"));
    }

    #[test]
    fn test_transport_error_display_prefix() {
        assert_eq!(
            TransportError::Timeout("deadline".to_string()).to_string(),
            "timeout: deadline"
        );
        assert_eq!(
            TransportError::Tls("bad cert".to_string()).to_string(),
            "tls: bad cert"
        );
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(15)).is_ok());
    }
}
