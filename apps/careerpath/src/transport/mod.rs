//! Transport: the single point of entry for outbound HTTP calls to the
//! career-guidance backend.
//!
//! No other module talks to `reqwest` directly. Controllers and the CV client
//! hold an `Arc<dyn Transport>` so tests can swap in a scripted transport.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::TransportError;

#[cfg(test)]
pub mod scripted;

/// A raw HTTP response: status code plus undecoded body text.
/// Classification happens later, in the controller.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `body` as a JSON POST to `url`.
    ///
    /// Dropping the returned future must abort the call and release its
    /// connection; the controller relies on this for timeouts and superseded
    /// requests.
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport used by the binary.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("careerpath/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("POST {} returned {} ({} bytes)", url, status, body.len());

        Ok(HttpResponse { status, body })
    }
}

/// Joins a normalized base URL and an endpoint path with exactly one slash.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
