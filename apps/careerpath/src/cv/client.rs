//! CV generation calls: `/generate-cv` and `/generate-summary`.
//!
//! Same deadline, configuration check and failure taxonomy as the request
//! controller, but stateless: each call validates, posts the whole form and
//! returns a result.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::controller::classify::{decode, success_body};
use crate::cv::form::CvForm;
use crate::cv::validation::{summary_ready, validate_form, FieldErrors, MSG_SUMMARY_NOT_READY};
use crate::errors::{ErrorInfo, MSG_INCOMPLETE, MSG_NO_DATA};
use crate::transport::{endpoint_url, Transport};

const GENERATE_CV_ENDPOINT: &str = "/generate-cv";
const GENERATE_SUMMARY_ENDPOINT: &str = "/generate-summary";
const MSG_NO_SUMMARY: &str = "No summary was generated";

#[derive(Debug, Error)]
pub enum CvError {
    #[error("CV form has {} invalid field(s)", .0.len())]
    InvalidForm(FieldErrors),

    #[error("{0}")]
    Request(#[from] ErrorInfo),
}

/// A rendered CV ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCv {
    pub filename: String,
    /// Absolute URL: the backend returns a path relative to its base URL.
    pub download_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GenerateCvResponse {
    filename: String,
    download_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateSummaryResponse {
    success: bool,
    summary: String,
}

#[derive(Clone)]
pub struct CvClient {
    transport: Arc<dyn Transport>,
    base_url: Option<String>,
    timeout: Duration,
}

impl CvClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: Option<String>) -> Self {
        Self {
            transport,
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self::new(transport, config.base_url.clone()).with_timeout(config.timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the form and asks the backend to render it.
    pub async fn generate_cv(&self, form: &CvForm) -> Result<GeneratedCv, CvError> {
        let errors = validate_form(form);
        if !errors.is_empty() {
            return Err(CvError::InvalidForm(errors));
        }

        let (base_url, body) = self.post(GENERATE_CV_ENDPOINT, form).await?;
        let response: GenerateCvResponse = decode(body)?;

        if response.filename.trim().is_empty() || response.download_url.trim().is_empty() {
            warn!("CV response is missing filename or downloadUrl");
            return Err(ErrorInfo::server(MSG_INCOMPLETE).into());
        }

        info!("CV generated: {}", response.filename);
        Ok(GeneratedCv {
            filename: response.filename,
            download_url: absolute_download_url(&base_url, &response.download_url),
        })
    }

    /// Asks the backend to draft the summary paragraph from the rest of the form.
    pub async fn generate_summary(&self, form: &CvForm) -> Result<String, CvError> {
        if !summary_ready(form) {
            return Err(ErrorInfo::validation(MSG_SUMMARY_NOT_READY).into());
        }

        let (_, body) = self.post(GENERATE_SUMMARY_ENDPOINT, form).await?;
        let response: GenerateSummaryResponse = decode(body)?;

        if !response.success || response.summary.trim().is_empty() {
            return Err(ErrorInfo::server(MSG_NO_SUMMARY).into());
        }
        Ok(response.summary)
    }

    /// Posts the form and returns the base URL used plus the parsed 2xx body.
    async fn post(&self, endpoint: &str, form: &CvForm) -> Result<(String, Value), ErrorInfo> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            warn!("No backend base URL configured for {endpoint}");
            ErrorInfo::configuration()
        })?;

        let body = serde_json::to_value(form).map_err(|e| {
            warn!("Failed to serialize CV form: {e}");
            ErrorInfo::unknown("Could not prepare the CV form for sending.")
        })?;
        let url = endpoint_url(base_url, endpoint);
        info!("POST {}", url);

        // dropping the call future on timeout aborts it
        let call = self.transport.post_json(&url, &body);
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("{} failed in transport: {}", endpoint, e);
                return Err(e.into());
            }
            Err(_elapsed) => {
                warn!("{} timed out after {}s", endpoint, self.timeout.as_secs());
                return Err(ErrorInfo::timed_out());
            }
        };

        let body = success_body(&response)?;
        if body.is_null() {
            return Err(ErrorInfo::server(MSG_NO_DATA));
        }
        Ok((base_url.to_string(), body))
    }
}

fn absolute_download_url(base_url: &str, download_url: &str) -> String {
    if download_url.starts_with("http://") || download_url.starts_with("https://") {
        download_url.to_string()
    } else {
        endpoint_url(base_url, download_url)
    }
}
