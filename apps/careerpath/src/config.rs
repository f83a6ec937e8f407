use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Default deadline for a single backend call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
/// The base URL is optional here: flows that need it fail with a
/// configuration error at submit time instead of at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = match std::env::var("CAREERPATH_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            base_url: optional_env("CAREERPATH_BASE_URL"),
            timeout: Duration::from_secs(timeout_secs),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Replaces the base URL when one is given on the command line.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.and_then(|u| normalize_base_url(&u)) {
            self.base_url = Some(url);
        }
        self
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .and_then(|value| normalize_base_url(&value))
}

/// Trims whitespace and trailing slashes; blank values count as absent.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_timeout_secs(raw: &str) -> Result<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .context("CAREERPATH_TIMEOUT_SECS must be a whole number of seconds")?;
    if secs == 0 {
        bail!("CAREERPATH_TIMEOUT_SECS must be greater than zero");
    }
    Ok(secs)
}
