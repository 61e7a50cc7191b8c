//! Configuration
//!
//! Defaults for the GitHub App protocol, HTTP client settings, Go-style
//! duration parsing for the CLI flags and private key loading.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::TokenError;

/// Backdating applied to the assertion's issued-at claim
pub const CLOCK_SKEW: Duration = Duration::from_secs(30);

/// Assertion lifetime used when the caller does not pick one
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// GitHub rejects assertions expiring further than this in the future
pub const MAX_LIFETIME: Duration = Duration::from_secs(10 * 60);

/// Public GitHub REST API
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Per-request timeout for the GitHub API calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client settings for the GitHub API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (no trailing slash)
    pub api_url: String,
    /// Timeout applied to each request
    pub timeout: Duration,
    /// User-Agent header, required by GitHub
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("github-app-token/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Point the client at another API root (GitHub Enterprise Server, mocks)
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Parse a duration such as `5m`, `1h30m`, `90s` or `500ms`.
///
/// A bare integer is read as seconds. Zero durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, TokenError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TokenError::validation("duration must not be empty"));
    }

    if let Ok(secs) = input.parse::<u64>() {
        return non_zero(input, Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid_duration(input));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| invalid_duration(input))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "h" => value.checked_mul(3600).map(Duration::from_secs),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            "s" => Some(Duration::from_secs(value)),
            "ms" => Some(Duration::from_millis(value)),
            _ => None,
        }
        .ok_or_else(|| invalid_duration(input))?;
        rest = &rest[unit_len..];

        total = total
            .checked_add(part)
            .ok_or_else(|| invalid_duration(input))?;
    }

    non_zero(input, total)
}

fn non_zero(input: &str, duration: Duration) -> Result<Duration, TokenError> {
    if duration.is_zero() {
        return Err(TokenError::validation(format!(
            "duration {:?} must be greater than zero",
            input
        )));
    }
    Ok(duration)
}

fn invalid_duration(input: &str) -> TokenError {
    TokenError::validation(format!(
        "invalid duration {:?} (expected e.g. 15m, 1h30m, 90s)",
        input
    ))
}

/// Load the App private key, preferring inline PEM text over a key file.
pub fn load_private_key(
    inline: Option<&str>,
    path: Option<&Path>,
) -> Result<Vec<u8>, TokenError> {
    if let Some(pem) = inline.filter(|pem| !pem.trim().is_empty()) {
        return Ok(pem.as_bytes().to_vec());
    }

    let path = path.ok_or_else(|| {
        TokenError::validation(
            "env var GITHUB_APP_PRIVATE_KEY or GITHUB_APP_PRIVATE_KEY_PATH is required to be set",
        )
    })?;

    let key = fs::read(path).map_err(|e| {
        TokenError::validation(format!(
            "failed to read private key {}: {}",
            path.display(),
            e
        ))
    })?;

    if key.iter().all(u8::is_ascii_whitespace) {
        return Err(TokenError::validation(format!(
            "private key file {} is empty",
            path.display()
        )));
    }

    Ok(key)
}
