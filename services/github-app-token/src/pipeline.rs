//! Installation token pipeline
//!
//! Signer → Resolver → Exchanger, strictly in sequence. Any failure aborts
//! the run and is returned as-is; nothing partial is handed back.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::auth::{self, AppCredential};
use crate::client::{AccessToken, GitHubAppClient};
use crate::config::DEFAULT_LIFETIME;
use crate::error::TokenError;

/// Everything needed for one credential exchange
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub credential: AppCredential,
    /// Repository full name, `owner/name`
    pub repository: String,
    /// Lifetime of the App JWT
    pub lifetime: Duration,
}

impl TokenRequest {
    pub fn new(credential: AppCredential, repository: impl Into<String>) -> Self {
        Self {
            credential,
            repository: repository.into(),
            lifetime: DEFAULT_LIFETIME,
        }
    }

    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Reject missing inputs before anything touches the network
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.repository.trim().is_empty() {
            return Err(TokenError::validation("--repo is required"));
        }
        if self.credential.app_id.trim().is_empty() {
            return Err(TokenError::validation(
                "env var GITHUB_APP_ID is required to be set",
            ));
        }
        if self.credential.private_key.iter().all(u8::is_ascii_whitespace) {
            return Err(TokenError::validation(
                "env var GITHUB_APP_PRIVATE_KEY is required to be set",
            ));
        }
        if self.lifetime.is_zero() {
            return Err(TokenError::validation("--expiry must be greater than zero"));
        }
        Ok(())
    }
}

/// Progress through the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unsigned,
    Signed,
    Resolved,
    Exchanged,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Unsigned => write!(f, "unsigned"),
            Stage::Signed => write!(f, "signed"),
            Stage::Resolved => write!(f, "resolved"),
            Stage::Exchanged => write!(f, "exchanged"),
        }
    }
}

/// Run the full exchange and return the installation access token
pub async fn issue_installation_token(
    client: &GitHubAppClient,
    request: &TokenRequest,
) -> Result<AccessToken, TokenError> {
    request.validate()?;
    let repo = request.repository.trim();
    let mut stage = Stage::Unsigned;

    let assertion = auth::sign(
        &request.credential.app_id,
        &request.credential.private_key,
        request.lifetime,
    )?;
    advance(&mut stage, Stage::Signed);

    let installation_id = client.resolve_installation(&assertion, repo).await?;
    advance(&mut stage, Stage::Resolved);

    let token = client.exchange_token(&assertion, &installation_id).await?;
    advance(&mut stage, Stage::Exchanged);

    info!(
        app_id = %request.credential.app_id,
        repo = %repo,
        installation_id = %installation_id,
        "Installation access token issued"
    );
    Ok(token)
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "Pipeline advanced");
    *stage = next;
}
