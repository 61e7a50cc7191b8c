//! GitHub App Installation Tokens
//!
//! Exchanges a GitHub App's private key for a short-lived, repository-scoped
//! installation access token.
//!
//! ## Flow
//!
//! 1. [`auth::sign`] builds an RS256 JWT (`iat` backdated 30 seconds for clock skew)
//! 2. [`GitHubAppClient::resolve_installation`] finds the installation for `owner/name`
//! 3. [`GitHubAppClient::exchange_token`] trades the JWT for an access token
//!
//! [`issue_installation_token`] runs all three.
//!
//! ## Usage
//!
//! ```bash
//! GITHUB_APP_ID=123456 \
//! GITHUB_APP_PRIVATE_KEY="$(cat key.pem)" \
//! github-app-token --repo lornu-ai/lornu.ai --expiry 5m
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod response;

pub use auth::{sign, AppCredential, Assertion};
pub use client::{AccessToken, GitHubAppClient, InstallationId};
pub use config::ClientConfig;
pub use error::TokenError;
pub use pipeline::{issue_installation_token, TokenRequest};
