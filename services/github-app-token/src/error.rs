//! Error types for the credential exchange
//!
//! Every failure is fatal to the invocation. The variants keep the stage that
//! failed distinguishable, and the response checks keep "field absent" apart
//! from "field has the wrong shape". Underlying causes are exposed through
//! `source()`, not repeated in the message.

use thiserror::Error;

/// Errors that can occur while exchanging App credentials for a token
#[derive(Debug, Error)]
pub enum TokenError {
    /// Required input missing or invalid before any network call
    #[error("{0}")]
    Validation(String),

    /// Private key is not a PEM-encoded RSA private key
    #[error("failed to parse RSA private key")]
    KeyParse(#[source] jsonwebtoken::errors::Error),

    /// Key parsed but the RS256 signature could not be produced
    #[error("failed to sign GitHub App JWT")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Transport failure talking to the GitHub API
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body is not a JSON object
    #[error("response from {url} is not a JSON object")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Response is a JSON object without the expected field
    #[error(
        "{what} is missing from response (HTTP {status}{reason})",
        what = describe(.field),
        reason = github_message(.message)
    )]
    MissingField {
        field: &'static str,
        status: u16,
        message: Option<String>,
    },

    /// Expected field is present but holds the wrong JSON type
    #[error("{what} {value} is not a {expected}", what = describe(.field))]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        value: serde_json::Value,
    },
}

impl TokenError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

fn describe(field: &str) -> &str {
    match field {
        "id" => "installation ID",
        "token" => "access token",
        other => other,
    }
}

fn github_message(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}
