//! GitHub App Authentication
//!
//! Builds and signs the short-lived JWT that identifies the App to GitHub.
//! See <https://docs.github.com/en/apps/creating-github-apps/authenticating-with-a-github-app/generating-a-json-web-token-jwt-for-a-github-app>

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CLOCK_SKEW, MAX_LIFETIME};
use crate::error::TokenError;

/// GitHub App ID and its RSA private key
#[derive(Clone)]
pub struct AppCredential {
    /// The GitHub App ID
    pub app_id: String,
    /// The private key in PEM format
    pub private_key: Vec<u8>,
}

impl AppCredential {
    pub fn new(app_id: impl Into<String>, private_key: impl Into<Vec<u8>>) -> Self {
        Self {
            app_id: app_id.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for AppCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredential")
            .field("app_id", &self.app_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// JWT claims for GitHub App authentication
#[derive(Debug, Serialize)]
pub struct GitHubAppClaims {
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer (GitHub App ID)
    pub iss: String,
}

/// A signed App JWT, presented as a bearer credential
#[derive(Clone)]
pub struct Assertion {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    issuer: String,
}

impl Assertion {
    /// The compact `header.claims.signature` form
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("issuer", &self.issuer)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Generate a JWT for GitHub App authentication
///
/// # Arguments
/// * `app_id` - The GitHub App ID
/// * `private_key_pem` - The private key in PEM format
/// * `lifetime` - How long after the backdated issue time the JWT stays valid
pub fn sign(
    app_id: &str,
    private_key_pem: &[u8],
    lifetime: Duration,
) -> Result<Assertion, TokenError> {
    sign_at(app_id, private_key_pem, lifetime, Utc::now())
}

/// Same as [`sign`], with the wall clock reading supplied by the caller.
///
/// `iat` is `now - 30s` and `exp` is `iat + lifetime`, both truncated to
/// whole seconds.
pub fn sign_at(
    app_id: &str,
    private_key_pem: &[u8],
    lifetime: Duration,
    now: DateTime<Utc>,
) -> Result<Assertion, TokenError> {
    if app_id.trim().is_empty() {
        return Err(TokenError::validation("GitHub App ID must not be empty"));
    }
    if lifetime.is_zero() {
        return Err(TokenError::validation("JWT lifetime must be greater than zero"));
    }

    let skew = chrono::Duration::from_std(CLOCK_SKEW)
        .map_err(|e| TokenError::validation(format!("invalid clock skew: {}", e)))?;
    let lifetime = chrono::Duration::from_std(lifetime)
        .map_err(|e| TokenError::validation(format!("invalid JWT lifetime: {}", e)))?;

    let iat = (now - skew).timestamp();
    let exp = iat
        .checked_add(lifetime.num_seconds())
        .ok_or_else(|| TokenError::validation("JWT lifetime is too large"))?;

    let issued_at = DateTime::from_timestamp(iat, 0)
        .ok_or_else(|| TokenError::validation("JWT issue time is out of range"))?;
    let expires_at = DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| TokenError::validation("JWT lifetime is too large"))?;

    if let Ok(max) = chrono::Duration::from_std(MAX_LIFETIME) {
        if expires_at > now + max {
            warn!(
                app_id = %app_id,
                expires_at = %expires_at,
                "JWT expires more than 10 minutes from now; GitHub will likely reject it"
            );
        }
    }

    let claims = GitHubAppClaims {
        iat,
        exp,
        iss: app_id.to_string(),
    };

    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem).map_err(TokenError::KeyParse)?;

    let header = Header::new(Algorithm::RS256);

    let token = encode(&header, &claims, &encoding_key).map_err(classify_encode_error)?;

    debug!(
        app_id = %app_id,
        issued_at = %issued_at,
        expires_at = %expires_at,
        "Signed GitHub App JWT"
    );

    Ok(Assertion {
        token,
        issued_at,
        expires_at,
        issuer: claims.iss,
    })
}

/// `from_rsa_pem` only strips the PEM armor; the DER is first decoded when
/// signing, so a key rejected there is still a key parse failure.
fn classify_encode_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => TokenError::KeyParse(e),
        _ => TokenError::Signing(e),
    }
}
