//! GitHub App API client
//!
//! The two authenticated calls of the installation token flow:
//! repository → installation ID, then installation ID → access token.
//! Both present the App JWT as a bearer credential and perform no retries;
//! creating an access token is not safe to repeat blindly.

use std::fmt;

use reqwest::{Client, Method};
use tracing::debug;

use crate::auth::Assertion;
use crate::config::{ClientConfig, GITHUB_API_VERSION};
use crate::error::TokenError;
use crate::response::ResponseObject;

/// Numeric installation ID, kept in its canonical decimal string form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationId(String);

impl InstallationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Installation access token scoped to the resolved installation
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// The token value, for handing to git or the API
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// GitHub REST client authenticated as the App
pub struct GitHubAppClient {
    client: Client,
    api_url: String,
}

impl GitHubAppClient {
    /// Build a client from the given settings
    pub fn new(config: &ClientConfig) -> Result<Self, TokenError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|source| TokenError::Network {
                url: config.api_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Look up the App installation that covers `repo` (`owner/name`)
    pub async fn resolve_installation(
        &self,
        assertion: &Assertion,
        repo: &str,
    ) -> Result<InstallationId, TokenError> {
        let url = format!("{}/repos/{}/installation", self.api_url, repo);

        let response = self.send(Method::GET, &url, assertion).await?;
        let id = response.require_integer("id")?;

        debug!(repo = %repo, installation_id = %id, "Resolved installation");
        Ok(InstallationId(id))
    }

    /// Exchange the JWT for an installation access token
    pub async fn exchange_token(
        &self,
        assertion: &Assertion,
        installation_id: &InstallationId,
    ) -> Result<AccessToken, TokenError> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_url, installation_id
        );

        let response = self.send(Method::POST, &url, assertion).await?;
        let token = response.require_string("token")?;

        debug!(installation_id = %installation_id, "Issued installation access token");
        Ok(AccessToken(token))
    }

    /// Send an authenticated request and decode the body as a JSON object.
    ///
    /// Non-2xx statuses are not errors here; GitHub's error bodies lack the
    /// expected field and surface as `MissingField` with the status attached.
    async fn send(
        &self,
        method: Method,
        url: &str,
        assertion: &Assertion,
    ) -> Result<ResponseObject, TokenError> {
        let network = |source| TokenError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .request(method.clone(), url)
            .bearer_auth(assertion.as_str())
            .header("Accept", "application/json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        debug!(method = %method, url = %url, status = %status, "GitHub API response");

        let text = response.text().await.map_err(network)?;
        ResponseObject::parse(url, status.as_u16(), &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_strips_trailing_slash() {
        let config = ClientConfig {
            api_url: "http://127.0.0.1:1/".to_string(),
            timeout: Duration::from_secs(1),
            user_agent: "test".to_string(),
        };
        let client = GitHubAppClient::new(&config).unwrap();
        assert_eq!(client.api_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken("ghs_secret".to_string());
        assert_eq!(format!("{:?}", token), "AccessToken(<redacted>)");
        assert_eq!(token.expose(), "ghs_secret");
    }

    #[test]
    fn test_installation_id_display() {
        assert_eq!(InstallationId::new("999").to_string(), "999");
    }
}
