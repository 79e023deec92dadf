//! OAuth2 client-credentials exchange against the Microsoft identity platform.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::{GraphError, GraphResult};

/// Default authority for token requests.
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

/// Scope requested for application tokens.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Request timeout applied to every HTTP call this crate issues.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application credentials, supplied out-of-band by the CI environment.
#[derive(Clone)]
pub struct ClientCredentials {
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Tenant (directory) id.
    pub tenant_id: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Token response from the identity platform.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Error body the identity platform returns on a rejected exchange.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// An acquired application access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: String,
    token_type: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.secret)
    }

    /// Whether the token has passed its expiry time.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    fn from_response(response: TokenResponse) -> Self {
        let expires_at = response
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        Self {
            secret: response.access_token,
            token_type: response.token_type,
            expires_at,
        }
    }
}

/// Performs the client-credentials exchange.
pub struct Authenticator {
    http: reqwest::Client,
    authority_url: String,
}

impl Authenticator {
    /// Create an authenticator against the default authority.
    ///
    /// # Errors
    /// Returns [`GraphError::Http`] if the HTTP client cannot be built.
    pub fn new() -> GraphResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
        })
    }

    /// Override the authority base URL (used by tests).
    #[must_use]
    pub fn with_authority_url(mut self, url: &str) -> Self {
        self.authority_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Exchange client credentials for an application token.
    ///
    /// # Errors
    /// Returns [`GraphError::Authentication`] when the identity platform
    /// rejects the exchange, [`GraphError::Http`] on transport failure.
    /// Either is fatal for the run: no reconciliation happens without a
    /// token.
    pub async fn acquire_token(
        &self,
        credentials: &ClientCredentials,
    ) -> GraphResult<AccessToken> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url, credentials.tenant_id
        );

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<AuthErrorBody>().await {
                Ok(body) => body.error_description.unwrap_or(body.error),
                Err(_) => format!("token endpoint returned {status}"),
            };
            return Err(GraphError::Authentication(detail));
        }

        let token = AccessToken::from_response(response.json::<TokenResponse>().await?);
        debug!(tenant = %credentials.tenant_id, "acquired application token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_response_builds_header() {
        let token = AccessToken::from_response(TokenResponse {
            access_token: "tok_abc".into(),
            token_type: "Bearer".into(),
            expires_in: Some(3599),
        });
        assert_eq!(token.authorization_header(), "Bearer tok_abc");
        assert!(!token.is_expired());
    }

    #[test]
    fn zero_lifetime_token_is_expired() {
        let token = AccessToken::from_response(TokenResponse {
            access_token: "tok".into(),
            token_type: "Bearer".into(),
            expires_in: Some(0),
        });
        assert!(token.is_expired());
    }

    #[test]
    fn token_without_lifetime_never_expires() {
        let token = AccessToken::from_response(TokenResponse {
            access_token: "tok".into(),
            token_type: "Bearer".into(),
            expires_in: None,
        });
        assert!(!token.is_expired());
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let credentials = ClientCredentials {
            client_id: "app-id".into(),
            client_secret: "hunter2".into(),
            tenant_id: "tenant-id".into(),
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("app-id"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("hunter2"));
    }
}
