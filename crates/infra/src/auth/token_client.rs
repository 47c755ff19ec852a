//! Credential exchange against the Sienge token endpoint

use capexflow_domain::{CapexFlowError, CredentialsGrant, Result, SiengeConfig};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::http::HttpClient;
use super::session::TokenResponse;

/// Paths for the two token-exchange shapes
const OAUTH_TOKEN_PATH: &str = "/oauth/token";
const LOGIN_TOKEN_PATH: &str = "/auth/token";

/// Error payload returned by the token endpoint. Covers both the RFC 6749
/// shape (`error`/`error_description`) and the plain `message` shape.
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl TokenErrorBody {
    fn into_message(self) -> Option<String> {
        if let Some(message) = self.message {
            return Some(message);
        }
        match (self.error, self.error_description) {
            (Some(error), Some(desc)) => Some(format!("{error}: {desc}")),
            (Some(error), None) => Some(error),
            (None, Some(desc)) => Some(desc),
            (None, None) => None,
        }
    }
}

/// HTTP client for the credential exchange.
///
/// Which exchange shape is used, OAuth2 client-credentials (form-encoded) or
/// username/password login (JSON), follows from the configured grant rather
/// than from a separate client implementation.
pub struct TokenClient {
    config: SiengeConfig,
    http: HttpClient,
}

impl TokenClient {
    /// Create a token client for the given configuration.
    ///
    /// # Errors
    /// Returns `CapexFlowError::Config` when the configuration is
    /// incomplete, before any network call is possible.
    pub fn new(config: SiengeConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, http })
    }

    /// Perform the credential exchange.
    ///
    /// # Errors
    /// - `Auth` when the server rejects the credentials or returns a
    ///   malformed token response
    /// - `Timeout` / `Network` for transport failures
    pub async fn fetch_token(&self) -> Result<TokenResponse> {
        let base = self.config.normalized_base_url();

        let builder = match &self.config.grant {
            CredentialsGrant::ClientCredentials { client_id, client_secret } => {
                let mut form = vec![
                    ("grant_type", "client_credentials".to_string()),
                    ("client_id", client_id.clone()),
                    ("client_secret", client_secret.clone()),
                ];
                if let Some(scope) = &self.config.scope {
                    form.push(("scope", scope.clone()));
                }

                self.http
                    .request(Method::POST, format!("{base}{OAUTH_TOKEN_PATH}"))
                    .header(reqwest::header::ACCEPT, "application/json")
                    .form(&form)
            }
            CredentialsGrant::Password { username, password } => self
                .http
                .request(Method::POST, format!("{base}{LOGIN_TOKEN_PATH}"))
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&serde_json::json!({ "username": username, "password": password })),
        };

        let response = self.http.send(builder).await?;
        let status = response.status();
        debug!(status = status.as_u16(), "received token exchange response");

        if !status.is_success() {
            let fallback = format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
            let message = match response.json::<TokenErrorBody>().await {
                Ok(body) => body.into_message().unwrap_or(fallback),
                Err(_) => fallback,
            };
            return Err(CapexFlowError::Auth(message));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CapexFlowError::Auth(format!("malformed token response: {e}")))
    }
}
