//! Configuration structures
//!
//! Sienge connection settings consumed by the infra crate. Validation happens
//! here so a misconfigured deployment fails before any network call is
//! attempted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::errors::{CapexFlowError, Result};

/// Credential material for the token exchange.
///
/// The Sienge deployments this dashboard targets expose two grant shapes;
/// which one is used is a configuration decision, not a separate client
/// implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsGrant {
    /// OAuth2 client-credentials grant (form-encoded token exchange).
    ClientCredentials { client_id: String, client_secret: String },

    /// Username/password login (JSON body token exchange).
    Password { username: String, password: String },
}

/// Sienge API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiengeConfig {
    /// Base URL of the Sienge API (e.g. "https://api.sienge.com.br")
    pub base_url: String,

    /// Credential material for the token exchange
    pub grant: CredentialsGrant,

    /// Optional OAuth scope requested during the exchange
    #[serde(default)]
    pub scope: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl SiengeConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `CapexFlowError::Config` with a descriptive message when a
    /// required value is missing or malformed. Called at client construction,
    /// before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CapexFlowError::Config("Sienge API base URL is not configured".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(CapexFlowError::Config(format!(
                "Sienge API base URL must be an http(s) URL: {}",
                self.base_url
            )));
        }
        match &self.grant {
            CredentialsGrant::ClientCredentials { client_id, client_secret } => {
                if client_id.is_empty() {
                    return Err(CapexFlowError::Config(
                        "Sienge client id is not configured".to_string(),
                    ));
                }
                if client_secret.is_empty() {
                    return Err(CapexFlowError::Config(
                        "Sienge client secret is not configured".to_string(),
                    ));
                }
            }
            CredentialsGrant::Password { username, password } => {
                if username.is_empty() {
                    return Err(CapexFlowError::Config(
                        "Sienge username is not configured".to_string(),
                    ));
                }
                if password.is_empty() {
                    return Err(CapexFlowError::Config(
                        "Sienge password is not configured".to_string(),
                    ));
                }
            }
        }
        if self.timeout_secs == 0 {
            return Err(CapexFlowError::Config("request timeout must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with any trailing slash removed, so endpoint paths can be
    /// appended verbatim.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SiengeConfig {
        SiengeConfig {
            base_url: "https://api.sienge.com.br".to_string(),
            grant: CredentialsGrant::ClientCredentials {
                client_id: "capexflow".to_string(),
                client_secret: "s3cret".to_string(),
            },
            scope: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn accepts_complete_client_credentials_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn rejects_missing_base_url() {
        let mut config = valid_config();
        config.base_url = "".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CapexFlowError::Config(_)));
        assert!(err.to_string().contains("base URL"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = valid_config();
        config.base_url = "api.sienge.com.br".to_string();

        assert!(matches!(config.validate(), Err(CapexFlowError::Config(_))));
    }

    #[test]
    fn rejects_empty_client_secret() {
        let mut config = valid_config();
        config.grant = CredentialsGrant::ClientCredentials {
            client_id: "capexflow".to_string(),
            client_secret: String::new(),
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("client secret"));
    }

    #[test]
    fn rejects_empty_password_credentials() {
        let mut config = valid_config();
        config.grant = CredentialsGrant::Password {
            username: "finance@example.com".to_string(),
            password: String::new(),
        };

        assert!(matches!(config.validate(), Err(CapexFlowError::Config(_))));
    }

    #[test]
    fn normalizes_trailing_slash() {
        let mut config = valid_config();
        config.base_url = "https://api.sienge.com.br/".to_string();

        assert_eq!(config.normalized_base_url(), "https://api.sienge.com.br");
    }
}
