//! Configuration loader
//!
//! Loads the Sienge connection settings from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables (a `.env` file is
//!    honored via dotenvy)
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SIENGE_API_URL`: Base URL of the Sienge API (required)
//! - `SIENGE_CLIENT_ID` / `SIENGE_CLIENT_SECRET`: client-credentials grant
//! - `SIENGE_USERNAME` / `SIENGE_PASSWORD`: username/password grant
//!   (used when the client-credentials pair is absent)
//! - `SIENGE_SCOPE`: optional OAuth scope
//! - `SIENGE_TIMEOUT_SECS`: optional request timeout override (default 30)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./capexflow.json` or `./capexflow.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use capexflow_domain::{CapexFlowError, CredentialsGrant, Result, SiengeConfig};
use capexflow_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `CapexFlowError::Config` if configuration cannot be loaded from
/// either source, or fails validation.
pub fn load() -> Result<SiengeConfig> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Sienge configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `CapexFlowError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<SiengeConfig> {
    let base_url = env_var("SIENGE_API_URL")?;

    let grant = match (std::env::var("SIENGE_CLIENT_ID").ok(), std::env::var("SIENGE_CLIENT_SECRET").ok())
    {
        (Some(client_id), Some(client_secret)) => {
            CredentialsGrant::ClientCredentials { client_id, client_secret }
        }
        _ => match (std::env::var("SIENGE_USERNAME").ok(), std::env::var("SIENGE_PASSWORD").ok()) {
            (Some(username), Some(password)) => CredentialsGrant::Password { username, password },
            _ => {
                return Err(CapexFlowError::Config(
                    "missing Sienge credentials: set SIENGE_CLIENT_ID/SIENGE_CLIENT_SECRET \
                     or SIENGE_USERNAME/SIENGE_PASSWORD"
                        .to_string(),
                ))
            }
        },
    };

    let timeout_secs = match std::env::var("SIENGE_TIMEOUT_SECS") {
        Ok(raw) => raw.parse::<u64>().map_err(|e| {
            CapexFlowError::Config(format!("invalid SIENGE_TIMEOUT_SECS: {e}"))
        })?,
        Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
    };

    let config = SiengeConfig {
        base_url,
        grant,
        scope: std::env::var("SIENGE_SCOPE").ok(),
        timeout_secs,
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CapexFlowError::Config` if the file is missing, unparsable or
/// fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<SiengeConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CapexFlowError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CapexFlowError::Config(
                "no config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading Sienge configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CapexFlowError::Config(format!("failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content. Format is detected by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<SiengeConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CapexFlowError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CapexFlowError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(CapexFlowError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("capexflow.json"),
            cwd.join("capexflow.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("capexflow.json"),
                exe_dir.join("capexflow.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CapexFlowError::Config(format!("missing required environment variable: {key}"))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_sienge_env() {
        for key in [
            "SIENGE_API_URL",
            "SIENGE_CLIENT_ID",
            "SIENGE_CLIENT_SECRET",
            "SIENGE_USERNAME",
            "SIENGE_PASSWORD",
            "SIENGE_SCOPE",
            "SIENGE_TIMEOUT_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn loads_client_credentials_from_env() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_sienge_env();

        std::env::set_var("SIENGE_API_URL", "https://api.sienge.com.br");
        std::env::set_var("SIENGE_CLIENT_ID", "capexflow");
        std::env::set_var("SIENGE_CLIENT_SECRET", "s3cret");
        std::env::set_var("SIENGE_SCOPE", "financial.read");
        std::env::set_var("SIENGE_TIMEOUT_SECS", "10");

        let config = load_from_env().expect("config");
        assert_eq!(config.base_url, "https://api.sienge.com.br");
        assert_eq!(config.scope.as_deref(), Some("financial.read"));
        assert_eq!(config.timeout_secs, 10);
        assert!(matches!(config.grant, CredentialsGrant::ClientCredentials { .. }));

        clear_sienge_env();
    }

    #[test]
    fn falls_back_to_password_credentials() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_sienge_env();

        std::env::set_var("SIENGE_API_URL", "https://api.sienge.com.br");
        std::env::set_var("SIENGE_USERNAME", "finance@example.com");
        std::env::set_var("SIENGE_PASSWORD", "hunter2");

        let config = load_from_env().expect("config");
        assert!(matches!(config.grant, CredentialsGrant::Password { .. }));
        assert_eq!(config.timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

        clear_sienge_env();
    }

    #[test]
    fn fails_without_credentials() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_sienge_env();

        std::env::set_var("SIENGE_API_URL", "https://api.sienge.com.br");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CapexFlowError::Config(_)));
        assert!(err.to_string().contains("SIENGE_CLIENT_ID"));

        clear_sienge_env();
    }

    #[test]
    fn fails_without_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_sienge_env();

        let err = load_from_env().unwrap_err();
        assert!(err.to_string().contains("SIENGE_API_URL"));
    }

    #[test]
    fn rejects_invalid_timeout() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_sienge_env();

        std::env::set_var("SIENGE_API_URL", "https://api.sienge.com.br");
        std::env::set_var("SIENGE_CLIENT_ID", "capexflow");
        std::env::set_var("SIENGE_CLIENT_SECRET", "s3cret");
        std::env::set_var("SIENGE_TIMEOUT_SECS", "not-a-number");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CapexFlowError::Config(_)));

        clear_sienge_env();
    }

    #[test]
    fn loads_toml_config_file() {
        let toml_content = r#"
base_url = "https://api.sienge.com.br"
timeout_secs = 15

[grant]
type = "client_credentials"
client_id = "capexflow"
client_secret = "s3cret"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config");
        assert_eq!(config.timeout_secs, 15);
        assert!(matches!(config.grant, CredentialsGrant::ClientCredentials { .. }));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn loads_json_config_file() {
        let json_content = r#"{
            "base_url": "https://api.sienge.com.br",
            "grant": {
                "type": "password",
                "username": "finance@example.com",
                "password": "hunter2"
            }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config");
        assert!(matches!(config.grant, CredentialsGrant::Password { .. }));
        assert_eq!(config.timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_missing_file() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(CapexFlowError::Config(_))));
    }

    #[test]
    fn rejects_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(br#"{ "this is": "not valid json"#).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        assert!(load_from_file(Some(path.clone())).is_err());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_unsupported_format() {
        let result = parse_config("anything", &PathBuf::from("config.yaml"));
        assert!(matches!(result, Err(CapexFlowError::Config(_))));
    }
}
