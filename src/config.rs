//! Application configuration.

use crate::consts;
use crate::environment::{Credentials, Region};
use crate::polling::PollOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use std::{fs, path::Path};

pub const CLIENT_ID_ENV: &str = "PDF_SERVICES_CLIENT_ID";
pub const ACCESS_TOKEN_ENV: &str = "PDF_SERVICES_ACCESS_TOKEN";

/// Get the path to the config file: `./pdf-jobs.json` when it exists, otherwise `~/.pdf-jobs/config.json`.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let local_config_path = std::env::current_dir()?.join("pdf-jobs.json");
    if local_config_path.exists() {
        return Ok(local_config_path);
    }

    let home_path = home::home_dir().ok_or(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "Home directory not found",
    ))?;
    Ok(home_path.join(".pdf-jobs").join("config.json"))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Region
    #[serde(default)]
    pub region: Region,

    /// Overrides the region's base URL when non-empty.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Poll delay when the server gives no hint.
    #[serde(default = "default_retry_interval_secs")]
    pub default_retry_interval_secs: u64,

    /// Give up on a job after this long. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_timeout_secs: Option<u64>,
}

fn default_connect_timeout_ms() -> u64 {
    consts::client::CONNECT_TIMEOUT_MS
}

fn default_read_timeout_ms() -> u64 {
    consts::client::READ_TIMEOUT_MS
}

fn default_retry_interval_secs() -> u64 {
    consts::polling::DEFAULT_RETRY_INTERVAL_SECS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            region: Region::default(),
            base_url: String::new(),
            client_id: String::new(),
            access_token: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            default_retry_interval_secs: default_retry_interval_secs(),
            job_timeout_secs: None,
        }
    }
}

/// Everything needed to build a client and poll its jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub poll: PollOptions,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Config::default().with_base(base_url.into(), credentials)
    }
}

impl Config {
    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Like [`Config::load_from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, std::io::Error> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_file(path)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Remove the configuration file. A missing file is not an error.
    pub fn clear(path: &Path) -> std::io::Result<()> {
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(path)
    }

    /// Overrides credentials from `PDF_SERVICES_CLIENT_ID` / `PDF_SERVICES_ACCESS_TOKEN`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(CLIENT_ID_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, client_id: Option<String>, access_token: Option<String>) {
        if let Some(id) = client_id.filter(|v| !v.trim().is_empty()) {
            self.client_id = id.trim().to_string();
        }
        if let Some(token) = access_token.filter(|v| !v.trim().is_empty()) {
            self.access_token = token.trim().to_string();
        }
    }

    pub fn base_url(&self) -> String {
        if self.base_url.trim().is_empty() {
            self.region.base_url()
        } else {
            self.base_url.trim().trim_end_matches('/').to_string()
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.client_id.clone(), self.access_token.clone())
    }

    pub fn client_config(&self) -> ClientConfig {
        self.with_base(self.base_url(), self.credentials())
    }

    fn with_base(&self, base_url: String, credentials: Credentials) -> ClientConfig {
        ClientConfig {
            base_url,
            credentials,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            poll: PollOptions {
                default_retry_interval: Duration::from_secs(self.default_retry_interval_secs),
                timeout: self.job_timeout_secs.map(Duration::from_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Helper function to create a test configuration.
    fn get_config() -> Config {
        Config {
            region: Region::Eu,
            client_id: "test_client_id".to_string(),
            access_token: "test_token".to_string(),
            job_timeout_secs: Some(600),
            ..Config::default()
        }
    }

    #[test]
    // Loading a saved configuration file should return the same configuration.
    fn test_load_recovers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = get_config();
        config.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    // Saving a configuration should create directories if they don't exist.
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("config.json");
        let result = get_config().save(&path);

        assert!(result.is_ok(), "Failed to save config");
        assert!(path.parent().unwrap().exists(), "Parent directory does not exist");
    }

    #[test]
    // Loading an invalid JSON file should return an error.
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid_config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "invalid json").unwrap();

        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    // Missing fields take their defaults and unknown fields are ignored.
    fn test_load_partial_config_with_additional_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{ "client_id": "abc", "extra_field": "value" }}"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.region, Region::Us);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.read_timeout_ms, 40_000);
        assert_eq!(config.default_retry_interval_secs, 2);
        assert_eq!(config.job_timeout_secs, None);
    }

    #[test]
    // A missing file yields defaults; clearing removes an existing file.
    fn test_load_or_default_and_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

        get_config().save(&path).unwrap();
        Config::clear(&path).unwrap();
        assert!(!path.exists(), "Config file was not removed");
        Config::clear(&path).unwrap();
    }

    #[test]
    // Non-empty environment values replace file credentials.
    fn test_overrides_replace_credentials() {
        let mut config = get_config();
        config.apply_overrides(Some(" env_id ".to_string()), Some("".to_string()));
        assert_eq!(config.client_id, "env_id");
        assert_eq!(config.access_token, "test_token");
    }

    #[test]
    // The explicit base URL wins over the region.
    fn test_client_config_resolution() {
        let mut config = get_config();
        assert_eq!(config.client_config().base_url, Region::Eu.base_url());

        config.base_url = "http://127.0.0.1:9000/".to_string();
        let client_config = config.client_config();
        assert_eq!(client_config.base_url, "http://127.0.0.1:9000");
        assert_eq!(client_config.connect_timeout, Duration::from_secs(10));
        assert_eq!(client_config.poll.default_retry_interval, Duration::from_secs(2));
        assert_eq!(client_config.poll.timeout, Some(Duration::from_secs(600)));
        assert_eq!(client_config.credentials.client_id, "test_client_id");
    }
}
