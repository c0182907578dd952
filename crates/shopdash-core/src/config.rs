//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, where tokens are kept, the request timeout and the
//! last used username.
//!
//! Configuration is stored at `~/.config/shopdash/config.json`. Environment
//! variables (`SHOPDASH_API_URL`, `SHOPDASH_TOKEN_STORAGE`, `SHOPDASH_USERNAME`)
//! override the file for a single run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, FileBackend, KeyringBackend, MemoryBackend};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "shopdash";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_URL: &str = "https://sb.tamimulahsan.com/api/";

/// 30s allows for slow analytics queries while failing fast enough for the UI
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "SHOPDASH_API_URL";
pub const ENV_TOKEN_STORAGE: &str = "SHOPDASH_TOKEN_STORAGE";
pub const ENV_USERNAME: &str = "SHOPDASH_USERNAME";
pub const ENV_PASSWORD: &str = "SHOPDASH_PASSWORD";

/// Where session tokens are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for TokenStorage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(TokenStorage::File),
            "keyring" | "keychain" => Ok(TokenStorage::Keyring),
            "memory" => Ok(TokenStorage::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown token storage {:?} (expected file, keyring or memory)",
                other
            )),
        }
    }
}

impl fmt::Display for TokenStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenStorage::File => "file",
            TokenStorage::Keyring => "keyring",
            TokenStorage::Memory => "memory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub last_username: Option<String>,
    #[serde(default)]
    pub token_storage: TokenStorage,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_url(),
            last_username: None,
            token_storage: TokenStorage::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Record the last username in the saved config. Runtime overrides
    /// (environment, command-line flags) stay out of the file.
    pub fn remember_username(username: &str) -> Result<()> {
        Self::remember_username_at(&Self::config_path()?, username)
    }

    pub fn remember_username_at(path: &Path, username: &str) -> Result<()> {
        let mut saved = Self::load_from(path)?;
        saved.last_username = Some(username.to_string());
        saved.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `SHOPDASH_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(storage) = lookup(ENV_TOKEN_STORAGE).filter(|v| !v.trim().is_empty()) {
            self.token_storage = storage
                .parse()
                .with_context(|| format!("Invalid {}", ENV_TOKEN_STORAGE))?;
        }
        if let Some(username) = lookup(ENV_USERNAME).filter(|v| !v.trim().is_empty()) {
            self.last_username = Some(username.trim().to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Filesystem-safe name for the API origin, e.g. `shop.example.com_8443`.
    /// Tokens are scoped to it so two backends never share a session.
    pub fn origin_slug(&self) -> Result<String> {
        let url = Url::parse(self.api_base_url.trim())
            .with_context(|| format!("Invalid API URL {}", self.api_base_url))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("API URL has no host: {}", self.api_base_url))?;

        let mut slug: String = host
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        if let Some(port) = url.port() {
            slug.push_str(&format!("_{}", port));
        }
        Ok(slug)
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Per-origin directory holding `session.json`
    pub fn session_dir(&self) -> Result<PathBuf> {
        Ok(Self::cache_dir()?.join(self.origin_slug()?))
    }

    pub fn build_store(&self) -> Result<CredentialStore> {
        let store = match self.token_storage {
            TokenStorage::File => CredentialStore::new(FileBackend::new(self.session_dir()?)),
            TokenStorage::Keyring => CredentialStore::new(KeyringBackend::new(self.origin_slug()?)),
            TokenStorage::Memory => CredentialStore::new(MemoryBackend::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"last_username": "admin"}"#).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.token_storage, TokenStorage::File);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.last_username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config {
            api_base_url: "http://localhost:8000/api/".to_string(),
            token_storage: TokenStorage::Memory,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
        assert_eq!(
            Config::load_from(&dir.path().join("absent.json")).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_remember_username_keeps_saved_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        Config::default().save_to(&path).unwrap();

        Config::remember_username_at(&path, "admin").unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.token_storage, TokenStorage::File);
        assert_eq!(saved.last_username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, " http://127.0.0.1:8000/api/ "),
            (ENV_TOKEN_STORAGE, "Keyring"),
            (ENV_USERNAME, "admin"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000/api/");
        assert_eq!(config.token_storage, TokenStorage::Keyring);
        assert_eq!(config.last_username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_bad_storage_override_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| (k == ENV_TOKEN_STORAGE).then(|| "floppy".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_origin_slug() {
        let mut config = Config::default();
        assert_eq!(config.origin_slug().unwrap(), "sb.tamimulahsan.com");

        config.api_base_url = "http://127.0.0.1:8000/api/".to_string();
        assert_eq!(config.origin_slug().unwrap(), "127.0.0.1_8000");

        config.api_base_url = "not a url".to_string();
        assert!(config.origin_slug().is_err());
    }

    #[test]
    fn test_memory_store_from_config() {
        let config = Config {
            token_storage: TokenStorage::Memory,
            ..Default::default()
        };
        assert_eq!(config.build_store().unwrap().backend_name(), "memory");
    }
}
