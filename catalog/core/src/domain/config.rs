// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog Configuration
//!
//! Where the data file lives, how long fetched snapshots stay fresh, and the
//! write credential. The credential only ever comes from the environment; its
//! absence is a supported state that keeps every write local.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "AGENT_HUB_CONFIG_PATH";
pub const TOKEN_ENV: &str = "AGENT_HUB_GITHUB_TOKEN";
pub const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Write credential for the remote repository. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(***)")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the contents API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Repository owner (user or organization)
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Repository name
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Path of the JSON data file inside the repository
    #[serde(default = "default_path")]
    pub path: String,

    /// Branch to read and commit to (repository default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(skip)]
    pub token: Option<SecretToken>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: default_owner(),
            repo: default_repo(),
            path: default_path(),
            branch: None,
            commit_message: default_commit_message(),
            timeout: default_timeout(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched snapshot is served without going back to the remote
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: default_ttl() }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_owner() -> String {
    "alisyos".to_string()
}

fn default_repo() -> String {
    "hub2".to_string()
}

fn default_path() -> String {
    "public/data/agents.json".to_string()
}

fn default_commit_message() -> String {
    "Update agents data".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_ttl() -> Duration {
    Duration::from_secs(5 * 60)
}

impl CatalogConfig {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Look for a configuration file in the standard locations.
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./agent-hub.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".agent-hub").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/agent-hub/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load from an explicit path (must exist), else discover, else defaults.
    /// Environment overrides are applied in every case.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            Self::from_yaml_file(path)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(TOKEN_ENV).or_else(|| non_empty(FALLBACK_TOKEN_ENV)) {
            self.remote.token = Some(SecretToken::new(token.trim()));
        }
        if let Some(owner) = non_empty("AGENT_HUB_REPO_OWNER") {
            tracing::info!("Environment override: AGENT_HUB_REPO_OWNER={}", owner);
            self.remote.owner = owner;
        }
        if let Some(repo) = non_empty("AGENT_HUB_REPO_NAME") {
            tracing::info!("Environment override: AGENT_HUB_REPO_NAME={}", repo);
            self.remote.repo = repo;
        }
        if let Some(path) = non_empty("AGENT_HUB_DATA_PATH") {
            tracing::info!("Environment override: AGENT_HUB_DATA_PATH={}", path);
            self.remote.path = path;
        }
        if let Some(ttl) = non_empty("AGENT_HUB_CACHE_TTL") {
            match humantime_serde::re::humantime::parse_duration(&ttl) {
                Ok(parsed) => {
                    tracing::info!("Environment override: AGENT_HUB_CACHE_TTL={}", ttl);
                    self.cache.ttl = parsed;
                }
                Err(e) => {
                    tracing::warn!(
                        "Invalid value for AGENT_HUB_CACHE_TTL: '{}' ({}). Ignoring.",
                        ttl,
                        e
                    );
                }
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.remote.owner.trim().is_empty() {
            anyhow::bail!("remote.owner cannot be empty");
        }
        if self.remote.repo.trim().is_empty() {
            anyhow::bail!("remote.repo cannot be empty");
        }
        if self.remote.path.trim().is_empty() {
            anyhow::bail!("remote.path cannot be empty");
        }
        match url::Url::parse(&self.remote.api_base) {
            Ok(url) if url.has_host() => {}
            _ => anyhow::bail!(
                "remote.api_base must be an absolute URL, got '{}'",
                self.remote.api_base
            ),
        }
        if self.cache.ttl.is_zero() {
            anyhow::bail!("cache.ttl must be greater than zero");
        }
        Ok(())
    }

    pub fn has_write_token(&self) -> bool {
        self.remote.token.is_some()
    }
}
