//! Application configuration management.
//!
//! Configuration is stored at `~/.config/sitecache/config.json` and holds the
//! REST endpoint, optionally its API key, and the cache freshness policy.
//! `SITECACHE_SUPABASE_URL` and `SITECACHE_SUPABASE_KEY` override the file.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::auth::CredentialStore;
use crate::cache::policy::{DEFAULT_REFRESH_THRESHOLD_MINUTES, DEFAULT_VALIDITY_MINUTES};
use crate::cache::CachePolicy;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "sitecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_URL: &str = "SITECACHE_SUPABASE_URL";
const ENV_KEY: &str = "SITECACHE_SUPABASE_KEY";

fn default_validity() -> i64 {
    DEFAULT_VALIDITY_MINUTES
}

fn default_refresh_threshold() -> i64 {
    DEFAULT_REFRESH_THRESHOLD_MINUTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    #[serde(default = "default_validity")]
    pub cache_validity_minutes: i64,
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            cache_validity_minutes: DEFAULT_VALIDITY_MINUTES,
            refresh_threshold_minutes: DEFAULT_REFRESH_THRESHOLD_MINUTES,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.supabase_url = Some(url);
        }
        if let Some(key) = lookup(ENV_KEY).filter(|v| !v.is_empty()) {
            self.supabase_key = Some(key);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn project_url(&self) -> Result<&str> {
        self.supabase_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("No project URL configured (set {} or supabase_url)", ENV_URL))
    }

    /// API key from env/config, falling back to the OS keychain.
    pub fn api_key(&self) -> Result<String> {
        if let Some(key) = self.supabase_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        let url = self.project_url()?;
        CredentialStore::find_api_key(url)
            .ok_or_else(|| anyhow!("No API key configured (set {}, supabase_key, or run `sitecache set-key`)", ENV_KEY))
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::from_minutes(self.cache_validity_minutes, self.refresh_threshold_minutes)
    }
}
