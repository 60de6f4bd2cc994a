use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::{
    geolocation::DEFAULT_TIMEOUT_MS,
    markers::DEFAULT_MAX_MARKERS,
    model::{Coordinates, DisplayUnit},
    provider::{DEFAULT_FORECAST_DAYS, ProviderId, clamp_forecast_days, dashboard},
};

pub const BACKEND_URL_ENV: &str = "WEATHER_DASH_BACKEND_URL";
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Configuration for a single provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional default provider id, "dashboard" or "weatherapi".
    pub default_provider: Option<String>,

    pub unit: DisplayUnit,

    pub forecast_days: u8,

    pub geolocation_timeout_ms: u64,

    pub max_forecast_markers: usize,

    /// Fixed position used instead of an IP lookup.
    pub location: Option<Coordinates>,

    /// Example TOML:
    /// [providers.dashboard]
    /// base_url = "http://localhost:8000"
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: None,
            unit: DisplayUnit::default(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            geolocation_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_forecast_markers: DEFAULT_MAX_MARKERS,
            location: None,
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    /// Without one configured the dashboard backend is used.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => Ok(ProviderId::Dashboard),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn forecast_days(&self) -> u8 {
        clamp_forecast_days(self.forecast_days)
    }

    pub fn backend_url(&self) -> &str {
        self.provider_config(ProviderId::Dashboard)
            .and_then(|p| p.base_url.as_deref())
            .unwrap_or(dashboard::DEFAULT_BASE_URL)
    }

    pub fn set_backend_url(&mut self, url: String) {
        self.providers
            .entry(ProviderId::Dashboard.as_str().to_string())
            .or_default()
            .base_url = Some(url);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.set_backend_url(url);
        }
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.providers
                .entry(ProviderId::WeatherApi.as_str().to_string())
                .or_default()
                .api_key = Some(key);
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dash", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace a provider API key and optionally set default provider.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().api_key = Some(api_key);

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.api_key.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        match provider_id {
            ProviderId::Dashboard => true,
            ProviderId::WeatherApi => self.provider_api_key(provider_id).is_some(),
        }
    }
}
