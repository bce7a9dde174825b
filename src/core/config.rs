use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted, in order, when the config file has no key.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Left empty to fall back to the environment.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// 0 disables the timeout.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_initial_reach")]
    pub initial_reach: f64,

    #[serde(default = "default_initial_roi")]
    pub initial_roi: f64,

    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_max_output_tokens() -> u32 {
    80
}
fn default_temperature() -> f32 {
    0.8
}
fn default_initial_reach() -> f64 {
    1.2
}
fn default_initial_roi() -> f64 {
    4.2
}
fn default_min_delay_ms() -> u64 {
    2000
}
fn default_max_delay_ms() -> u64 {
    4000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key: String::new(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: 0,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            initial_reach: default_initial_reach(),
            initial_roi: default_initial_roi(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl MetricsConfig {
    pub fn delay_window(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

/// Root data directory: `~/.contentflow`.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".contentflow")
}

pub fn default_config_path() -> PathBuf {
    data_dir().join("config.toml")
}

impl DashboardConfig {
    pub async fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            info!(
                "No config found at {}, using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(config_path)
            .await
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let mut config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))?;
        config.normalize();
        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    fn normalize(&mut self) {
        let metrics = &mut self.metrics;
        if metrics.max_delay_ms <= metrics.min_delay_ms {
            warn!(
                "metrics.max_delay_ms ({}) must exceed min_delay_ms ({}), adjusting",
                metrics.max_delay_ms, metrics.min_delay_ms
            );
            metrics.max_delay_ms = metrics.min_delay_ms + 1;
        }
    }

    /// Fills an empty `llm.api_key` from the first variable that `lookup`
    /// resolves. Lookup is a parameter so callers decide where secrets come from.
    pub fn resolve_api_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.llm.api_key.is_empty() {
            return;
        }
        for var in API_KEY_ENV_VARS {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                self.llm.api_key = value.trim().to_string();
                return;
            }
        }
        warn!("No Gemini API key configured; insight requests will fall back.");
    }

    /// TOML rendering with the API key masked, for `contentflow config`.
    pub fn redacted_toml(&self) -> Result<String> {
        let mut copy = self.clone();
        if !copy.llm.api_key.is_empty() {
            copy.llm.api_key = "********".to_string();
        }
        Ok(toml::to_string_pretty(&copy)?)
    }
}
