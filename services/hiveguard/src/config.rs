//! Configuration types for the hiveguard service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default = "default_prefs_path")]
    pub prefs_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            polling: PollingConfig::default(),
            dashboard: DashboardConfig::default(),
            prefs_path: default_prefs_path(),
        }
    }
}

/// Where the beehive backend API lives and how much history to pull
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_history_length")]
    pub history_length: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            history_length: default_history_length(),
        }
    }
}

/// Polling cadence and failure handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_refresh_rate_ms")]
    pub refresh_rate_ms: u64,
    #[serde(default = "default_max_errors")]
    pub max_errors: u32,
    #[serde(default = "default_resume_delay_ms")]
    pub resume_delay_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate_ms(),
            max_errors: default_max_errors(),
            resume_delay_ms: default_resume_delay_ms(),
        }
    }
}

/// Local web dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_toast_history_size")]
    pub toast_history_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            toast_history_size: default_toast_history_size(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_history_length() -> usize {
    30
}

fn default_refresh_rate_ms() -> u64 {
    5_000
}

fn default_max_errors() -> u32 {
    3
}

fn default_resume_delay_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    8090
}

fn default_toast_history_size() -> usize {
    100
}

fn default_prefs_path() -> PathBuf {
    PathBuf::from("hiveguard_prefs.json")
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::HiveGuardError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
