//! Updater settings with persistence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Boot-time updater configuration. Read once at startup, never mutated while running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdaterSettings {
    /// Skip every check and download.
    #[serde(default)]
    pub disabled: bool,
    /// Send users to the release page instead of installing silently.
    #[serde(default = "default_manual_only")]
    pub manual_only: bool,
    /// Local development build: always report "no update".
    #[serde(default = "default_dev_mode")]
    pub dev_mode: bool,
    /// GitHub `owner/name` the releases are published under.
    #[serde(default = "default_repository")]
    pub repository: String,
    #[serde(default = "default_true")]
    pub auto_check: bool,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            manual_only: default_manual_only(),
            dev_mode: default_dev_mode(),
            repository: default_repository(),
            auto_check: true,
            check_interval_secs: default_check_interval_secs(),
            startup_delay_secs: default_startup_delay_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl UpdaterSettings {
    pub fn release_page_url(&self) -> String {
        format!("https://github.com/{}/releases/latest", self.repository)
    }

    pub fn releases_api_url(&self) -> String {
        format!("https://api.github.com/repos/{}/releases/latest", self.repository)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Apply `UPDRAFT_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (`UPDRAFT_DISABLE_UPDATES=1`,
    /// `UPDRAFT_UPDATE_INTERVAL_SECS=30`, ...).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(flag) = lookup("UPDRAFT_DISABLE_UPDATES").and_then(|v| parse_flag(&v)) {
            self.disabled = flag;
        }
        if let Some(flag) = lookup("UPDRAFT_MANUAL_ONLY").and_then(|v| parse_flag(&v)) {
            self.manual_only = flag;
        }
        if let Some(flag) = lookup("UPDRAFT_DEV").and_then(|v| parse_flag(&v)) {
            self.dev_mode = flag;
        }
        if let Some(repo) = lookup("UPDRAFT_REPOSITORY").filter(|r| r.contains('/')) {
            self.repository = repo;
        }
        // Short intervals are for testing, so the startup delay shrinks with them
        if let Some(secs) = lookup("UPDRAFT_UPDATE_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.check_interval_secs = secs;
            self.startup_delay_secs = self.startup_delay_secs.min(secs).min(5);
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_manual_only() -> bool {
    cfg!(target_os = "macos")
}

fn default_dev_mode() -> bool {
    cfg!(debug_assertions)
}

fn default_repository() -> String {
    "ggagosh/updraft".to_string()
}

fn default_true() -> bool {
    true
}

fn default_check_interval_secs() -> u64 {
    4 * 60 * 60
}

fn default_startup_delay_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}
