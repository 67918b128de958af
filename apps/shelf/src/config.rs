use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shelf_core::BehaviorSettings;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub base_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub search_debounce_ms: u64,
    pub probe_timeout_ms: u64,
    pub notification_ttl_ms: u64,
    pub preference_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/shelf.db".into(),
            base_url: None,
            catalog_path: None,
            search_debounce_ms: 100,
            probe_timeout_ms: 8_000,
            notification_ttl_ms: 4_000,
            preference_key: "theme".into(),
        }
    }
}

/// Keys accepted in `shelf.toml`. Anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    base_url: Option<String>,
    catalog_path: Option<PathBuf>,
    search_debounce_ms: Option<u64>,
    probe_timeout_ms: Option<u64>,
    notification_ttl_ms: Option<u64>,
    preference_key: Option<String>,
}

impl Settings {
    pub fn behavior(&self) -> anyhow::Result<BehaviorSettings> {
        let base_url = match self.base_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                Some(Url::parse(raw).with_context(|| format!("invalid base url '{raw}'"))?)
            }
            _ => None,
        };
        Ok(BehaviorSettings {
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            notification_ttl: Duration::from_millis(self.notification_ttl_ms),
            preference_key: self.preference_key.clone(),
            base_url,
        }
        .normalized())
    }

    fn merge_file(&mut self, file: FileSettings) {
        if let Some(v) = file.database_url.filter(|v| !v.trim().is_empty()) {
            self.database_url = v;
        }
        if let Some(v) = file.base_url {
            self.base_url = Some(v);
        }
        if let Some(v) = file.catalog_path {
            self.catalog_path = Some(v);
        }
        if let Some(v) = file.search_debounce_ms {
            self.search_debounce_ms = v;
        }
        if let Some(v) = file.probe_timeout_ms {
            self.probe_timeout_ms = v;
        }
        if let Some(v) = file.notification_ttl_ms {
            self.notification_ttl_ms = v;
        }
        if let Some(v) = file.preference_key {
            self.preference_key = v;
        }
    }

    fn merge_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("APP__DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database_url = v;
        }
        if let Some(v) = var("APP__BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = var("APP__CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("APP__SEARCH_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.search_debounce_ms = v;
        }
        if let Some(v) = var("APP__PROBE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.probe_timeout_ms = v;
        }
        if let Some(v) = var("APP__NOTIFICATION_TTL_MS").and_then(|v| v.parse().ok()) {
            self.notification_ttl_ms = v;
        }
        if let Some(v) = var("APP__PREFERENCE_KEY") {
            self.preference_key = v;
        }
    }
}

/// Defaults, then the optional config file, then `APP__*` environment
/// overrides.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => settings.merge_file(file_cfg),
            Err(error) => tracing::warn!(
                path = %config_path.display(),
                %error,
                "ignoring unparseable config file"
            ),
        },
        Err(_) => tracing::debug!(path = %config_path.display(), "no config file; using defaults"),
    }

    settings.merge_env(|key| std::env::var(key).ok());
    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
