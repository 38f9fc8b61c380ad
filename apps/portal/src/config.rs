use std::{fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub storage_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: client_core::DEFAULT_API_BASE_URL.into(),
            storage_url: "sqlite://./data/portal.db".into(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    storage_url: Option<String>,
    log_filter: Option<String>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment variables. Within
/// each pair of variables the `APP__` form wins.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            if let Some(v) = file_cfg.api_base_url {
                settings.api_base_url = v;
            }
            if let Some(v) = file_cfg.storage_url {
                settings.storage_url = v;
            }
            if let Some(v) = file_cfg.log_filter {
                settings.log_filter = v;
            }
        }
    }

    for key in ["PORTAL_API_URL", "APP__API_BASE_URL"] {
        if let Some(v) = env(key) {
            settings.api_base_url = v;
        }
    }
    for key in ["PORTAL_STORAGE_URL", "APP__STORAGE_URL"] {
        if let Some(v) = env(key) {
            settings.storage_url = v;
        }
    }
    for key in ["PORTAL_LOG", "APP__LOG_FILTER"] {
        if let Some(v) = env(key) {
            settings.log_filter = v;
        }
    }

    settings
}

pub fn prepare_api_base_url(raw_base_url: &str) -> anyhow::Result<String> {
    let base_url = raw_base_url.trim().trim_end_matches('/');
    let parsed =
        Url::parse(base_url).with_context(|| format!("invalid api base url '{raw_base_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("api base url must use http or https, got '{raw_base_url}'");
    }
    Ok(base_url.to_string())
}

pub fn prepare_storage_url(raw_storage_url: &str) -> String {
    let raw_storage_url = raw_storage_url.trim();

    if raw_storage_url.is_empty() {
        return Settings::default().storage_url;
    }

    if raw_storage_url.starts_with("sqlite::memory:") || raw_storage_url.contains("://") {
        return raw_storage_url.to_string();
    }

    if let Some(path) = raw_storage_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_storage_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
