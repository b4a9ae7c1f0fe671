use std::{collections::HashMap, fs};

use serde::Deserialize;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub max_request_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8787".into(),
            database_url: "sqlite://./data/tasks.db".into(),
            max_request_bytes: 256 * 1024,
        }
    }
}

/// Defaults, then `server.toml`, then environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub(crate) fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unparsable settings file");
        return;
    };

    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.server_bind = v.to_string();
    }
    if let Some(v) = file_cfg.get("database_url").and_then(toml::Value::as_str) {
        settings.database_url = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("max_request_bytes")
        .and_then(toml::Value::as_integer)
        .and_then(|v| usize::try_from(v).ok())
    {
        settings.max_request_bytes = v;
    }
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__MAX_REQUEST_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_request_bytes = parsed;
        }
    }
}

/// Turns a configured database location into a SQLite URL. Plain paths and
/// `sqlite:` paths become `sqlite://` URLs; empty input means the default.
/// Parent directories are created by [`storage::Storage::new`].
pub fn resolve_database_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return Settings::default().database_url;
    }
    if raw.contains("://") || raw.starts_with("sqlite::memory:") {
        return raw.to_string();
    }

    let path = raw.strip_prefix("sqlite:").unwrap_or(raw).replace('\\', "/");
    format!("sqlite://{path}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
