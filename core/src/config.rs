//! Client settings.
//!
//! # Design
//! Defaults are overridden by `news-client.toml` in the working directory,
//! then by environment variables. Malformed values are logged and skipped
//! so a bad override never prevents the client from starting.

use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;

pub const SETTINGS_FILE: &str = "news-client.toml";

/// Which form of the search endpoint the transport calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMethod {
    #[default]
    Get,
    Post,
}

impl SearchMethod {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub request_timeout: Duration,
    pub method: SearchMethod,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".into(),
            request_timeout: Duration::from_secs(10),
            method: SearchMethod::Get,
        }
    }
}

/// Defaults, then `news-client.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut ClientSettings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
        Ok(file_cfg) => apply_table(settings, &file_cfg),
        Err(error) => warn!(path = %path.display(), %error, "ignoring malformed settings file"),
    }
}

fn apply_table(settings: &mut ClientSettings, table: &HashMap<String, toml::Value>) {
    if let Some(v) = table.get("api_url").and_then(|v| v.as_str()) {
        settings.api_url = v.to_string();
    }
    if let Some(v) = table.get("request_timeout_ms") {
        match v.as_integer().and_then(|ms| u64::try_from(ms).ok()) {
            Some(ms) => settings.request_timeout = Duration::from_millis(ms),
            None => warn!(value = %v, "ignoring invalid request_timeout_ms"),
        }
    }
    if let Some(v) = table.get("method").and_then(|v| v.as_str()) {
        match SearchMethod::parse(v) {
            Some(method) => settings.method = method,
            None => warn!(value = v, "ignoring unknown search method"),
        }
    }
}

fn apply_env(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("NEWS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(ms) => settings.request_timeout = Duration::from_millis(ms),
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_MS"),
        }
    }

    if let Some(v) = var("APP__SEARCH_METHOD") {
        match SearchMethod::parse(&v) {
            Some(method) => settings.method = method,
            None => warn!(value = %v, "ignoring unknown APP__SEARCH_METHOD"),
        }
    }
}
