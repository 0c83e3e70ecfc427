use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use tracing::warn;
use url::Url;

use crate::ControllerOptions;

pub const DEFAULT_SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base: String,
    pub page_size: u32,
    pub message_ttl_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".into(),
            page_size: 10,
            message_ttl_ms: 3500,
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            page_size: self.page_size,
            message_ttl: Duration::from_millis(self.message_ttl_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn set_api_base(&mut self, raw: &str) -> anyhow::Result<()> {
        self.api_base = normalize_api_base(raw)?;
        Ok(())
    }
}

/// Defaults, then `client.toml` in the working directory, then the environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Err(err) = apply_file_overrides(&mut settings, &raw) {
            warn!(path = %path.display(), "config: ignoring settings file: {err:#}");
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)
        .context("settings file is not valid toml")?;

    let value_of = |key: &str| {
        file_cfg.get(key).map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };

    if let Some(v) = value_of("api_base") {
        override_api_base(settings, "api_base", &v);
    }
    if let Some(v) = value_of("page_size") {
        override_page_size(settings, "page_size", &v);
    }
    if let Some(v) = value_of("message_ttl_ms") {
        override_number(&mut settings.message_ttl_ms, "message_ttl_ms", &v);
    }
    if let Some(v) = value_of("request_timeout_secs") {
        override_number(&mut settings.request_timeout_secs, "request_timeout_secs", &v);
    }

    Ok(())
}

pub fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("API_BASE") {
        override_api_base(settings, "API_BASE", &v);
    }
    if let Some(v) = lookup("APP__API_BASE") {
        override_api_base(settings, "APP__API_BASE", &v);
    }
    if let Some(v) = lookup("APP__PAGE_SIZE") {
        override_page_size(settings, "APP__PAGE_SIZE", &v);
    }
    if let Some(v) = lookup("APP__MESSAGE_TTL_MS") {
        override_number(&mut settings.message_ttl_ms, "APP__MESSAGE_TTL_MS", &v);
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        override_number(
            &mut settings.request_timeout_secs,
            "APP__REQUEST_TIMEOUT_SECS",
            &v,
        );
    }
}

pub fn normalize_api_base(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("api base url must start with http:// or https://"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn override_api_base(settings: &mut ClientSettings, source: &str, raw: &str) {
    if let Err(err) = settings.set_api_base(raw) {
        warn!(source, "config: keeping api base {}: {err:#}", settings.api_base);
    }
}

fn override_page_size(settings: &mut ClientSettings, source: &str, raw: &str) {
    match raw.trim().parse::<u32>() {
        Ok(0) => warn!(source, "config: page size must be positive, ignoring 0"),
        Ok(size) => settings.page_size = size,
        Err(err) => warn!(source, value = raw, "config: invalid page size: {err}"),
    }
}

fn override_number(target: &mut u64, source: &str, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(parsed) => *target = parsed,
        Err(err) => warn!(source, value = raw, "config: invalid number: {err}"),
    }
}
