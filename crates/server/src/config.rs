use std::{fs, path::PathBuf};

use anyhow::Context;
use tracing::warn;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub public_url: String,
    pub admin_password: Option<String>,
    pub admin_session_ttl_minutes: i64,
    pub guest_session_idle_minutes: u64,
    pub groom_name: String,
    pub bride_name: String,
    pub event_date_label: String,
    pub animations_enabled: bool,
    pub assets_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/invitation.db".into(),
            public_url: "http://127.0.0.1:8080".into(),
            admin_password: None,
            admin_session_ttl_minutes: 720,
            guest_session_idle_minutes: 120,
            groom_name: invitation_flow::DEFAULT_GROOM_NAME.into(),
            bride_name: invitation_flow::DEFAULT_BRIDE_NAME.into(),
            event_date_label: invitation_flow::DEFAULT_DATE_LABEL.into(),
            animations_enabled: true,
            assets_dir: "./assets".into(),
        }
    }
}

const KEYS: &[&str] = &[
    "bind_addr",
    "database_url",
    "public_url",
    "admin_password",
    "admin_session_ttl_minutes",
    "guest_session_idle_minutes",
    "groom_name",
    "bride_name",
    "event_date_label",
    "animations_enabled",
    "assets_dir",
];

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml` values, then environment overrides.
pub fn settings_from(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match raw.parse::<toml::Table>() {
            Ok(table) => {
                for (key, value) in table {
                    let value = match value {
                        toml::Value::String(text) => text,
                        other => other.to_string(),
                    };
                    apply(&mut settings, &key, value);
                }
            }
            Err(error) => warn!(%error, file = SETTINGS_FILE, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    for key in KEYS {
        if let Some(v) = env(&format!("APP__{}", key.to_ascii_uppercase())) {
            apply(&mut settings, key, v);
        }
    }

    settings
}

fn apply(settings: &mut Settings, key: &str, value: String) {
    match key {
        "bind_addr" => settings.bind_addr = value,
        "database_url" => settings.database_url = value,
        "public_url" => settings.public_url = value,
        "admin_password" => {
            settings.admin_password = Some(value).filter(|password| !password.is_empty())
        }
        "admin_session_ttl_minutes" => match value.trim().parse() {
            Ok(parsed) => settings.admin_session_ttl_minutes = parsed,
            Err(_) => warn!(key, %value, "expected whole minutes; keeping default"),
        },
        "guest_session_idle_minutes" => match value.trim().parse() {
            Ok(parsed) => settings.guest_session_idle_minutes = parsed,
            Err(_) => warn!(key, %value, "expected whole minutes; keeping default"),
        },
        "groom_name" => settings.groom_name = value,
        "bride_name" => settings.bride_name = value,
        "event_date_label" => settings.event_date_label = value,
        "animations_enabled" => match value.trim().parse() {
            Ok(parsed) => settings.animations_enabled = parsed,
            Err(_) => warn!(key, %value, "expected true or false; keeping default"),
        },
        "assets_dir" => settings.assets_dir = value,
        _ => warn!(key, "unknown setting ignored"),
    }
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }
    if raw_database_url.starts_with("sqlite::memory:") {
        return raw_database_url.to_string();
    }

    let path = if let Some(path) = raw_database_url.strip_prefix("sqlite://") {
        path
    } else if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        path
    } else if raw_database_url.contains("://") {
        return raw_database_url.to_string();
    } else {
        raw_database_url
    };

    let path = path.replace('\\', "/");
    if has_drive_letter(&path) {
        format!("sqlite:{path}")
    } else {
        format!("sqlite://{path}")
    }
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if !database_url.starts_with("sqlite:") || database_url.starts_with("sqlite::memory:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
