use super::{normalize_database_url, prepare_database_url, settings_from, Settings};

use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_match_the_published_invitation() {
    let settings = settings_from(None, env_of(&[]));
    assert_eq!(settings.groom_name, "Wira");
    assert_eq!(settings.bride_name, "Sofi");
    assert_eq!(settings.event_date_label, "26 September 2025");
    assert!(settings.animations_enabled);
    assert!(settings.admin_password.is_none());
}

#[test]
fn file_values_override_defaults_and_env_overrides_file() {
    let file = r#"
        bind_addr = "0.0.0.0:9000"
        admin_session_ttl_minutes = 30
        animations_enabled = false
        event_date_label = "27 September 2025"
    "#;
    let settings = settings_from(
        Some(file),
        env_of(&[
            ("APP__BIND_ADDR", "0.0.0.0:9100"),
            ("APP__ADMIN_PASSWORD", "rahasia"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]),
    );

    assert_eq!(settings.bind_addr, "0.0.0.0:9100");
    assert_eq!(settings.admin_session_ttl_minutes, 30);
    assert!(!settings.animations_enabled);
    assert_eq!(settings.event_date_label, "27 September 2025");
    assert_eq!(settings.admin_password.as_deref(), Some("rahasia"));
    assert_eq!(settings.database_url, "sqlite::memory:");
}

#[test]
fn malformed_values_keep_defaults() {
    let settings = settings_from(
        Some("this is not toml ==="),
        env_of(&[
            ("APP__GUEST_SESSION_IDLE_MINUTES", "soon"),
            ("APP__ADMIN_PASSWORD", ""),
        ]),
    );
    assert_eq!(
        settings.guest_session_idle_minutes,
        Settings::default().guest_session_idle_minutes
    );
    assert!(settings.admin_password.is_none());
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("   "),
        Settings::default().database_url
    );
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn keeps_windows_absolute_path_with_single_sqlite_colon() {
    assert_eq!(
        normalize_database_url("sqlite:C:\\Users\\alice\\test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
    assert_eq!(
        normalize_database_url("C:\\Users\\alice\\test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite://C:/Users/alice/test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn creates_parent_dir_for_sqlite_url() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(temp_root.path().join("data").exists());
}

#[tokio::test]
async fn prepared_database_url_creates_openable_sqlite_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("server.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    let storage = storage::Storage::new(&prepared).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}
