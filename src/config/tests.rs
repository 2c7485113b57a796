use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use super::settings::Settings;
use super::{load_config, load_config_from};

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.broker.queue_capacity, 100);
    assert_eq!(settings.broker.subscriber_buffer, 16);
    assert_eq!(settings.log.level, "info");
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("absent");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg, Settings::default());
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let toml = r#"
        [broker]
        queue_capacity = 8

        [log]
        level = "debug"
    "#;
    fs::write(tmp.path().join("chat.toml"), toml).expect("write config file");

    let path = tmp.path().join("chat");
    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.broker.queue_capacity, 8);
    assert_eq!(cfg.broker.subscriber_buffer, 16);
    assert_eq!(cfg.log.level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    fs::write(
        tmp.path().join("chat.toml"),
        "[broker]\nqueue_capacity = 8\nsubscriber_buffer = 4\n",
    )
    .expect("write config file");
    let path = tmp.path().join("chat");

    temp_env::with_vars(
        [
            ("CHATCORE__BROKER__QUEUE_CAPACITY", Some("42")),
            ("CHATCORE__LOG__LEVEL", Some("warn")),
        ],
        || {
            let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
            assert_eq!(cfg.broker.queue_capacity, 42);
            assert_eq!(cfg.broker.subscriber_buffer, 4);
            assert_eq!(cfg.log.level, "warn");
        },
    );
}

#[test]
#[serial]
fn test_load_config_without_file() {
    temp_env::with_var("CHATCORE__BROKER__SUBSCRIBER_BUFFER", Some("3"), || {
        let cfg = load_config().expect("load_config failed");
        assert_eq!(cfg.broker.subscriber_buffer, 3);
    });
}
