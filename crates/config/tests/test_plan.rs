//! Test plan for the `medcab-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and validation behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use medcab_config::{load, ApiConfig, AppConfig, AuthConfig, StorageConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "MEDCAB_CONFIG",
    "MEDCAB__API__BASE_URL",
    "MEDCAB__API__REQUEST_TIMEOUT_SECONDS",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.vars.push((key.to_string(), std::env::var(key).ok()));
            std::env::remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.api.base_url, defaults.api.base_url);
    assert_eq!(
        config.api.request_timeout_seconds,
        defaults.api.request_timeout_seconds
    );
    assert_eq!(config.storage.token_key, "token");
    assert!(config.storage.directory.is_none());
    assert_eq!(config.auth.login_path, defaults.auth.login_path);
    assert_eq!(config.auth.profile_path, defaults.auth.profile_path);
    assert_eq!(config.auth.expiry_leeway_seconds, 0);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "medcab.toml",
        r#"
        [api]
        base_url = "https://first.example/api"
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/medcab.toml",
        r#"
        [api]
        base_url = "https://second.example/api"
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.api.base_url, "https://first.example/api");
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "medcab.toml",
        r#"
        [api]
        request_timeout_seconds = 5

        [storage]
        directory = "/var/lib/medcab"
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.api.request_timeout_seconds, 5);
    assert_eq!(config.api.base_url, defaults.api.base_url);
    assert_eq!(config.storage.directory.as_deref(), Some("/var/lib/medcab"));
    assert_eq!(config.storage.token_key, defaults.storage.token_key);
    assert_eq!(config.auth.register_path, defaults.auth.register_path);
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [auth]
        expiry_leeway_seconds = 30
        "#,
    );
    ctx.set_var(
        "MEDCAB_CONFIG",
        temp_dir.path().join("elsewhere/custom.toml").display().to_string(),
    );

    let config = load().expect("configuration load should read MEDCAB_CONFIG");
    assert_eq!(config.auth.expiry_leeway_seconds, 30);
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "medcab.toml",
        r#"
        [api]
        base_url = "https://file.example/api"
        "#,
    );

    ctx.set_var("MEDCAB__API__BASE_URL", "https://env.example/api");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.api.base_url, "https://env.example/api");
}

#[test]
#[serial]
fn load_restores_default_timeout_when_zero() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    ctx.set_var("MEDCAB__API__REQUEST_TIMEOUT_SECONDS", "0");

    let config = load().expect("configuration load should succeed with zero timeout");
    assert_eq!(
        config.api.request_timeout_seconds,
        ApiConfig::default().request_timeout_seconds
    );
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "medcab.toml",
        r#"
        [api]
        request_timeout_seconds = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration")
            || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn api_endpoint_joins_with_single_separator() {
    let api = ApiConfig {
        base_url: "https://practice.example/api/".into(),
        ..ApiConfig::default()
    };

    assert_eq!(api.endpoint("stats/global/"), "https://practice.example/api/stats/global/");
    assert_eq!(api.endpoint("/notes/4/"), "https://practice.example/api/notes/4/");
}

#[test]
fn storage_config_prefers_explicit_directory() {
    let storage = StorageConfig {
        directory: Some("/tmp/medcab-tests".into()),
        ..StorageConfig::default()
    };
    assert_eq!(storage.resolved_directory(), PathBuf::from("/tmp/medcab-tests"));

    let fallback = StorageConfig::default().resolved_directory();
    assert!(fallback.ends_with("medcab"));
}

#[test]
fn auth_config_defaults_match_backend_routes() {
    let defaults = AuthConfig::default();
    assert_eq!(defaults.login_path, "login/");
    assert_eq!(defaults.profile_path, "profile/");
    assert_eq!(defaults.profile_update_path, "profile/update/");
    assert_eq!(defaults.register_path, "register/doctor/");
}
