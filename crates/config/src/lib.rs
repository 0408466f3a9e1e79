use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "medcab.toml",
    "config/medcab.toml",
    "crates/config/medcab.toml",
    "../medcab.toml",
    "../config/medcab.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Location and transport settings for the practice backend.
///
/// ```
/// use medcab_config::ApiConfig;
///
/// let api = ApiConfig::default();
/// assert_eq!(api.base_url, "http://127.0.0.1:8000/api");
/// assert_eq!(api.endpoint("/patients/"), "http://127.0.0.1:8000/api/patients/");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "ApiConfig::default_user_agent")]
    pub user_agent: String,
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:8000/api".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    fn default_user_agent() -> String {
        "medcab-client".to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Join a backend-relative endpoint onto the base url with a single separator.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
            user_agent: Self::default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted token. Falls back to the platform data dir.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "StorageConfig::default_token_key")]
    pub token_key: String,
}

impl StorageConfig {
    fn default_token_key() -> String {
        "token".to_string()
    }

    pub fn resolved_directory(&self) -> PathBuf {
        match &self.directory {
            Some(directory) => PathBuf::from(directory),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("medcab"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: None,
            token_key: Self::default_token_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_login_path")]
    pub login_path: String,
    #[serde(default = "AuthConfig::default_profile_path")]
    pub profile_path: String,
    #[serde(default = "AuthConfig::default_profile_update_path")]
    pub profile_update_path: String,
    #[serde(default = "AuthConfig::default_register_path")]
    pub register_path: String,
    #[serde(default)]
    pub expiry_leeway_seconds: u64,
}

impl AuthConfig {
    fn default_login_path() -> String {
        "login/".to_string()
    }

    fn default_profile_path() -> String {
        "profile/".to_string()
    }

    fn default_profile_update_path() -> String {
        "profile/update/".to_string()
    }

    fn default_register_path() -> String {
        "register/doctor/".to_string()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: Self::default_login_path(),
            profile_path: Self::default_profile_path(),
            profile_update_path: Self::default_profile_update_path(),
            register_path: Self::default_register_path(),
            expiry_leeway_seconds: 0,
        }
    }
}

/// Load the client configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use medcab_config::load;
///
/// std::env::remove_var("MEDCAB_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.api.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("api.base_url", defaults.api.base_url.clone())?
        .set_default(
            "api.request_timeout_seconds",
            i64::try_from(defaults.api.request_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("api.user_agent", defaults.api.user_agent.clone())?
        .set_default("storage.token_key", defaults.storage.token_key.clone())?
        .set_default("auth.login_path", defaults.auth.login_path.clone())?
        .set_default("auth.profile_path", defaults.auth.profile_path.clone())?
        .set_default(
            "auth.profile_update_path",
            defaults.auth.profile_update_path.clone(),
        )?
        .set_default("auth.register_path", defaults.auth.register_path.clone())?;

    let environment_overrides = config::Environment::with_prefix("MEDCAB").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("MEDCAB_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via MEDCAB_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.api.request_timeout_seconds == 0 {
        config.api.request_timeout_seconds = ApiConfig::default_request_timeout();
    }

    debug!(?config, "loaded client configuration");
    Ok(config)
}
