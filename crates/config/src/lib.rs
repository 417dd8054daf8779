use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "huddle.toml",
    "config/huddle.toml",
    "crates/config/huddle.toml",
    "../huddle.toml",
    "../config/huddle.toml",
    "../crates/config/huddle.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://huddle.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Settings for resolving caller identities and guarding internal routes.
///
/// Bearer tokens are HS256 JWTs; the caller's token identifier is built from
/// the `iss` and `sub` claims. There is no built-in `jwt_secret`: the backend
/// refuses to start until one is configured. Internal routes (user
/// provisioning and presence updates) require `internal_secret` and stay
/// closed while it is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
    #[serde(default = "AuthConfig::default_audience")]
    pub audience: String,
    #[serde(default)]
    pub internal_secret: Option<String>,
}

impl AuthConfig {
    fn default_issuer() -> String {
        "huddle".to_string()
    }

    fn default_audience() -> String {
        "huddle-clients".to_string()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: Self::default_issuer(),
            audience: Self::default_audience(),
            internal_secret: None,
        }
    }
}

/// What the relay does when the completion request itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionFailurePolicy {
    /// Post the fallback reply into the conversation.
    #[default]
    Fallback,
    /// Return the error to the caller without posting anything.
    Propagate,
}

/// Configuration for the OpenAI-compatible completion endpoint used by the chat relay.
///
/// ```
/// use huddle_config::{CompletionFailurePolicy, RelayConfig};
///
/// let relay = RelayConfig::default();
/// assert_eq!(relay.base_url, "https://api.openai.com/v1");
/// assert_eq!(relay.model, "gpt-3.5-turbo");
/// assert_eq!(relay.request_timeout_seconds, 30);
/// assert_eq!(relay.on_completion_failure, CompletionFailurePolicy::Fallback);
/// assert!(relay.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "RelayConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "RelayConfig::default_model")]
    pub model: String,
    #[serde(default = "RelayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub on_completion_failure: CompletionFailurePolicy,
}

impl RelayConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_model() -> String {
        "gpt-3.5-turbo".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// The configured API key, or `OPENAI_API_KEY` from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            request_timeout_seconds: Self::default_request_timeout(),
            on_completion_failure: CompletionFailurePolicy::default(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use huddle_config::load;
///
/// std::env::remove_var("HUDDLE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.issuer", defaults.auth.issuer.clone())?
        .set_default("auth.audience", defaults.auth.audience.clone())?
        .set_default("relay.base_url", defaults.relay.base_url.clone())?
        .set_default("relay.model", defaults.relay.model.clone())?
        .set_default(
            "relay.request_timeout_seconds",
            i64::try_from(defaults.relay.request_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("relay.on_completion_failure", "fallback")?;

    let environment_overrides = config::Environment::with_prefix("HUDDLE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("HUDDLE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via HUDDLE_CONFIG");
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

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(
        http.address = %config.http.address,
        http.port = config.http.port,
        database.url = %config.database.url,
        relay.model = %config.relay.model,
        "loaded backend configuration"
    );
    Ok(config)
}
