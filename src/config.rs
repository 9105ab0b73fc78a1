use std::path::Path;

use serde::Deserialize;

use crate::documents::LifecycleOptions;
use crate::error::AppError;

/// Environment variable prefix, e.g. `JOTTER__STORE__BACKEND=mongo`.
const ENV_PREFIX: &str = "JOTTER";
const DEFAULT_CONFIG_FILE: &str = "jotter";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Mongo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb_uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Built-in demo users with cookie sessions.
    Demo,
    /// Subject taken from a header set by an authenticating proxy.
    Header,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub subject_header: String,
}

/// Full service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub lifecycle: LifecycleOptions,
}

impl AppConfig {
    /// Load configuration from defaults, then a TOML file, then the
    /// environment.
    ///
    /// With `path: None` an optional `jotter.toml` in the working directory
    /// is used; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("server.addr", "127.0.0.1:3000")
            .and_then(|b| b.set_default("store.backend", "memory"))
            .and_then(|b| b.set_default("store.mongodb_uri", "mongodb://localhost:27017"))
            .and_then(|b| b.set_default("store.database", "jotter"))
            .and_then(|b| b.set_default("auth.mode", "demo"))
            .and_then(|b| b.set_default("auth.subject_header", "x-auth-subject"))
            .map_err(|e| AppError::Internal(format!("Invalid config defaults: {e}")))?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to load configuration: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| AppError::BadRequest(format!("Invalid configuration: {e}")))
    }
}
