//! Layered daemon configuration.
//!
//! Sources, highest priority last:
//! 1. Built-in defaults
//! 2. `attendo.toml` in the working directory, or the file named by `ATTENDO_CONFIG`
//! 3. Environment variables with the `ATTENDO_` prefix, `__` separating sections
//!    (`ATTENDO_AUTH__REQUIRED=true` sets `auth.required`)

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AttendoConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `ATTENDO_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Third-party identity provider passed to the OAuth sign-in.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Authorization endpoint the browser is sent to on login.
    #[serde(default)]
    pub authorize_url: String,

    /// Where the provider sends the browser back with tokens in the fragment.
    #[serde(default = "default_redirect_to")]
    pub redirect_to: String,

    /// Shared HMAC secret the provider signs access tokens with.
    #[serde(default)]
    pub token_secret: String,

    /// Reject data methods until an identity is authenticated.
    #[serde(default)]
    pub required: bool,
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_redirect_to() -> String {
    "http://localhost:5173".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            authorize_url: String::new(),
            redirect_to: default_redirect_to(),
            token_secret: String::new(),
            required: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Database file name inside the selected workspace.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "attendo.sqlite3".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

impl AttendoConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = std::env::var_os("ATTENDO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("attendo.toml"));
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        // ATTENDO_LOG and ATTENDO_CONFIG are read directly, not as config keys.
        figment.merge(
            Env::prefixed("ATTENDO_")
                .ignore(&["LOG", "CONFIG"])
                .split("__"),
        )
    }
}
