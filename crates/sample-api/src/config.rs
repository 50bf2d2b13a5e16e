//! Configuration loading and validation for the sample API.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use std::fmt;

use anyhow::{Context, Result};
use ejson_config::KeyMaterial;
use serde::Deserialize;

/// Validated sample API configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Path to the encrypted settings file.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    /// Base64 key the settings file was encrypted with. **Required.**
    pub settings_key: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// How often (seconds) to re-read the settings file. `0` disables reloading.
    #[serde(default)]
    pub reload_interval_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_settings_path() -> String {
    "settings.ejson".into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Key material for the settings file. The Base64 bytes are used as a
    /// PBKDF2 password.
    ///
    /// # Errors
    ///
    /// Returns an error if `SETTINGS_KEY` is not valid Base64.
    pub fn key_material(&self) -> Result<KeyMaterial> {
        KeyMaterial::password_from_base64(&self.settings_key)
            .context("SETTINGS_KEY must be a non-empty base64 string")
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.settings_path, "SETTINGS_PATH")?;
        ensure_non_empty(&self.settings_key, "SETTINGS_KEY")?;
        self.key_material()?;

        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings_path", &self.settings_path)
            .field("settings_key", &"[REDACTED]")
            .field("listen_port", &self.listen_port)
            .field("reload_interval_secs", &self.reload_interval_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
