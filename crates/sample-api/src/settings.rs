//! Loading the encrypted settings file into the [`SettingsStore`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use common::protocol::Secrets;
use ejson_config::{load_settings, EncryptedJsonFile, KeyMaterial, SettingsStore};
use tokio::time;
use tracing::{info, warn};

use crate::config::Config;

/// Section of the settings document bound to [`Secrets`].
pub const SECRETS_SECTION: &str = "secrets";

/// Where the settings come from and how to open them.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: PathBuf,
    key: KeyMaterial,
}

impl SettingsLoader {
    pub fn new(path: impl Into<PathBuf>, key: KeyMaterial) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// Build a loader from the validated service configuration.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(&cfg.settings_path, cfg.key_material()?))
    }

    /// Decrypt the settings file and bind its `secrets` section.
    ///
    /// Blocking: reads the file and runs PBKDF2.
    pub fn load(&self) -> Result<Secrets> {
        let settings = config::Config::builder()
            .add_source(EncryptedJsonFile::new(&self.path, self.key.clone()))
            .build()
            .with_context(|| format!("failed to load settings from {}", self.path.display()))?;

        load_settings(&settings, Some(SECRETS_SECTION))
            .with_context(|| format!("settings file has no usable `{SECRETS_SECTION}` section"))
    }

    /// Load the settings and publish them to `store`.
    ///
    /// On failure `store` keeps whatever it held before.
    pub async fn load_into(&self, store: &SettingsStore<Secrets>) -> Result<()> {
        let loader = self.clone();
        let target = store.clone();
        tokio::task::spawn_blocking(move || target.reload(|| loader.load()))
            .await
            .context("settings load task panicked")??;
        info!(path = %self.path.display(), "settings published");
        Ok(())
    }
}

/// Spawn a background task that periodically reloads the settings file.
///
/// The first reload fires after one full interval (the startup load is assumed
/// to have already populated the store). On reload failure the previous
/// settings are retained and a warning is emitted.
pub fn reload_task(
    loader: SettingsLoader,
    interval_secs: u64,
    store: SettingsStore<Secrets>,
) -> tokio::task::JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; skip it so we don't double-load at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match loader.load_into(&store).await {
                Ok(()) => info!("settings reloaded"),
                Err(e) => {
                    let error = format!("{e:#}");
                    warn!(error = %error, "settings reload failed; retaining previous settings");
                }
            }
        }
    })
}
