//! Shared application state injected into every Axum handler.

use common::protocol::Secrets;
use ejson_config::SettingsStore;

/// Application state shared across all request handlers.
///
/// Cloning is cheap: the store is `Arc`-backed, so every clone reads the same
/// published settings.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Secrets decrypted from the settings file, republished on reload.
    pub secrets: SettingsStore<Secrets>,
}

impl AppState {
    /// Create a new [`AppState`] around an existing store.
    pub fn new(secrets: SettingsStore<Secrets>) -> Self {
        Self { secrets }
    }
}
