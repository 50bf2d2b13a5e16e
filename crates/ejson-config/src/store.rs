//! [`SettingsStore`]: process-wide holder for the current decrypted settings.
//!
//! Readers take a lock-free snapshot via `arc-swap`; a reload task can publish
//! a new value at any time without blocking them.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use thiserror::Error;

/// Errors produced by the settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing has been published yet.
    #[error("settings have not been loaded yet")]
    NotLoaded,
}

/// Shared, lock-free store of the current settings value.
///
/// Clones share the same slot, so one clone can live in request state while
/// another is held by a background reload task.
pub struct SettingsStore<T> {
    inner: Arc<ArcSwapOption<T>>,
}

impl<T> SettingsStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::from(None)),
        }
    }

    /// Create a store that already holds `value`.
    pub fn with_value(value: T) -> Self {
        let store = Self::new();
        store.replace(value);
        store
    }

    /// Returns `true` once a value has been published.
    pub fn is_loaded(&self) -> bool {
        self.inner.load().is_some()
    }

    /// Snapshot of the current value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotLoaded`] before the first publish.
    pub fn current(&self) -> Result<Arc<T>, StoreError> {
        self.inner.load_full().ok_or(StoreError::NotLoaded)
    }

    /// Atomically publish `value`, returning the snapshot now visible to readers.
    pub fn replace(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.inner.store(Some(Arc::clone(&value)));
        value
    }

    /// Run `load` and publish its result.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` returns; on failure the previous value stays in
    /// place.
    pub fn reload<E, F>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = load()?;
        Ok(self.replace(value))
    }
}

impl<T> Clone for SettingsStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SettingsStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SettingsStore<T> {
    // Settings routinely hold secrets, so only the load state is printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
