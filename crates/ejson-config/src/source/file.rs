//! [`EncryptedJsonFile`]: settings file holding a Base64 text envelope.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use config::{ConfigError, Map, Source, Value};
use tracing::{debug, info};

use super::{foreign, open, to_config_map};
use crate::crypto::{Envelope, KeyMaterial, PBKDF2_ITERATIONS};
use crate::error::{Error, Result};
use crate::flatten::FlatConfig;

/// An encrypted settings file on disk.
///
/// The file content is decoded exactly as stored: a trailing newline or other
/// surrounding whitespace makes the Base64 invalid.
///
/// ```no_run
/// use ejson_config::{EncryptedJsonFile, KeyMaterial};
///
/// let key = KeyMaterial::password_from_base64("A4HKnoCR/bdUOhogBi3EJpsEboYabtTy010eAoV8wKA=")?;
/// let settings = config::Config::builder()
///     .add_source(EncryptedJsonFile::new("appsettings.ejson", key))
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct EncryptedJsonFile {
    path: PathBuf,
    key: KeyMaterial,
    required: bool,
    iterations: u32,
}

impl EncryptedJsonFile {
    /// A required file at `path`, decrypted with `key`.
    pub fn new(path: impl Into<PathBuf>, key: KeyMaterial) -> Self {
        Self {
            path: path.into(),
            key,
            required: true,
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Whether a missing file is an error (`true`, the default) or an empty map.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Override the PBKDF2 iteration count used with a password key.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, decrypt and flatten the file.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceNotFound`] for a missing required file, [`Error::Io`]
    /// for other read failures, and the crypto and flatten errors of the
    /// content itself.
    pub fn load(&self) -> Result<FlatConfig> {
        let text = match fs::read(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.required {
                    return Err(Error::ResourceNotFound {
                        path: self.path.clone(),
                        source: e,
                    });
                }
                debug!(path = %self.path.display(), "optional settings file not found; skipping");
                return Ok(FlatConfig::new());
            }
            Err(e) => return Err(e.into()),
        };

        let envelope = Envelope::from_base64(&text)?;
        let flat = open(&envelope, &self.key, self.iterations)?;
        info!(
            path = %self.path.display(),
            entries = flat.len(),
            "loaded encrypted settings file"
        );
        Ok(flat)
    }
}

impl Source for EncryptedJsonFile {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> std::result::Result<Map<String, Value>, ConfigError> {
        let flat = self.load().map_err(foreign)?;
        let origin = self.path.display().to_string();
        to_config_map(&flat, &origin).map_err(|e| foreign(e.into()))
    }
}
