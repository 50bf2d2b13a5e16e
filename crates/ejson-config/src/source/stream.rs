//! [`EncryptedJsonStream`]: binary envelope read from any reader.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use config::{ConfigError, Map, Source, Value};
use tracing::debug;

use super::{foreign, open, to_config_map};
use crate::crypto::{Envelope, KeyMaterial, PBKDF2_ITERATIONS};
use crate::error::Result;
use crate::flatten::FlatConfig;

/// An encrypted settings payload held in memory.
///
/// Unlike [`EncryptedJsonFile`](super::EncryptedJsonFile), the bytes are the
/// binary envelope itself, not its Base64 text.
#[derive(Clone)]
pub struct EncryptedJsonStream {
    bytes: Arc<[u8]>,
    key: KeyMaterial,
    iterations: u32,
}

impl EncryptedJsonStream {
    /// Drain `reader` to the end and keep the bytes for later loads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the read fails.
    pub fn from_reader<R: Read>(mut reader: R, key: KeyMaterial) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(bytes, key))
    }

    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, key: KeyMaterial) -> Self {
        Self {
            bytes: bytes.into(),
            key,
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Override the PBKDF2 iteration count used with a password key.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Decrypt and flatten the buffered envelope.
    pub fn load(&self) -> Result<FlatConfig> {
        let envelope = Envelope::from_bytes(&self.bytes)?;
        let flat = open(&envelope, &self.key, self.iterations)?;
        debug!(entries = flat.len(), "loaded encrypted settings stream");
        Ok(flat)
    }
}

impl fmt::Debug for EncryptedJsonStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedJsonStream")
            .field("len", &self.bytes.len())
            .field("key", &self.key)
            .finish()
    }
}

impl Source for EncryptedJsonStream {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> std::result::Result<Map<String, Value>, ConfigError> {
        let flat = self.load().map_err(foreign)?;
        to_config_map(&flat, "encrypted JSON stream").map_err(|e| foreign(e.into()))
    }
}
