//! Crate-level error type.

use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use crate::crypto::CipherError;
use crate::flatten::FlattenError;
use crate::store::StoreError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the public API can report.
///
/// Use [`Error::kind`] to branch on the category without matching nested
/// module errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("could not parse the encrypted JSON settings: {0}")]
    Flatten(#[from] FlattenError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A required settings file does not exist.
    #[error("settings file not found: {}", path.display())]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A value could not be serialised to JSON before encryption.
    #[error("could not serialise settings: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Decrypted JSON is well formed but does not fit the requested type.
    #[error("settings do not match the expected shape: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Decrypted bytes are not UTF-8.
    #[error("decrypted settings are not valid UTF-8")]
    InvalidUtf8(#[from] Utf8Error),
}

/// Coarse failure category shared by every error in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    AuthenticationFailure,
    MalformedEnvelope,
    MalformedDocument,
    UnsupportedToken,
    DuplicateKey,
    /// Valid JSON that cannot be bound to the target type.
    TypeMismatch,
    ResourceNotFound,
    NotLoaded,
    Io,
    RandomSource,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Cipher(e) => e.kind(),
            Error::Flatten(e) => e.kind(),
            Error::Store(e) => e.kind(),
            Error::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Error::Io(_) => ErrorKind::Io,
            Error::Serialization(_) => ErrorKind::InvalidInput,
            Error::Deserialization(_) => ErrorKind::TypeMismatch,
            Error::InvalidUtf8(_) => ErrorKind::MalformedDocument,
        }
    }
}

impl CipherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CipherError::InvalidInput(_) => ErrorKind::InvalidInput,
            CipherError::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            CipherError::MalformedEnvelope(_) | CipherError::InvalidBase64 => {
                ErrorKind::MalformedEnvelope
            }
            CipherError::RandomFailure => ErrorKind::RandomSource,
        }
    }
}

impl FlattenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlattenError::MalformedDocument(_) => ErrorKind::MalformedDocument,
            FlattenError::UnsupportedToken(_) => ErrorKind::UnsupportedToken,
            FlattenError::DuplicateKey(_) => ErrorKind::DuplicateKey,
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotLoaded => ErrorKind::NotLoaded,
        }
    }
}
