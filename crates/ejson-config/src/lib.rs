//! Encrypted JSON settings files.
//!
//! A settings document is plain JSON encrypted with AES-256-GCM and stored as
//! a single envelope (see [`crypto`] for the layout). Loading one decrypts it,
//! verifies the tag and flattens the JSON into `section:key` paths:
//!
//! - [`crypto`]: key derivation, the AEAD codec and the envelope layout.
//! - [`flatten`]: JSON → [`FlatConfig`].
//! - [`source`]: file and stream sources, usable standalone or as
//!   [`config::Source`]s.
//! - [`settings`]: typed helpers for producing and reading envelopes.
//! - [`store`]: a lock-free holder for the settings currently in use.

pub mod crypto;
pub mod error;
pub mod flatten;
pub mod settings;
pub mod source;
pub mod store;

pub use crypto::{AeadCodec, CipherError, Envelope, KeyMaterial};
pub use error::{Error, ErrorKind, Result};
pub use flatten::{FlatConfig, FlattenError, KEY_DELIMITER};
pub use settings::{
    decrypt_bytes, decrypt_settings, decrypt_str, encrypt_bytes, encrypt_settings, encrypt_str,
    generate_base64_key, generate_key, load_settings, verify_settings,
};
pub use source::{EncryptedJsonFile, EncryptedJsonStream};
pub use store::{SettingsStore, StoreError};
