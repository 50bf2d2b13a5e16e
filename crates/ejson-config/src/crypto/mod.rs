//! AES-256-GCM envelope encryption of settings payloads.
//!
//! This module is intentionally free of JSON and configuration-framework
//! dependencies. It provides the key derivation, the AEAD operations and the
//! binary envelope layout used by the rest of the crate.
//!
//! # Envelope format
//!
//! ```text
//! ciphertext (N bytes) || nonce (12) || salt (16) || tag (16)
//! ```
//!
//! The trailing [`METADATA_LEN`] bytes are always present, in that order,
//! regardless of payload size. The text form is standard, padded Base64 of the
//! whole envelope.

pub mod cipher;
pub mod envelope;
pub mod kdf;
pub mod key;
pub mod random;

pub use cipher::{AeadCodec, CipherError, MAX_ASSOCIATED_DATA_LEN, MAX_PLAINTEXT_LEN};
pub use envelope::Envelope;
pub use kdf::{derive_key, PBKDF2_ITERATIONS};
pub use key::KeyMaterial;
pub use random::{OsRandom, RandomSource};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the PBKDF2 salt (16 bytes = 128 bits).
pub const SALT_LEN: usize = 16;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Number of trailing metadata bytes in every envelope.
pub const METADATA_LEN: usize = NONCE_LEN + SALT_LEN + TAG_LEN;
