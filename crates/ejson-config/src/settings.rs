//! Typed convenience wrappers over [`AeadCodec`] and the flattener.
//!
//! Everything here speaks the text envelope (standard Base64), which is what
//! settings files contain.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::error::Category;
use zeroize::Zeroizing;

use crate::crypto::{AeadCodec, CipherError, Envelope, KeyMaterial, OsRandom, RandomSource, KEY_LEN};
use crate::error::{Error, Result};
use crate::flatten::{flatten_slice, FlattenError};

/// Generate a fresh 256-bit key from the OS CSPRNG.
pub fn generate_key() -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    OsRandom.fill(key.as_mut_slice())?;
    Ok(key)
}

/// Generate a fresh 256-bit key and encode it as standard Base64.
pub fn generate_base64_key() -> Result<Zeroizing<String>> {
    let key = generate_key()?;
    Ok(Zeroizing::new(STANDARD.encode(key.as_slice())))
}

/// Encrypt raw bytes into a text envelope.
pub fn encrypt_bytes(plaintext: &[u8], key: &KeyMaterial) -> Result<String> {
    let envelope = AeadCodec::new().encrypt(plaintext, key, None)?;
    Ok(envelope.to_base64())
}

/// Encrypt a string into a text envelope.
pub fn encrypt_str(plaintext: &str, key: &KeyMaterial) -> Result<String> {
    encrypt_bytes(plaintext.as_bytes(), key)
}

/// Serialise `value` as JSON and encrypt it.
///
/// # Errors
///
/// Returns [`CipherError::InvalidInput`] if `value` serialises to `null`, and
/// [`Error::Serialization`] if it cannot be serialised at all.
pub fn encrypt_settings<T: Serialize + ?Sized>(value: &T, key: &KeyMaterial) -> Result<String> {
    let json = Zeroizing::new(serde_json::to_vec(value).map_err(Error::Serialization)?);
    if json.as_slice() == b"null" {
        return Err(CipherError::InvalidInput("settings value must not be null").into());
    }
    encrypt_bytes(&json, key)
}

/// Decrypt a text envelope into raw bytes.
///
/// # Errors
///
/// Returns [`CipherError::InvalidInput`] for empty text, and the envelope and
/// authentication errors of [`AeadCodec::decrypt`].
pub fn decrypt_bytes(text: &str, key: &KeyMaterial) -> Result<Zeroizing<Vec<u8>>> {
    if text.is_empty() {
        return Err(CipherError::InvalidInput("envelope text must not be empty").into());
    }
    let envelope = Envelope::from_base64(text)?;
    Ok(AeadCodec::new().decrypt(&envelope, key, None)?)
}

/// Decrypt a text envelope into a UTF-8 string.
pub fn decrypt_str(text: &str, key: &KeyMaterial) -> Result<Zeroizing<String>> {
    let bytes = decrypt_bytes(text, key)?;
    let text = std::str::from_utf8(&bytes)?;
    Ok(Zeroizing::new(text.to_owned()))
}

/// Decrypt a text envelope and deserialise the JSON inside.
///
/// # Errors
///
/// Decrypted bytes that are not JSON at all are reported as
/// [`FlattenError::MalformedDocument`]; well-formed JSON that does not fit `T`
/// is [`Error::Deserialization`].
pub fn decrypt_settings<T: DeserializeOwned>(text: &str, key: &KeyMaterial) -> Result<T> {
    let bytes = decrypt_bytes(text, key)?;
    serde_json::from_slice(&bytes).map_err(|e| match e.classify() {
        Category::Data => Error::Deserialization(e),
        Category::Syntax | Category::Eof | Category::Io => {
            FlattenError::MalformedDocument(e).into()
        }
    })
}

/// Decrypt a text envelope and check that it flattens, returning the entry count.
///
/// Used to validate a settings document without keeping its values around.
pub fn verify_settings(text: &str, key: &KeyMaterial) -> Result<usize> {
    let bytes = decrypt_bytes(text, key)?;
    Ok(flatten_slice(&bytes)?.len())
}

/// Bind the built configuration, or one section of it, to `T`.
///
/// `section` is a `config` path such as `"database"` or `"logging.level"`.
///
/// # Errors
///
/// Returns the underlying [`config::ConfigError`] if the section is missing or
/// does not match `T`.
pub fn load_settings<T: DeserializeOwned>(
    config: &config::Config,
    section: Option<&str>,
) -> std::result::Result<T, config::ConfigError> {
    match section {
        Some(section) => config.get(section),
        None => config.clone().try_deserialize(),
    }
}
