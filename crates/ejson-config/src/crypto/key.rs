//! [`KeyMaterial`]: the caller's choice between a raw key and a password.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

use super::cipher::CipherError;
use super::KEY_LEN;

/// Key material supplied to [`AeadCodec`](super::AeadCodec).
///
/// The variant decides whether PBKDF2 runs: a [`Raw`](KeyMaterial::Raw) key is
/// used as the AES-256 key directly, a [`Password`](KeyMaterial::Password) is
/// stretched with the envelope salt first. Both variants zero their bytes when
/// dropped.
#[derive(Clone)]
pub enum KeyMaterial {
    /// A 256-bit AES key used as-is.
    Raw(Zeroizing<[u8; KEY_LEN]>),
    /// Password bytes fed to PBKDF2-HMAC-SHA512.
    Password(Zeroizing<Vec<u8>>),
}

impl KeyMaterial {
    /// Wrap a raw 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidInput`] if `bytes` is not [`KEY_LEN`] bytes.
    pub fn raw(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidInput("raw key must be exactly 32 bytes"));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(bytes);
        Ok(Self::Raw(key))
    }

    /// Wrap password bytes for key derivation.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidInput`] if `bytes` is empty.
    pub fn password(bytes: impl AsRef<[u8]>) -> Result<Self, CipherError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(CipherError::InvalidInput("password must not be empty"));
        }
        Ok(Self::Password(Zeroizing::new(bytes.to_vec())))
    }

    /// Decode a Base64 key (as produced by
    /// [`generate_base64_key`](crate::settings::generate_base64_key)) into a raw key.
    pub fn raw_from_base64(text: &str) -> Result<Self, CipherError> {
        Self::raw(&decode_key(text)?)
    }

    /// Decode a Base64 key and use its bytes as a password.
    ///
    /// Settings files keyed with a Base64 secret string are stretched this way.
    pub fn password_from_base64(text: &str) -> Result<Self, CipherError> {
        Self::password(decode_key(text)?.as_slice())
    }

    /// Returns `true` if this key material goes through PBKDF2.
    pub fn is_password(&self) -> bool {
        matches!(self, Self::Password(_))
    }
}

fn decode_key(text: &str) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    STANDARD
        .decode(text.trim())
        .map(Zeroizing::new)
        .map_err(|_| CipherError::InvalidInput("key is not valid base64"))
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, not even in debug builds.
        match self {
            Self::Raw(_) => f.write_str("KeyMaterial::Raw([REDACTED])"),
            Self::Password(_) => f.write_str("KeyMaterial::Password([REDACTED])"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_rejects_wrong_length() {
        assert!(KeyMaterial::raw(&[0u8; 16]).is_err());
        assert!(KeyMaterial::raw(&[0u8; 33]).is_err());
        assert!(KeyMaterial::raw(&[0u8; KEY_LEN]).is_ok());
    }

    #[test]
    fn password_rejects_empty() {
        assert!(KeyMaterial::password(b"").is_err());
        assert!(KeyMaterial::password("hunter2").unwrap().is_password());
    }

    #[test]
    fn base64_constructors() {
        let text = "A4HKnoCR/bdUOhogBi3EJpsEboYabtTy010eAoV8wKA=";
        assert!(!KeyMaterial::raw_from_base64(text).unwrap().is_password());
        assert!(KeyMaterial::password_from_base64(text).unwrap().is_password());
        assert!(KeyMaterial::raw_from_base64("not base64!").is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let key = KeyMaterial::raw(&[0xAB; KEY_LEN]).unwrap();
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("171"));
    }
}
