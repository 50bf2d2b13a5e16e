//! AES-256-GCM encryption and decryption of whole settings payloads.
//!
//! **Nonce discipline:** every [`AeadCodec::encrypt`] call draws a fresh 96-bit
//! nonce and 128-bit salt from the codec's [`RandomSource`]. GCM nonce reuse
//! under one key breaks both confidentiality and authentication.
//!
//! **Raw keys:** the salt is unused by key derivation, so it is bound into the
//! GCM associated data instead. Every envelope byte is authenticated in both
//! modes.

use std::borrow::Cow;

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use thiserror::Error;
use zeroize::Zeroizing;

use super::envelope::Envelope;
use super::kdf::{derive_aes_key, PBKDF2_ITERATIONS};
use super::key::KeyMaterial;
use super::random::{OsRandom, RandomSource};
use super::{METADATA_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};

/// Largest plaintext AES-GCM accepts under one key/nonce pair: 2^39 - 256 bits.
pub const MAX_PLAINTEXT_LEN: u64 = 68_719_476_704;

/// Largest associated data AES-GCM accepts: 2^64 - 1 bits.
pub const MAX_ASSOCIATED_DATA_LEN: u64 = 2_305_843_009_213_693_951;

/// Errors produced by the crypto layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// A required argument was empty, the wrong length, or over a size limit.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Tag verification failed: wrong key, or tampered/corrupted data.
    #[error("authentication failed: wrong key or corrupted data")]
    AuthenticationFailure,

    /// The binary envelope is shorter than its fixed metadata.
    #[error("malformed envelope: expected at least {METADATA_LEN} bytes, got {0}")]
    MalformedEnvelope(usize),

    /// The text envelope is not valid Base64.
    #[error("malformed envelope: not valid base64")]
    InvalidBase64,

    /// The random source could not produce a nonce or salt.
    #[error("random number generation failed")]
    RandomFailure,
}

/// One-shot AES-256-GCM codec producing and consuming [`Envelope`]s.
///
/// Stateless apart from its random source and PBKDF2 iteration count, so a
/// single codec can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct AeadCodec<R = OsRandom> {
    rng: R,
    iterations: u32,
}

impl AeadCodec<OsRandom> {
    /// Create a codec backed by the OS CSPRNG.
    pub fn new() -> Self {
        Self::with_random(OsRandom)
    }
}

impl Default for AeadCodec<OsRandom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> AeadCodec<R> {
    /// Create a codec that draws nonces and salts from `rng`.
    pub fn with_random(rng: R) -> Self {
        Self {
            rng,
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Override the PBKDF2 iteration count used for [`KeyMaterial::Password`].
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// PBKDF2 iteration count in effect.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Encrypt `plaintext`, returning a self-describing [`Envelope`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidInput`] if `plaintext` is empty, if either
    /// size bound is exceeded, or if the key material is unusable.
    /// Returns [`CipherError::RandomFailure`] if no nonce or salt can be drawn.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        key: &KeyMaterial,
        associated_data: Option<&[u8]>,
    ) -> Result<Envelope, CipherError> {
        if plaintext.is_empty() {
            return Err(CipherError::InvalidInput("plaintext must not be empty"));
        }
        check_bounds(plaintext, associated_data)?;

        let mut salt = [0u8; SALT_LEN];
        self.rng.fill(&mut salt)?;
        let mut nonce = [0u8; NONCE_LEN];
        self.rng.fill(&mut nonce)?;

        let cipher = self.build_cipher(key, &salt)?;
        let aad = bind_associated_data(key, &salt, associated_data);

        let mut ciphertext = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), &aad, &mut ciphertext)
            .map_err(|_| CipherError::InvalidInput("payload rejected by AES-GCM"))?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);

        Ok(Envelope::new(ciphertext, nonce, salt, tag_bytes))
    }

    /// Decrypt and verify an [`Envelope`] whose parts were supplied separately.
    ///
    /// Verification and decryption are a single step: no plaintext is returned
    /// unless the tag checks out.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidInput`] if the ciphertext is empty or too large.
    /// Returns [`CipherError::AuthenticationFailure`] if the tag does not verify.
    pub fn decrypt(
        &self,
        envelope: &Envelope,
        key: &KeyMaterial,
        associated_data: Option<&[u8]>,
    ) -> Result<Zeroizing<Vec<u8>>, CipherError> {
        if envelope.ciphertext.is_empty() {
            return Err(CipherError::InvalidInput("ciphertext must not be empty"));
        }
        check_bounds(&envelope.ciphertext, associated_data)?;

        let cipher = self.build_cipher(key, &envelope.salt)?;
        let aad = bind_associated_data(key, &envelope.salt, associated_data);

        let mut plaintext = Zeroizing::new(envelope.ciphertext.clone());
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&envelope.nonce),
                &aad,
                plaintext.as_mut_slice(),
                Tag::from_slice(&envelope.tag),
            )
            .map_err(|_| CipherError::AuthenticationFailure)?;

        Ok(plaintext)
    }

    /// Decrypt a serialised envelope whose trailing [`METADATA_LEN`] bytes hold
    /// nonce, salt and tag.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedEnvelope`] if `bytes` is too short, and
    /// otherwise the same errors as [`AeadCodec::decrypt`].
    pub fn decrypt_bytes(
        &self,
        bytes: &[u8],
        key: &KeyMaterial,
        associated_data: Option<&[u8]>,
    ) -> Result<Zeroizing<Vec<u8>>, CipherError> {
        let envelope = Envelope::from_bytes(bytes)?;
        self.decrypt(&envelope, key, associated_data)
    }

    fn build_cipher(&self, key: &KeyMaterial, salt: &[u8]) -> Result<Aes256Gcm, CipherError> {
        match key {
            KeyMaterial::Raw(bytes) => Aes256Gcm::new_from_slice(bytes.as_slice()),
            KeyMaterial::Password(password) => {
                let derived = derive_aes_key(password, salt, self.iterations)?;
                Aes256Gcm::new_from_slice(derived.as_slice())
            }
        }
        .map_err(|_| CipherError::InvalidInput("key must be 32 bytes"))
    }
}

fn check_bounds(payload: &[u8], associated_data: Option<&[u8]>) -> Result<(), CipherError> {
    if payload.len() as u64 > MAX_PLAINTEXT_LEN {
        return Err(CipherError::InvalidInput("payload exceeds the AES-GCM size limit"));
    }
    if let Some(aad) = associated_data {
        if aad.len() as u64 > MAX_ASSOCIATED_DATA_LEN {
            return Err(CipherError::InvalidInput(
                "associated data exceeds the AES-GCM size limit",
            ));
        }
    }
    Ok(())
}

/// GCM associated data for one call: the caller's data, prefixed with the salt
/// when the key is raw.
fn bind_associated_data<'a>(
    key: &KeyMaterial,
    salt: &[u8; SALT_LEN],
    associated_data: Option<&'a [u8]>,
) -> Cow<'a, [u8]> {
    let caller = associated_data.unwrap_or_default();
    match key {
        KeyMaterial::Password(_) => Cow::Borrowed(caller),
        KeyMaterial::Raw(_) => {
            let mut bound = Vec::with_capacity(SALT_LEN + caller.len());
            bound.extend_from_slice(salt);
            bound.extend_from_slice(caller);
            Cow::Owned(bound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;

    /// Fills every requested buffer with the same byte.
    struct FixedRandom(u8);

    impl RandomSource for FixedRandom {
        fn fill(&self, dest: &mut [u8]) -> Result<(), CipherError> {
            dest.fill(self.0);
            Ok(())
        }
    }

    struct FailingRandom;

    impl RandomSource for FailingRandom {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), CipherError> {
            Err(CipherError::RandomFailure)
        }
    }

    const PLAINTEXT: &[u8] = br#"{"EmailApiKey":"api1.XXXX"}"#;

    fn unhex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn raw_key(byte: u8) -> KeyMaterial {
        KeyMaterial::raw(&[byte; KEY_LEN]).unwrap()
    }

    /// Password codec with a low iteration count to keep tests fast.
    fn fast_codec() -> AeadCodec {
        AeadCodec::new().with_iterations(1_000)
    }

    #[test]
    fn raw_key_fixed_vector() {
        let codec = AeadCodec::with_random(FixedRandom(0x11));
        let envelope = codec.encrypt(PLAINTEXT, &raw_key(0x42), None).unwrap();
        assert_eq!(envelope.nonce, [0x11; NONCE_LEN]);
        assert_eq!(envelope.salt, [0x11; SALT_LEN]);
        assert_eq!(
            envelope.ciphertext,
            unhex("c8456e7e0ca5ec664cf533d21aa2ceb744456bd16f018824ba6ef4")
        );
        assert_eq!(envelope.tag.to_vec(), unhex("754be60ba00c4ad85e17f40365c23b9d"));
    }

    #[test]
    fn password_fixed_vector() {
        let codec = AeadCodec::with_random(FixedRandom(0x22));
        let key = KeyMaterial::password("correct horse").unwrap();
        let envelope = codec.encrypt(PLAINTEXT, &key, None).unwrap();
        assert_eq!(
            envelope.to_base64(),
            "lEQKO0FK0HDpUfY9j1VbuQQR0e7WAghfKmFQIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIiIs5SUDZ4tcbi2PN3XMN9NBg="
        );
        let decrypted = codec.decrypt(&envelope, &key, None).unwrap();
        assert_eq!(decrypted.as_slice(), PLAINTEXT);
    }

    #[test]
    fn ciphertext_is_plaintext_sized() {
        let envelope = AeadCodec::new().encrypt(PLAINTEXT, &raw_key(1), None).unwrap();
        assert_eq!(envelope.ciphertext.len(), PLAINTEXT.len());
        assert_eq!(envelope.encoded_len(), PLAINTEXT.len() + METADATA_LEN);
    }

    #[test]
    fn raw_round_trip_with_associated_data() {
        let codec = AeadCodec::new();
        let key = raw_key(7);
        let envelope = codec.encrypt(PLAINTEXT, &key, Some(b"context")).unwrap();
        let decrypted = codec.decrypt(&envelope, &key, Some(b"context")).unwrap();
        assert_eq!(decrypted.as_slice(), PLAINTEXT);
    }

    #[test]
    fn associated_data_mismatch_fails_auth() {
        let codec = fast_codec();
        let key = KeyMaterial::password("pw").unwrap();
        let envelope = codec.encrypt(PLAINTEXT, &key, Some(b"a")).unwrap();
        assert!(matches!(
            codec.decrypt(&envelope, &key, Some(b"b")),
            Err(CipherError::AuthenticationFailure)
        ));
        assert!(matches!(
            codec.decrypt(&envelope, &key, None),
            Err(CipherError::AuthenticationFailure)
        ));
    }

    #[test]
    fn self_describing_round_trip() {
        let codec = fast_codec();
        let key = KeyMaterial::password("pw").unwrap();
        let bytes = codec.encrypt(PLAINTEXT, &key, None).unwrap().to_bytes();
        let decrypted = codec.decrypt_bytes(&bytes, &key, None).unwrap();
        assert_eq!(decrypted.as_slice(), PLAINTEXT);
    }

    #[test]
    fn iteration_mismatch_fails_auth() {
        let key = KeyMaterial::password("pw").unwrap();
        let envelope = fast_codec().encrypt(PLAINTEXT, &key, None).unwrap();
        let other = AeadCodec::new().with_iterations(999);
        assert!(matches!(
            other.decrypt(&envelope, &key, None),
            Err(CipherError::AuthenticationFailure)
        ));
    }

    #[test]
    fn key_variant_mismatch_fails_auth() {
        let codec = fast_codec();
        let bytes = [9u8; KEY_LEN];
        let envelope = codec
            .encrypt(PLAINTEXT, &KeyMaterial::raw(&bytes).unwrap(), None)
            .unwrap();
        let as_password = KeyMaterial::password(bytes).unwrap();
        assert!(matches!(
            codec.decrypt(&envelope, &as_password, None),
            Err(CipherError::AuthenticationFailure)
        ));
    }

    #[test]
    fn tampered_salt_fails_auth_for_raw_keys() {
        let codec = AeadCodec::new();
        let key = raw_key(5);
        let mut envelope = codec.encrypt(PLAINTEXT, &key, None).unwrap();
        envelope.salt[0] ^= 0x01;
        assert!(matches!(
            codec.decrypt(&envelope, &key, None),
            Err(CipherError::AuthenticationFailure)
        ));
    }

    #[test]
    fn empty_plaintext_rejected() {
        assert!(matches!(
            AeadCodec::new().encrypt(b"", &raw_key(1), None),
            Err(CipherError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_ciphertext_rejected() {
        let envelope = Envelope::new(Vec::new(), [0; NONCE_LEN], [0; SALT_LEN], [0; TAG_LEN]);
        assert!(matches!(
            AeadCodec::new().decrypt(&envelope, &raw_key(1), None),
            Err(CipherError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_password_variant_rejected() {
        let key = KeyMaterial::Password(Zeroizing::new(Vec::new()));
        assert!(matches!(
            AeadCodec::new().encrypt(PLAINTEXT, &key, None),
            Err(CipherError::InvalidInput(_))
        ));
    }

    #[test]
    fn short_input_is_malformed() {
        assert!(matches!(
            AeadCodec::new().decrypt_bytes(&[0u8; 43], &raw_key(1), None),
            Err(CipherError::MalformedEnvelope(43))
        ));
    }

    #[test]
    fn random_failure_surfaces() {
        let codec = AeadCodec::with_random(FailingRandom);
        assert!(matches!(
            codec.encrypt(PLAINTEXT, &raw_key(1), None),
            Err(CipherError::RandomFailure)
        ));
    }

    #[test]
    fn successive_encryptions_differ() {
        let codec = AeadCodec::new();
        let key = raw_key(3);
        let a = codec.encrypt(PLAINTEXT, &key, None).unwrap();
        let b = codec.encrypt(PLAINTEXT, &key, None).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.to_bytes(), b.to_bytes());
    }
}
