//! PBKDF2-HMAC-SHA512 key derivation.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

use super::cipher::CipherError;
use super::KEY_LEN;

/// Default PBKDF2 iteration count. Both ends of an encrypt/decrypt pair must agree.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive `output_len` bytes from `password` and `salt` using PBKDF2 with
/// HMAC-SHA512.
///
/// The same inputs always yield the same output.
///
/// # Errors
///
/// Returns [`CipherError::InvalidInput`] if `password` or `salt` is empty, or if
/// `output_len` or `iterations` is zero.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    output_len: usize,
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    if output_len == 0 {
        return Err(CipherError::InvalidInput("derived key length must be > 0"));
    }
    validate(password, salt, iterations)?;

    let mut out = Zeroizing::new(vec![0u8; output_len]);
    pbkdf2_hmac::<Sha512>(password, salt, iterations, out.as_mut_slice());
    Ok(out)
}

/// Derive an AES-256 key, avoiding a heap allocation for the key bytes.
pub(crate) fn derive_aes_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CipherError> {
    validate(password, salt, iterations)?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha512>(password, salt, iterations, key.as_mut_slice());
    Ok(key)
}

fn validate(password: &[u8], salt: &[u8], iterations: u32) -> Result<(), CipherError> {
    if password.is_empty() {
        return Err(CipherError::InvalidInput("password must not be empty"));
    }
    if salt.is_empty() {
        return Err(CipherError::InvalidInput("salt must not be empty"));
    }
    if iterations == 0 {
        return Err(CipherError::InvalidInput("PBKDF2 iteration count must be > 0"));
    }
    Ok(())
}
