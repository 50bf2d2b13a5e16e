//! Source of nonces and salts.

use aes_gcm::aead::{rand_core::RngCore, OsRng};

use super::cipher::CipherError;

/// Capability used by [`AeadCodec`](super::AeadCodec) to obtain nonce and salt bytes.
///
/// Production code uses [`OsRandom`]. Tests can supply a deterministic source to
/// check fixed vectors.
pub trait RandomSource {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::RandomFailure`] if the source cannot produce bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), CipherError>;
}

/// The operating system CSPRNG. Reentrant, so no locking is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CipherError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| CipherError::RandomFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_random_fills_distinct_buffers() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsRandom.fill(&mut a).unwrap();
        OsRandom.fill(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
