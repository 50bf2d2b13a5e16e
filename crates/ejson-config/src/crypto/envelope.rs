//! Binary and Base64 layout of an encrypted payload.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::cipher::CipherError;
use super::{METADATA_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};

/// A parsed envelope: ciphertext plus everything needed to decrypt it.
///
/// Build one directly when nonce, salt and tag are stored separately from the
/// ciphertext; use [`Envelope::from_bytes`] when they trail it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Per-encryption GCM nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Per-encryption PBKDF2 salt.
    pub salt: [u8; SALT_LEN],
    /// GCM authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Assemble an envelope from its parts.
    pub fn new(
        ciphertext: Vec<u8>,
        nonce: [u8; NONCE_LEN],
        salt: [u8; SALT_LEN],
        tag: [u8; TAG_LEN],
    ) -> Self {
        Self {
            ciphertext,
            nonce,
            salt,
            tag,
        }
    }

    /// Length of the serialised envelope in bytes.
    pub fn encoded_len(&self) -> usize {
        self.ciphertext.len() + METADATA_LEN
    }

    /// Serialise as `ciphertext || nonce || salt || tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Split a serialised envelope from the end using the fixed field widths.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedEnvelope`] if `bytes` is shorter than
    /// [`METADATA_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let len = bytes.len();
        if len < METADATA_LEN {
            return Err(CipherError::MalformedEnvelope(len));
        }

        let (ciphertext, metadata) = bytes.split_at(len - METADATA_LEN);
        let (nonce, rest) = metadata.split_at(NONCE_LEN);
        let (salt, tag) = rest.split_at(SALT_LEN);

        Ok(Self {
            ciphertext: ciphertext.to_vec(),
            nonce: nonce
                .try_into()
                .map_err(|_| CipherError::MalformedEnvelope(len))?,
            salt: salt
                .try_into()
                .map_err(|_| CipherError::MalformedEnvelope(len))?,
            tag: tag
                .try_into()
                .map_err(|_| CipherError::MalformedEnvelope(len))?,
        })
    }

    /// Encode as standard, padded Base64 of [`Envelope::to_bytes`].
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decode a text envelope. The input is decoded exactly as given; surrounding
    /// whitespace is not stripped.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidBase64`] if `text` is not valid Base64, or
    /// [`CipherError::MalformedEnvelope`] if the decoded bytes are too short.
    pub fn from_base64(text: impl AsRef<[u8]>) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(text.as_ref())
            .map_err(|_| CipherError::InvalidBase64)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new(b"cipher".to_vec(), [1u8; NONCE_LEN], [2u8; SALT_LEN], [3u8; TAG_LEN])
    }

    #[test]
    fn layout_is_ciphertext_nonce_salt_tag() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), 6 + METADATA_LEN);
        assert_eq!(&bytes[..6], b"cipher");
        assert_eq!(&bytes[6..18], &[1u8; NONCE_LEN]);
        assert_eq!(&bytes[18..34], &[2u8; SALT_LEN]);
        assert_eq!(&bytes[34..], &[3u8; TAG_LEN]);
    }

    #[test]
    fn from_bytes_splits_from_the_end() {
        let parsed = Envelope::from_bytes(&sample().to_bytes()).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn exactly_metadata_len_yields_empty_ciphertext() {
        let parsed = Envelope::from_bytes(&[0u8; METADATA_LEN]).unwrap();
        assert!(parsed.ciphertext.is_empty());
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            Envelope::from_bytes(&[0u8; METADATA_LEN - 1]),
            Err(CipherError::MalformedEnvelope(43))
        ));
        assert!(matches!(
            Envelope::from_bytes(&[]),
            Err(CipherError::MalformedEnvelope(0))
        ));
    }

    #[test]
    fn base64_is_standard_padded() {
        let text = sample().to_base64();
        assert!(text.ends_with('='));
        assert_eq!(Envelope::from_base64(&text).unwrap(), sample());
    }

    #[test]
    fn base64_rejects_garbage_and_whitespace() {
        assert!(matches!(
            Envelope::from_base64("!!!not base64!!!"),
            Err(CipherError::InvalidBase64)
        ));
        let text = format!("{}\n", sample().to_base64());
        assert!(matches!(
            Envelope::from_base64(text),
            Err(CipherError::InvalidBase64)
        ));
    }
}
