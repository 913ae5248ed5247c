//! Envelope plaintext framing.
//!
//! ```text
//! topic (32) || payload_len (u16 BE) || payload || random padding
//! ```
//!
//! The envelope always fills the whole ciphertext region, so chunk size says
//! nothing about payload size.

use rand::{CryptoRng, RngCore};

use pss_core::constants::{
    CIPHERTEXT_SIZE, ENVELOPE_HEADER_SIZE, MAX_PAYLOAD_SIZE, PAYLOAD_LENGTH_SIZE, TOPIC_SIZE,
};
use pss_core::error::{PssError, Result};
use pss_core::types::Topic;

/// A decoded envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Message topic
    pub topic: Topic,
    /// Message payload
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Creates an envelope, checking the payload fits.
    pub fn new(topic: Topic, payload: Vec<u8>) -> Result<Self> {
        check_payload_size(payload.len())?;
        Ok(Self { topic, payload })
    }

    /// Serializes to exactly `CIPHERTEXT_SIZE` bytes with random padding.
    pub fn encode<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Vec<u8>> {
        check_payload_size(self.payload.len())?;
        let len = self.payload.len() as u16;

        let mut out = vec![0u8; CIPHERTEXT_SIZE];
        out[..TOPIC_SIZE].copy_from_slice(self.topic.as_bytes());
        out[TOPIC_SIZE..ENVELOPE_HEADER_SIZE].copy_from_slice(&len.to_be_bytes());

        let payload_end = ENVELOPE_HEADER_SIZE + self.payload.len();
        out[ENVELOPE_HEADER_SIZE..payload_end].copy_from_slice(&self.payload);
        rng.fill_bytes(&mut out[payload_end..]);

        Ok(out)
    }

    /// Parses a decrypted envelope.
    ///
    /// # Errors
    /// Returns `InvalidChunk` if the buffer is the wrong size or the length
    /// field points past the payload area.
    pub fn decode(plaintext: &[u8]) -> Result<Self> {
        if plaintext.len() != CIPHERTEXT_SIZE {
            return Err(PssError::InvalidChunk(format!(
                "envelope is {} bytes, expected {}",
                plaintext.len(),
                CIPHERTEXT_SIZE
            )));
        }

        let topic = Topic::from_bytes(&plaintext[..TOPIC_SIZE])?;
        let mut len_bytes = [0u8; PAYLOAD_LENGTH_SIZE];
        len_bytes.copy_from_slice(&plaintext[TOPIC_SIZE..ENVELOPE_HEADER_SIZE]);
        let len = u16::from_be_bytes(len_bytes) as usize;

        if len > MAX_PAYLOAD_SIZE {
            return Err(PssError::InvalidChunk(format!(
                "payload length {} exceeds {}",
                len, MAX_PAYLOAD_SIZE
            )));
        }

        Ok(Self {
            topic,
            payload: plaintext[ENVELOPE_HEADER_SIZE..ENVELOPE_HEADER_SIZE + len].to_vec(),
        })
    }
}

pub(crate) fn check_payload_size(len: usize) -> Result<()> {
    if len > MAX_PAYLOAD_SIZE {
        return Err(PssError::PayloadTooLarge {
            max: MAX_PAYLOAD_SIZE,
            actual: len,
        });
    }
    Ok(())
}
