//! Error types for PSS.
//!
//! Every layer returns [`PssError`]. Variants are chosen so a caller can tell
//! "this chunk is not for me" apart from "this chunk is mine but I guessed the
//! wrong topic".

use thiserror::Error;

/// Result type alias using `PssError`.
pub type Result<T> = std::result::Result<T, PssError>;

/// Main error type for all PSS operations.
#[derive(Debug, Error)]
pub enum PssError {
    // ═══════════════════════════════════════════════════════════════════════════
    // KEY AND SIGNATURE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Malformed key or signature bytes.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Scalar out of range or point not on the curve.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Signature is malformed or does not recover to a public key.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// ECDSA signing failed internally.
    #[error("Signing failed: {0}")]
    SigningError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // WRAP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Payload plus framing does not fit in a chunk.
    #[error("Payload too large: max {max} bytes, got {actual}")]
    PayloadTooLarge { max: usize, actual: usize },

    /// A mining target is empty or longer than a chunk address.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Mining exhausted its attempt budget or deadline.
    #[error("Target unreachable after {attempts} attempts")]
    TargetUnreachable { attempts: u64 },

    /// Mining was cancelled by the caller.
    #[error("Mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    // ═══════════════════════════════════════════════════════════════════════════
    // UNWRAP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Authentication tag mismatch: wrong key, corrupted or foreign chunk.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The decrypted topic is not among the candidate topics.
    #[error("Topic mismatch")]
    TopicMismatch,

    /// Chunk has the wrong size or a malformed envelope.
    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION / INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PssError {
    /// Returns true if the chunk was not addressed to the key used to open it.
    ///
    /// A recipient holding several keys keeps trying on this error only.
    pub fn is_not_for_us(&self) -> bool {
        matches!(self, PssError::AuthenticationFailed)
    }

    /// Returns true if this is a cryptographic error.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            PssError::InvalidKey(_)
                | PssError::InvalidSignature(_)
                | PssError::SigningError(_)
                | PssError::AuthenticationFailed
        )
    }

    /// Returns true if this is a validation error on caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            PssError::InvalidEncoding(_)
                | PssError::PayloadTooLarge { .. }
                | PssError::InvalidTarget(_)
                | PssError::InvalidChunk(_)
                | PssError::ConfigError(_)
        )
    }

    /// Returns true if mining stopped before finding a matching nonce.
    pub fn is_mining_error(&self) -> bool {
        matches!(
            self,
            PssError::TargetUnreachable { .. } | PssError::Cancelled { .. }
        )
    }
}
