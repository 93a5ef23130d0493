//! Error types for the cryptographic primitives.
//!
//! Messages never carry key material, plaintext or ciphertext.

use thiserror::Error;

use crate::Error;

/// Errors raised by hashing, key derivation and sealing.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Argon2 parameters were rejected.
    #[error("Invalid key derivation parameters: {reason}")]
    InvalidParameters {
        /// Why the parameters were rejected
        reason: String,
    },

    /// Password hashing failed.
    #[error("Password hashing failed: {reason}")]
    HashingFailed {
        /// Description of the failure
        reason: String,
    },

    /// A stored password hash could not be parsed.
    #[error("Stored password hash is malformed")]
    MalformedPasswordHash,

    /// The password does not match the stored hash.
    #[error("Invalid password")]
    InvalidPassword,

    /// Key derivation failed.
    #[error("Key derivation failed: {reason}")]
    KeyDerivationFailed {
        /// Description of the failure
        reason: String,
    },

    /// The salt is too short for key derivation.
    #[error("Invalid salt length: expected at least {minimum}, got {actual}")]
    InvalidSaltLength {
        /// Minimum accepted length
        minimum: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A symmetric key has the wrong length.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A sealed value is not in `nonce.ciphertext` form.
    #[error("Malformed sealed value: {reason}")]
    MalformedSealedValue {
        /// Which part of the value is malformed
        reason: String,
    },

    /// Encryption failed.
    #[error("Sealing failed")]
    SealFailed,

    /// Decryption failed: wrong key or tampered ciphertext.
    #[error("Opening sealed value failed")]
    OpenFailed,
}

impl CryptoError {
    /// Check if this error means the supplied secret did not match.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, CryptoError::InvalidPassword | CryptoError::OpenFailed)
    }

    /// Check if this error is caused by malformed stored data.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CryptoError::MalformedPasswordHash | CryptoError::MalformedSealedValue { .. }
        )
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}
