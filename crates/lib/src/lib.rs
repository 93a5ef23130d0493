//!
//! EventVault: pseudonymous analytics event storage for multi-tenant accounts.
//!
//! The library models how encrypted key material and pseudonymous event
//! streams are laid out so that the storage layer never sees plaintext
//! secrets, while authorized account users can recover an account's private
//! key through any one of three independent channels.
//!
//! ## Core Concepts
//!
//! * **Accounts (`model::Account`)**: tenants with a public key, a private key
//!   encrypted under a key-encryption-key (KEK), and a salt for pseudonyms.
//! * **Secrets (`model::Secret`)**: per-(user, account) pseudonyms derived from
//!   the account's salt, carrying a secret only the account owner can decrypt.
//! * **Events and Tombstones (`model::Event`, `model::Tombstone`)**: the
//!   append-only, sequence-ordered history of an account. Deleting an event
//!   replaces it in place with a tombstone.
//! * **Ledgers (`model::AccountLedger`)**: one account with its secrets and
//!   history, enforcing ingestion and deletion rules.
//! * **Account users (`model::AccountUser`)**: people who hold, per account, the
//!   same KEK encrypted three times (password, email, one-time token).
//! * **Recovery (`recovery`)**: issuing, unlocking, verifying and rotating the
//!   three KEK channels.
//! * **Storage (`storage`)**: storage-shaped records and the lossless
//!   translation between them and the domain model.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod ids;
pub mod model;
pub mod recovery;
pub mod storage;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use config::{KdfParams, VaultConfig};
pub use ids::{
    AccountId, AccountUserId, EventId, RelationshipId, SecretId, Sequence, SequenceGenerator,
};

/// Result type used throughout the EventVault library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the EventVault library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured domain model errors from the model module
    #[error(transparent)]
    Model(model::ModelError),

    /// Structured cryptographic errors from the crypto module
    #[error(transparent)]
    Crypto(crypto::CryptoError),

    /// Structured key recovery errors from the recovery module
    #[error(transparent)]
    Recovery(recovery::RecoveryError),

    /// Structured translation errors from the storage module
    #[error(transparent)]
    Storage(storage::StorageError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Model(_) => "model",
            Error::Crypto(_) => "crypto",
            Error::Recovery(_) => "recovery",
            Error::Storage(_) => "storage",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is a data integrity violation.
    ///
    /// Integrity violations are fatal: the operation must be aborted and the
    /// data must never be repaired automatically.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Model(err) => err.is_integrity_error(),
            Error::Recovery(err) => err.is_integrity_error(),
            Error::Storage(err) => err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Model(err) => err.is_not_found(),
            Error::Storage(err) => err.is_not_found(),
            Error::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error means a factor or key did not unlock its ciphertext.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Crypto(err) => err.is_authentication_failure(),
            Error::Recovery(err) => err.is_authentication_failure(),
            _ => false,
        }
    }

    /// Check if this error is a rejected lifecycle transition.
    pub fn is_lifecycle_error(&self) -> bool {
        match self {
            Error::Model(err) => err.is_lifecycle_error(),
            _ => false,
        }
    }
}
