//! Error types for multi-channel key recovery.
//!
//! None of these errors carries factor material, keys or ciphertext.

use thiserror::Error;

use crate::{
    Error,
    ids::{AccountId, AccountUserId, RelationshipId},
    model::Channel,
};

/// Errors raised while issuing, unlocking or rotating key-encryption-keys.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// The factor does not decrypt this channel's ciphertext.
    #[error("Could not unlock {channel} channel of relationship {relationship_id}")]
    ChannelLocked {
        /// The relationship that was tried
        relationship_id: RelationshipId,
        /// The channel that was tried
        channel: Channel,
    },

    /// A channel decrypts to a different key than the others.
    #[error("{channel} channel of relationship {relationship_id} holds a divergent key-encryption-key")]
    DivergentKeyEncryptionKey {
        /// The corrupted relationship
        relationship_id: RelationshipId,
        /// The first channel found to disagree
        channel: Channel,
    },

    /// A channel decrypts to something that is not a key-encryption-key.
    #[error("{channel} channel of relationship {relationship_id} does not hold a valid key-encryption-key")]
    MalformedKeyEncryptionKey {
        /// The corrupted relationship
        relationship_id: RelationshipId,
        /// The offending channel
        channel: Channel,
    },

    /// The key-encryption-key does not decrypt the account's private key.
    #[error("Could not unlock private key of account {account_id}")]
    PrivateKeyLocked {
        /// The account
        account_id: AccountId,
    },

    /// Password verification failed for an account user.
    #[error("Invalid credentials for account user {account_user_id}")]
    InvalidCredentials {
        /// The account user
        account_user_id: AccountUserId,
    },

    /// Passwords are reset through the email or one-time channel only.
    #[error("Password cannot be reset through the {channel} channel")]
    ResetChannelNotAllowed {
        /// The channel that was offered
        channel: Channel,
    },

    /// Only super admins may grant access to other users.
    #[error("Account user {account_user_id} may not grant access")]
    InsufficientPermissions {
        /// The account user that attempted the grant
        account_user_id: AccountUserId,
    },
}

impl RecoveryError {
    /// Check if this error is a data integrity violation.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            RecoveryError::DivergentKeyEncryptionKey { .. }
                | RecoveryError::MalformedKeyEncryptionKey { .. }
        )
    }

    /// Check if this error means a factor or key did not unlock its ciphertext.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            RecoveryError::ChannelLocked { .. }
                | RecoveryError::PrivateKeyLocked { .. }
                | RecoveryError::InvalidCredentials { .. }
        )
    }
}

impl From<RecoveryError> for Error {
    fn from(err: RecoveryError) -> Self {
        Error::Recovery(err)
    }
}
