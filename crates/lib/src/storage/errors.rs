//! Error types for the storage boundary.
//!
//! Almost everything here is an integrity violation: the stored data breaks
//! an invariant of the domain model and must not be repaired silently.

use thiserror::Error;

use crate::{
    Error,
    ids::{AccountId, AccountUserId, EventId, RelationshipId, SecretId},
};

/// Errors raised while translating or validating stored records.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
    /// An event names a secret id but carries no joined secret.
    #[error("Event {event_id} references secret {secret_id} but no secret was joined")]
    MissingSecret {
        /// The event record
        event_id: EventId,
        /// The secret id it references
        secret_id: SecretId,
    },

    /// The joined secret is not the one the event references.
    #[error("Event {event_id} references secret {expected} but secret {actual} was joined")]
    SecretMismatch {
        /// The event record
        event_id: EventId,
        /// The secret id on the event
        expected: SecretId,
        /// The id of the joined secret
        actual: SecretId,
    },

    /// An anonymous event carries a joined secret.
    #[error("Anonymous event {event_id} carries secret {secret_id}")]
    UnexpectedSecret {
        /// The event record
        event_id: EventId,
        /// The id of the joined secret
        secret_id: SecretId,
    },

    /// An event references a secret missing from the secrets table.
    #[error("Event {event_id} references unknown secret {secret_id}")]
    UnknownSecret {
        /// The event record
        event_id: EventId,
        /// The missing secret
        secret_id: SecretId,
    },

    /// A joined secret differs from the secrets table.
    #[error("Joined secret {secret_id} differs from the stored secret")]
    SecretConflict {
        /// The contested secret
        secret_id: SecretId,
    },

    /// The secrets table holds the same id twice.
    #[error("Secret {secret_id} is stored more than once")]
    DuplicateSecret {
        /// The duplicated id
        secret_id: SecretId,
    },

    /// The accounts table holds the same id twice.
    #[error("Account {account_id} is stored more than once")]
    DuplicateAccount {
        /// The duplicated id
        account_id: AccountId,
    },

    /// Two event or tombstone records share an id.
    #[error("Event id {event_id} is stored more than once")]
    DuplicateEventId {
        /// The duplicated id
        event_id: EventId,
    },

    /// An event is nested under an account it does not belong to.
    #[error("Event {event_id} belongs to account {actual} but is stored under {expected}")]
    ForeignEvent {
        /// The event record
        event_id: EventId,
        /// The account it is stored under
        expected: AccountId,
        /// The account named on the event
        actual: AccountId,
    },

    /// An id is stored both as an event and as a tombstone.
    #[error("Event {event_id} is stored both as an event and as a tombstone")]
    EventTombstoneConflict {
        /// The contested id
        event_id: EventId,
    },

    /// A tombstone or relationship references an account that is not stored.
    #[error("Reference to unknown account {account_id}")]
    UnknownAccount {
        /// The missing account
        account_id: AccountId,
    },

    /// The account users table holds the same id twice.
    #[error("Account user {account_user_id} is stored more than once")]
    DuplicateAccountUser {
        /// The duplicated id
        account_user_id: AccountUserId,
    },

    /// Two relationship records share an id.
    #[error("Relationship {relationship_id} is stored more than once")]
    DuplicateRelationship {
        /// The duplicated id
        relationship_id: RelationshipId,
    },

    /// More than one relationship for the same (user, account) pair.
    #[error("Account user {account_user_id} has more than one relationship with account {account_id}")]
    DuplicateAccess {
        /// The account user
        account_user_id: AccountUserId,
        /// The account
        account_id: AccountId,
    },

    /// A relationship is nested under an account user it does not name.
    #[error("Relationship {relationship_id} is stored under account user {account_user_id}")]
    ForeignRelationship {
        /// The relationship record
        relationship_id: RelationshipId,
        /// The account user it is stored under
        account_user_id: AccountUserId,
    },

    /// A lookup named an account the snapshot does not hold.
    #[error("Account not found: {account_id}")]
    AccountNotFound {
        /// The requested account
        account_id: AccountId,
    },
}

impl StorageError {
    /// Check if this error is a data integrity violation.
    pub fn is_integrity_error(&self) -> bool {
        !self.is_not_found()
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::AccountNotFound { .. })
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}
