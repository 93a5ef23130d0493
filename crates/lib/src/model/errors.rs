//! Error types for the domain model.
//!
//! Integrity violations are fatal and must abort the surrounding operation.
//! Lifecycle errors reject a transition the model does not allow. Neither
//! ever carries payloads, secrets or ciphertext, only identifiers.

use thiserror::Error;

use crate::{
    Error,
    ids::{AccountId, AccountUserId, EventId, RelationshipId, SecretId, Sequence},
};

/// Errors raised by the domain model.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    /// An event references a secret the account does not hold.
    #[error("Secret {secret_id} does not exist for account {account_id}")]
    MissingSecret {
        /// Account the event belongs to
        account_id: AccountId,
        /// The referenced secret
        secret_id: SecretId,
    },

    /// Two different secrets claim the same id.
    #[error("Conflicting secret records for {secret_id}")]
    SecretConflict {
        /// The contested secret id
        secret_id: SecretId,
    },

    /// An event id is already taken by an event or a tombstone.
    #[error("Event {event_id} already exists")]
    DuplicateEvent {
        /// The duplicated event id
        event_id: EventId,
    },

    /// An event or tombstone does not belong to the account holding it.
    #[error("Event {event_id} belongs to account {actual}, not {expected}")]
    ForeignAccount {
        /// The offending event id
        event_id: EventId,
        /// The account that holds the history
        expected: AccountId,
        /// The account recorded on the event
        actual: AccountId,
    },

    /// No event or tombstone with this id exists.
    #[error("Event not found: {event_id}")]
    EventNotFound {
        /// The requested event id
        event_id: EventId,
    },

    /// The event was already replaced by a tombstone.
    #[error("Event {event_id} is already deleted")]
    EventAlreadyDeleted {
        /// The deleted event id
        event_id: EventId,
    },

    /// No sequence sorting above the stored history can be issued.
    #[error("No sequence above {after} is available for account {account_id}")]
    SequenceUnavailable {
        /// The account
        account_id: AccountId,
        /// Highest stored sequence
        after: Sequence,
    },

    /// The account is retired and accepts no new events.
    #[error("Account {account_id} is retired")]
    AccountRetired {
        /// The retired account
        account_id: AccountId,
    },

    /// A second relationship for the same (user, account) pair.
    #[error("Account user {account_user_id} already has a relationship with account {account_id}")]
    DuplicateRelationship {
        /// The account user
        account_user_id: AccountUserId,
        /// The account
        account_id: AccountId,
    },

    /// A relationship was attached to an account user it does not name.
    #[error("Relationship {relationship_id} does not belong to account user {account_user_id}")]
    ForeignRelationship {
        /// The relationship
        relationship_id: RelationshipId,
        /// The account user it was attached to
        account_user_id: AccountUserId,
    },

    /// The account user has no relationship with the account.
    #[error("Account user {account_user_id} has no access to account {account_id}")]
    RelationshipNotFound {
        /// The account user
        account_user_id: AccountUserId,
        /// The account
        account_id: AccountId,
    },

    /// An admin level ordinal outside the known levels.
    #[error("Unknown admin level: {level}")]
    UnknownAdminLevel {
        /// The stored ordinal
        level: i32,
    },
}

impl ModelError {
    /// Check if this error is a data integrity violation.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            ModelError::MissingSecret { .. }
                | ModelError::SecretConflict { .. }
                | ModelError::DuplicateEvent { .. }
                | ModelError::ForeignAccount { .. }
                | ModelError::SequenceUnavailable { .. }
                | ModelError::DuplicateRelationship { .. }
                | ModelError::ForeignRelationship { .. }
                | ModelError::UnknownAdminLevel { .. }
        )
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ModelError::EventNotFound { .. } | ModelError::RelationshipNotFound { .. }
        )
    }

    /// Check if this error rejects a lifecycle transition.
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(
            self,
            ModelError::EventAlreadyDeleted { .. } | ModelError::AccountRetired { .. }
        )
    }
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Error::Model(err)
    }
}
