//! Translation between storage records and domain objects.
//!
//! Translation is pure: no I/O, no shared state. Exporting a record
//! validates it against the domain invariants; importing a domain object
//! never fails.
//!
//! `Import::import(&record.export()?)` gives back the record, except that an
//! unloaded collection (`None`) comes back as an empty loaded one.

use super::{
    errors::StorageError,
    records::{
        AccountRecord, AccountUserRecord, AccountUserRelationshipRecord, EventRecord,
        SecretRecord, TombstoneRecord,
    },
};
use crate::{
    Result,
    model::{
        Account, AccountUser, AccountUserRelationship, AdminLevel, Event, Secret, Subject,
        Tombstone,
    },
};

/// Convert a storage record into its domain object.
pub trait Export {
    type Domain;

    fn export(&self) -> Result<Self::Domain>;
}

/// Build a storage record from a domain object.
pub trait Import: Sized {
    type Domain;

    fn import(domain: &Self::Domain) -> Self;
}

/// Export every record, in order, stopping at the first failure.
pub fn export_all<R: Export>(records: &[R]) -> Result<Vec<R::Domain>> {
    records.iter().map(R::export).collect()
}

/// Import every domain object, in order.
pub fn import_all<R: Import>(domains: &[R::Domain]) -> Vec<R> {
    domains.iter().map(R::import).collect()
}

impl Export for SecretRecord {
    type Domain = Secret;

    fn export(&self) -> Result<Secret> {
        Ok(Secret::new(
            self.secret_id.as_str().into(),
            self.encrypted_secret.clone(),
        ))
    }
}

impl Import for SecretRecord {
    type Domain = Secret;

    fn import(secret: &Secret) -> Self {
        Self {
            secret_id: secret.secret_id.to_string(),
            encrypted_secret: secret.encrypted_secret.clone(),
        }
    }
}

impl Export for EventRecord {
    type Domain = Event;

    fn export(&self) -> Result<Event> {
        let subject = match (&self.secret_id, &self.secret) {
            (None, None) => Subject::Anonymous,
            (None, Some(secret)) => {
                return Err(StorageError::UnexpectedSecret {
                    event_id: self.event_id.as_str().into(),
                    secret_id: secret.secret_id.as_str().into(),
                }
                .into());
            }
            (Some(secret_id), None) => {
                return Err(StorageError::MissingSecret {
                    event_id: self.event_id.as_str().into(),
                    secret_id: secret_id.as_str().into(),
                }
                .into());
            }
            (Some(secret_id), Some(secret)) => {
                if &secret.secret_id != secret_id {
                    return Err(StorageError::SecretMismatch {
                        event_id: self.event_id.as_str().into(),
                        expected: secret_id.as_str().into(),
                        actual: secret.secret_id.as_str().into(),
                    }
                    .into());
                }
                Subject::Pseudonymous(secret.export()?)
            }
        };

        Ok(Event {
            event_id: self.event_id.as_str().into(),
            sequence: self.sequence.as_str().into(),
            account_id: self.account_id.as_str().into(),
            subject,
            payload: self.payload.clone(),
        })
    }
}

impl Import for EventRecord {
    type Domain = Event;

    fn import(event: &Event) -> Self {
        Self {
            event_id: event.event_id.to_string(),
            sequence: event.sequence.to_string(),
            account_id: event.account_id.to_string(),
            secret_id: event.secret_id().map(ToString::to_string),
            payload: event.payload.clone(),
            secret: event.subject.secret().map(SecretRecord::import),
        }
    }
}

impl Export for TombstoneRecord {
    type Domain = Tombstone;

    fn export(&self) -> Result<Tombstone> {
        Ok(Tombstone {
            event_id: self.event_id.as_str().into(),
            account_id: self.account_id.as_str().into(),
            secret_id: self.secret_id.as_deref().map(Into::into),
            sequence: self.sequence.as_str().into(),
        })
    }
}

impl Import for TombstoneRecord {
    type Domain = Tombstone;

    fn import(tombstone: &Tombstone) -> Self {
        Self {
            event_id: tombstone.event_id.to_string(),
            account_id: tombstone.account_id.to_string(),
            secret_id: tombstone.secret_id.as_ref().map(ToString::to_string),
            sequence: tombstone.sequence.to_string(),
        }
    }
}

impl Export for AccountRecord {
    type Domain = Account;

    fn export(&self) -> Result<Account> {
        let events = match &self.events {
            Some(events) => export_all(events)?,
            None => Vec::new(),
        };
        tracing::debug!(
            account_id = %self.account_id,
            events = events.len(),
            loaded = self.events.is_some(),
            "Exported account record"
        );

        Ok(Account {
            account_id: self.account_id.as_str().into(),
            name: self.name.clone(),
            public_key: self.public_key.clone(),
            encrypted_private_key: self.encrypted_private_key.clone(),
            user_salt: self.user_salt.clone(),
            retired: self.retired,
            account_styles: self.account_styles.clone(),
            created: self.created,
            events,
        })
    }
}

impl Import for AccountRecord {
    type Domain = Account;

    fn import(account: &Account) -> Self {
        Self {
            account_id: account.account_id.to_string(),
            name: account.name.clone(),
            public_key: account.public_key.clone(),
            encrypted_private_key: account.encrypted_private_key.clone(),
            user_salt: account.user_salt.clone(),
            retired: account.retired,
            account_styles: account.account_styles.clone(),
            created: account.created,
            events: Some(import_all(&account.events)),
        }
    }
}

impl Export for AccountUserRelationshipRecord {
    type Domain = AccountUserRelationship;

    fn export(&self) -> Result<AccountUserRelationship> {
        Ok(AccountUserRelationship {
            relationship_id: self.relationship_id.as_str().into(),
            account_user_id: self.account_user_id.as_str().into(),
            account_id: self.account_id.as_str().into(),
            password_encrypted_key_encryption_key: self
                .password_encrypted_key_encryption_key
                .clone(),
            email_encrypted_key_encryption_key: self.email_encrypted_key_encryption_key.clone(),
            one_time_encrypted_key_encryption_key: self
                .one_time_encrypted_key_encryption_key
                .clone(),
        })
    }
}

impl Import for AccountUserRelationshipRecord {
    type Domain = AccountUserRelationship;

    fn import(relationship: &AccountUserRelationship) -> Self {
        Self {
            relationship_id: relationship.relationship_id.to_string(),
            account_user_id: relationship.account_user_id.to_string(),
            account_id: relationship.account_id.to_string(),
            password_encrypted_key_encryption_key: relationship
                .password_encrypted_key_encryption_key
                .clone(),
            email_encrypted_key_encryption_key: relationship
                .email_encrypted_key_encryption_key
                .clone(),
            one_time_encrypted_key_encryption_key: relationship
                .one_time_encrypted_key_encryption_key
                .clone(),
        }
    }
}

impl Export for AccountUserRecord {
    type Domain = AccountUser;

    fn export(&self) -> Result<AccountUser> {
        let relationships = match &self.relationships {
            Some(relationships) => export_all(relationships)?,
            None => Vec::new(),
        };

        let user = AccountUser {
            account_user_id: self.account_user_id.as_str().into(),
            hashed_email: self.hashed_email.clone(),
            hashed_password: self.hashed_password.clone(),
            salt: self.salt.clone(),
            admin_level: AdminLevel::try_from(self.admin_level)?,
            relationships,
        };
        user.validate_relationships()?;
        Ok(user)
    }
}

impl Import for AccountUserRecord {
    type Domain = AccountUser;

    fn import(user: &AccountUser) -> Self {
        Self {
            account_user_id: user.account_user_id.to_string(),
            hashed_email: user.hashed_email.clone(),
            hashed_password: user.hashed_password.clone(),
            salt: user.salt.clone(),
            admin_level: user.admin_level.ordinal(),
            relationships: Some(import_all(&user.relationships)),
        }
    }
}
