//! Account users and their per-account key relationships.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::ModelError;
use crate::{
    Result,
    ids::{AccountId, AccountUserId, RelationshipId},
};

/// Capability level of an account user.
///
/// Stored as an ordinal: 1 is super admin, 2 is read only. Lower ordinals
/// carry more capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminLevel {
    SuperAdmin,
    ReadOnly,
}

impl AdminLevel {
    pub fn ordinal(self) -> i32 {
        match self {
            AdminLevel::SuperAdmin => 1,
            AdminLevel::ReadOnly => 2,
        }
    }

    /// Whether this level may grant or revoke access for other users.
    pub fn can_manage_users(self) -> bool {
        matches!(self, AdminLevel::SuperAdmin)
    }
}

impl TryFrom<i32> for AdminLevel {
    type Error = ModelError;

    fn try_from(level: i32) -> std::result::Result<Self, Self::Error> {
        match level {
            1 => Ok(AdminLevel::SuperAdmin),
            2 => Ok(AdminLevel::ReadOnly),
            level => Err(ModelError::UnknownAdminLevel { level }),
        }
    }
}

/// One of the three independent ways to recover a key-encryption-key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Password,
    Email,
    OneTime,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Password, Channel::Email, Channel::OneTime];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Password => "password",
            Channel::Email => "email",
            Channel::OneTime => "one-time",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grants one account user access to one account.
///
/// Carries the same key-encryption-key three times, each copy encrypted
/// under a different recovery factor. Any one copy is enough to decrypt the
/// account's private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUserRelationship {
    pub relationship_id: RelationshipId,
    pub account_user_id: AccountUserId,
    pub account_id: AccountId,
    pub password_encrypted_key_encryption_key: String,
    pub email_encrypted_key_encryption_key: String,
    pub one_time_encrypted_key_encryption_key: String,
}

impl AccountUserRelationship {
    /// The ciphertext recoverable through `channel`.
    pub fn encrypted_key_encryption_key(&self, channel: Channel) -> &str {
        match channel {
            Channel::Password => &self.password_encrypted_key_encryption_key,
            Channel::Email => &self.email_encrypted_key_encryption_key,
            Channel::OneTime => &self.one_time_encrypted_key_encryption_key,
        }
    }

    /// Replace the ciphertext of one channel, leaving the others untouched.
    pub fn set_encrypted_key_encryption_key(&mut self, channel: Channel, ciphertext: String) {
        let field = match channel {
            Channel::Password => &mut self.password_encrypted_key_encryption_key,
            Channel::Email => &mut self.email_encrypted_key_encryption_key,
            Channel::OneTime => &mut self.one_time_encrypted_key_encryption_key,
        };
        *field = ciphertext;
    }
}

/// A person who can log in and access the accounts they are related to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUser {
    pub account_user_id: AccountUserId,
    pub hashed_email: String,
    pub hashed_password: String,
    /// Salt for hashing the email and deriving recovery keys
    pub salt: String,
    pub admin_level: AdminLevel,
    pub relationships: Vec<AccountUserRelationship>,
}

impl AccountUser {
    pub fn relationship(&self, account_id: &AccountId) -> Option<&AccountUserRelationship> {
        self.relationships
            .iter()
            .find(|r| &r.account_id == account_id)
    }

    pub fn relationship_mut(
        &mut self,
        account_id: &AccountId,
    ) -> Option<&mut AccountUserRelationship> {
        self.relationships
            .iter_mut()
            .find(|r| &r.account_id == account_id)
    }

    /// Like [`relationship`](Self::relationship), but a missing relationship is an error.
    pub fn require_relationship(&self, account_id: &AccountId) -> Result<&AccountUserRelationship> {
        self.relationship(account_id).ok_or_else(|| {
            ModelError::RelationshipNotFound {
                account_user_id: self.account_user_id.clone(),
                account_id: account_id.clone(),
            }
            .into()
        })
    }

    /// Accounts this user can access.
    pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.relationships.iter().map(|r| &r.account_id)
    }

    /// Attach a relationship, keeping one relationship per account.
    pub fn add_relationship(&mut self, relationship: AccountUserRelationship) -> Result<()> {
        self.check_relationship(&relationship)?;
        if self.relationship(&relationship.account_id).is_some() {
            return Err(self.duplicate(&relationship.account_id).into());
        }
        self.relationships.push(relationship);
        Ok(())
    }

    /// Detach the relationship with an account, if any.
    pub fn remove_relationship(&mut self, account_id: &AccountId) -> Option<AccountUserRelationship> {
        let index = self
            .relationships
            .iter()
            .position(|r| &r.account_id == account_id)?;
        Some(self.relationships.remove(index))
    }

    /// Check that every relationship names this user and no account appears twice.
    pub fn validate_relationships(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for relationship in &self.relationships {
            self.check_relationship(relationship)?;
            if !seen.insert(&relationship.account_id) {
                tracing::warn!(
                    account_user_id = %self.account_user_id,
                    account_id = %relationship.account_id,
                    "Duplicate relationship detected"
                );
                return Err(self.duplicate(&relationship.account_id).into());
            }
        }
        Ok(())
    }

    fn check_relationship(&self, relationship: &AccountUserRelationship) -> Result<()> {
        if relationship.account_user_id != self.account_user_id {
            return Err(ModelError::ForeignRelationship {
                relationship_id: relationship.relationship_id.clone(),
                account_user_id: self.account_user_id.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn duplicate(&self, account_id: &AccountId) -> ModelError {
        ModelError::DuplicateRelationship {
            account_user_id: self.account_user_id.clone(),
            account_id: account_id.clone(),
        }
    }
}
