//! Storage-shaped records.
//!
//! These mirror the relational tables: identifiers and foreign keys are
//! plain strings, nullable columns are `Option`, and association
//! collections are `Option<Vec<_>>` where `None` means "not loaded".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub secret_id: String,
    pub encrypted_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: String,
    pub sequence: String,
    pub account_id: String,
    /// Null for anonymous events
    pub secret_id: Option<String>,
    pub payload: String,
    /// The secret row joined on `secret_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TombstoneRecord {
    pub event_id: String,
    pub account_id: String,
    pub secret_id: Option<String>,
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub name: String,
    pub public_key: String,
    pub encrypted_private_key: String,
    pub user_salt: String,
    pub retired: bool,
    #[serde(default)]
    pub account_styles: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub events: Option<Vec<EventRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUserRecord {
    pub account_user_id: String,
    pub hashed_email: String,
    pub hashed_password: String,
    pub salt: String,
    /// 1 is super admin, 2 is read only
    pub admin_level: i32,
    #[serde(default)]
    pub relationships: Option<Vec<AccountUserRelationshipRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUserRelationshipRecord {
    pub relationship_id: String,
    pub account_user_id: String,
    pub account_id: String,
    pub password_encrypted_key_encryption_key: String,
    pub email_encrypted_key_encryption_key: String,
    pub one_time_encrypted_key_encryption_key: String,
}
