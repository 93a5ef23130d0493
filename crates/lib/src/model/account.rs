//! Tenant accounts.

use chrono::{DateTime, Utc};

use super::{event::Event, secret::generate_user_salt};
use crate::{
    clock::Clock,
    ids::{AccountId, SecretId},
};

/// A tenant with its own keypair and event history.
///
/// The private key is only ever stored encrypted under the account's
/// key-encryption-key. `events` is always set; an empty vector means either
/// no events or that they were not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_id: AccountId,
    pub name: String,
    pub public_key: String,
    pub encrypted_private_key: String,
    /// Salt for deriving user pseudonyms, fixed for the account's lifetime
    pub user_salt: String,
    /// Once set the account accepts no new events. Never unset.
    pub retired: bool,
    /// Opaque presentation settings
    pub account_styles: String,
    pub created: DateTime<Utc>,
    pub events: Vec<Event>,
}

impl Account {
    /// Create a new account with a fresh id and pseudonym salt.
    pub fn new(
        name: impl Into<String>,
        public_key: impl Into<String>,
        encrypted_private_key: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            account_id: AccountId::generate(),
            name: name.into(),
            public_key: public_key.into(),
            encrypted_private_key: encrypted_private_key.into(),
            user_salt: generate_user_salt(),
            retired: false,
            account_styles: String::new(),
            created: clock.now_utc(),
            events: Vec::new(),
        }
    }

    /// The pseudonym of a real user within this account.
    pub fn secret_id_for(&self, user_id: impl AsRef<str>) -> SecretId {
        SecretId::derive(user_id, &self.user_salt)
    }

    /// Mark the account as retired. Retiring is permanent.
    pub fn retire(&mut self) {
        if !self.retired {
            tracing::info!(account_id = %self.account_id, "Retiring account");
        }
        self.retired = true;
    }
}
