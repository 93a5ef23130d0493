//! One account together with its secrets and history.
//!
//! [`AccountLedger`] is where the ingestion and deletion rules live:
//! - retired accounts accept no new events
//! - a pseudonymous event needs its secret registered first
//! - sequences are strictly increasing within the account
//! - deletion replaces an event with its tombstone in place

use std::{collections::BTreeMap, sync::Arc};

use super::{
    account::Account,
    errors::ModelError,
    event::{Event, Subject, Tombstone},
    history::EventHistory,
    secret::Secret,
};
use crate::{
    Result,
    clock::Clock,
    ids::{EventId, SecretId, SequenceGenerator},
};

/// An account with its secrets, event history and sequence generator.
///
/// The ledger owns the account's events; the held [`Account`] keeps an
/// empty `events` vector until [`into_parts`](Self::into_parts) hands them
/// back.
#[derive(Debug)]
pub struct AccountLedger {
    account: Account,
    secrets: BTreeMap<SecretId, Secret>,
    history: EventHistory,
    sequences: SequenceGenerator,
    clock: Arc<dyn Clock>,
}

impl AccountLedger {
    /// Wrap an account, taking over the events it already carries.
    pub fn new(account: Account, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::from_parts(account, Vec::new(), Vec::new(), clock)
    }

    /// Rebuild a ledger from stored state.
    ///
    /// Fails if two secrets share an id with different ciphertext, if an
    /// event or tombstone belongs to another account, or if an event id is
    /// used twice.
    pub fn from_parts(
        mut account: Account,
        secrets: Vec<Secret>,
        tombstones: Vec<Tombstone>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let events = std::mem::take(&mut account.events);
        let mut ledger = Self {
            history: EventHistory::new(account.account_id.clone()),
            account,
            secrets: BTreeMap::new(),
            sequences: SequenceGenerator::new(),
            clock,
        };

        for secret in secrets {
            ledger.register_secret(secret)?;
        }
        for event in events {
            if let Subject::Pseudonymous(secret) = &event.subject {
                ledger.register_secret(secret.clone())?;
            }
            ledger.history.insert_event(event)?;
        }
        for tombstone in tombstones {
            ledger.history.insert_tombstone(tombstone)?;
        }
        ledger.sequences = SequenceGenerator::resume_after(ledger.history.last_sequence());

        tracing::debug!(
            account_id = %ledger.account.account_id,
            secrets = ledger.secrets.len(),
            active = ledger.history.active_count(),
            deleted = ledger.history.deleted_count(),
            "Loaded account ledger"
        );
        Ok(ledger)
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    pub fn secret(&self, secret_id: &SecretId) -> Option<&Secret> {
        self.secrets.get(secret_id)
    }

    pub fn secrets(&self) -> impl Iterator<Item = &Secret> {
        self.secrets.values()
    }

    /// Add a secret to the account.
    ///
    /// Registering an identical secret again is a no-op. A different
    /// ciphertext under an existing id is a conflict.
    pub fn register_secret(&mut self, secret: Secret) -> Result<()> {
        match self.secrets.get(&secret.secret_id) {
            Some(existing) if existing == &secret => Ok(()),
            Some(_) => {
                tracing::warn!(
                    account_id = %self.account.account_id,
                    secret_id = %secret.secret_id,
                    "Conflicting secret detected"
                );
                Err(ModelError::SecretConflict {
                    secret_id: secret.secret_id,
                }
                .into())
            }
            None => {
                self.secrets.insert(secret.secret_id.clone(), secret);
                Ok(())
            }
        }
    }

    /// Record a new event, anonymous when `secret_id` is `None`.
    ///
    /// The event id and sequence are assigned here.
    pub fn ingest(
        &mut self,
        secret_id: Option<SecretId>,
        payload: impl Into<String>,
    ) -> Result<Event> {
        self.ensure_active()?;

        let subject = match secret_id {
            None => Subject::Anonymous,
            Some(secret_id) => match self.secrets.get(&secret_id) {
                Some(secret) => Subject::Pseudonymous(secret.clone()),
                None => {
                    tracing::warn!(
                        account_id = %self.account.account_id,
                        %secret_id,
                        "Event references unknown secret"
                    );
                    return Err(ModelError::MissingSecret {
                        account_id: self.account.account_id.clone(),
                        secret_id,
                    }
                    .into());
                }
            },
        };

        let event_id = EventId::generate(self.clock.as_ref());
        let Some(sequence) = self.sequences.next(self.clock.as_ref()) else {
            let after = self.history.last_sequence().cloned().unwrap_or_default();
            tracing::warn!(
                account_id = %self.account.account_id,
                %after,
                "No sequence available above stored history"
            );
            return Err(ModelError::SequenceUnavailable {
                account_id: self.account.account_id.clone(),
                after,
            }
            .into());
        };
        let event = Event {
            event_id,
            sequence,
            account_id: self.account.account_id.clone(),
            subject,
            payload: payload.into(),
        };
        self.history.insert_event(event.clone())?;

        tracing::debug!(
            account_id = %event.account_id,
            event_id = %event.event_id,
            sequence = %event.sequence,
            "Ingested event"
        );
        Ok(event)
    }

    /// Record an event for a real user, creating their secret on first use.
    ///
    /// `encrypt_secret` is only called when the user has no secret in this
    /// account yet.
    pub fn ingest_for_user<F>(
        &mut self,
        user_id: impl AsRef<str>,
        encrypt_secret: F,
        payload: impl Into<String>,
    ) -> Result<Event>
    where
        F: FnOnce() -> Result<String>,
    {
        self.ensure_active()?;

        let secret_id = self.account.secret_id_for(user_id);
        if !self.secrets.contains_key(&secret_id) {
            let secret = Secret::new(secret_id.clone(), encrypt_secret()?);
            self.register_secret(secret)?;
            tracing::debug!(
                account_id = %self.account.account_id,
                %secret_id,
                "Created secret for new user"
            );
        }
        self.ingest(Some(secret_id), payload)
    }

    /// Replace one event with its tombstone.
    pub fn delete_event(&mut self, event_id: &EventId) -> Result<Tombstone> {
        self.history.delete(event_id)
    }

    /// Replace every active event of a real user with its tombstone.
    pub fn delete_user_events(&mut self, user_id: impl AsRef<str>) -> Vec<Tombstone> {
        let secret_id = self.account.secret_id_for(user_id);
        self.history.delete_by_secret(&secret_id)
    }

    /// Retire the account. Existing events stay readable and deletable.
    pub fn retire(&mut self) {
        self.account.retire();
    }

    /// Hand back the account with its active events, all secrets, and the tombstones.
    pub fn into_parts(self) -> (Account, Vec<Secret>, Vec<Tombstone>) {
        let mut account = self.account;
        let (events, tombstones) = self.history.into_parts();
        account.events = events;
        (account, self.secrets.into_values().collect(), tombstones)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.account.retired {
            return Err(ModelError::AccountRetired {
                account_id: self.account.account_id.clone(),
            }
            .into());
        }
        Ok(())
    }
}
