//! A serializable dump of every table.
//!
//! [`StorageSnapshot`] holds the records of all tables in one document. It
//! is what the CLI inspects and what tests use as a stand-in for a database.
//! [`StorageSnapshot::validate`] checks the invariants that span tables,
//! which no single record can check on its own.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::Path,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use super::{
    errors::StorageError,
    records::{AccountRecord, AccountUserRecord, EventRecord, SecretRecord, TombstoneRecord},
    translate::{Export, Import, export_all, import_all},
};
use crate::{
    Result,
    clock::{Clock, SystemClock},
    ids::AccountId,
    model::{AccountLedger, AccountUser, Secret, Tombstone},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSnapshot {
    pub accounts: Vec<AccountRecord>,
    pub secrets: Vec<SecretRecord>,
    pub tombstones: Vec<TombstoneRecord>,
    pub account_users: Vec<AccountUserRecord>,
}

/// Table counts of a validated snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub accounts: usize,
    pub retired_accounts: usize,
    /// Accounts whose events were not loaded
    pub unloaded_accounts: usize,
    pub events: usize,
    pub anonymous_events: usize,
    pub tombstones: usize,
    pub secrets: usize,
    /// Secrets no event or tombstone refers to
    pub orphaned_secrets: usize,
    pub account_users: usize,
    pub relationships: usize,
}

impl StorageSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let snapshot: Self = serde_json::from_str(&data)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            accounts = snapshot.accounts.len(),
            "Loaded storage snapshot"
        );
        Ok(snapshot)
    }

    /// Write the snapshot to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Build a snapshot from ledgers and account users.
    ///
    /// Fails when two ledgers hold the same secret id with different
    /// ciphertext.
    pub fn from_ledgers(
        ledgers: Vec<AccountLedger>,
        account_users: &[AccountUser],
    ) -> Result<Self> {
        let mut snapshot = Self {
            account_users: import_all(account_users),
            ..Self::default()
        };
        let mut secrets: BTreeMap<_, SecretRecord> = BTreeMap::new();

        for ledger in ledgers {
            let (account, account_secrets, tombstones) = ledger.into_parts();
            snapshot.accounts.push(AccountRecord::import(&account));
            snapshot
                .tombstones
                .extend(tombstones.iter().map(TombstoneRecord::import));
            for secret in account_secrets {
                let record = SecretRecord::import(&secret);
                match secrets.get(&secret.secret_id) {
                    Some(existing) if existing == &record => {}
                    Some(_) => {
                        tracing::warn!(
                            account_id = %account.account_id,
                            secret_id = %secret.secret_id,
                            "Conflicting secret across ledgers"
                        );
                        return Err(StorageError::SecretConflict {
                            secret_id: secret.secret_id,
                        }
                        .into());
                    }
                    None => {
                        secrets.insert(secret.secret_id.clone(), record);
                    }
                }
            }
        }
        snapshot.secrets = secrets.into_values().collect();
        Ok(snapshot)
    }

    /// Check every cross-table invariant and count what the tables hold.
    ///
    /// Stops at the first violation.
    pub fn validate(&self) -> Result<SnapshotSummary> {
        let secrets = self.secret_table()?;
        let mut referenced: HashSet<&str> = HashSet::new();
        let mut summary = SnapshotSummary {
            accounts: self.accounts.len(),
            secrets: secrets.len(),
            tombstones: self.tombstones.len(),
            account_users: self.account_users.len(),
            ..SnapshotSummary::default()
        };

        let mut accounts = HashSet::new();
        let mut event_ids = HashSet::new();
        for account in &self.accounts {
            if !accounts.insert(account.account_id.as_str()) {
                return Err(StorageError::DuplicateAccount {
                    account_id: account.account_id.as_str().into(),
                }
                .into());
            }
            summary.retired_accounts += usize::from(account.retired);

            let Some(events) = &account.events else {
                summary.unloaded_accounts += 1;
                continue;
            };
            for event in events {
                if event.account_id != account.account_id {
                    return Err(StorageError::ForeignEvent {
                        event_id: event.event_id.as_str().into(),
                        expected: account.account_id.as_str().into(),
                        actual: event.account_id.as_str().into(),
                    }
                    .into());
                }
                if !event_ids.insert(event.event_id.as_str()) {
                    return Err(StorageError::DuplicateEventId {
                        event_id: event.event_id.as_str().into(),
                    }
                    .into());
                }
                match &event.secret_id {
                    Some(secret_id) => {
                        check_joined_secret(event, secret_id, &secrets)?;
                        referenced.insert(secret_id.as_str());
                    }
                    None => summary.anonymous_events += 1,
                }
                summary.events += 1;
            }
        }

        let mut tombstone_ids = HashSet::new();
        for tombstone in &self.tombstones {
            if !accounts.contains(tombstone.account_id.as_str()) {
                return Err(unknown_account(&tombstone.account_id));
            }
            if event_ids.contains(tombstone.event_id.as_str()) {
                tracing::warn!(event_id = %tombstone.event_id, "Event stored as event and tombstone");
                return Err(StorageError::EventTombstoneConflict {
                    event_id: tombstone.event_id.as_str().into(),
                }
                .into());
            }
            if !tombstone_ids.insert(tombstone.event_id.as_str()) {
                return Err(StorageError::DuplicateEventId {
                    event_id: tombstone.event_id.as_str().into(),
                }
                .into());
            }
            if let Some(secret_id) = &tombstone.secret_id {
                referenced.insert(secret_id.as_str());
            }
        }
        summary.orphaned_secrets = secrets
            .keys()
            .filter(|id| !referenced.contains(*id))
            .count();

        let mut users = HashSet::new();
        let mut relationship_ids = HashSet::new();
        let mut access = HashSet::new();
        for user in &self.account_users {
            if !users.insert(user.account_user_id.as_str()) {
                return Err(StorageError::DuplicateAccountUser {
                    account_user_id: user.account_user_id.as_str().into(),
                }
                .into());
            }
            for relationship in user.relationships.iter().flatten() {
                if relationship.account_user_id != user.account_user_id {
                    return Err(StorageError::ForeignRelationship {
                        relationship_id: relationship.relationship_id.as_str().into(),
                        account_user_id: user.account_user_id.as_str().into(),
                    }
                    .into());
                }
                if !relationship_ids.insert(relationship.relationship_id.as_str()) {
                    return Err(StorageError::DuplicateRelationship {
                        relationship_id: relationship.relationship_id.as_str().into(),
                    }
                    .into());
                }
                if !access.insert((
                    relationship.account_user_id.as_str(),
                    relationship.account_id.as_str(),
                )) {
                    tracing::warn!(
                        account_user_id = %relationship.account_user_id,
                        account_id = %relationship.account_id,
                        "Duplicate relationship detected"
                    );
                    return Err(StorageError::DuplicateAccess {
                        account_user_id: relationship.account_user_id.as_str().into(),
                        account_id: relationship.account_id.as_str().into(),
                    }
                    .into());
                }
                if !accounts.contains(relationship.account_id.as_str()) {
                    return Err(unknown_account(&relationship.account_id));
                }
                summary.relationships += 1;
            }
            user.export()?;
        }

        // Ledgers enforce the remaining per-account rules
        self.ledgers(Arc::new(SystemClock))?;

        tracing::debug!(
            accounts = summary.accounts,
            events = summary.events,
            tombstones = summary.tombstones,
            "Validated storage snapshot"
        );
        Ok(summary)
    }

    /// One ledger per account, with secrets joined from the secrets table.
    pub fn ledgers(&self, clock: Arc<dyn Clock>) -> Result<Vec<AccountLedger>> {
        let secrets = self.secret_table()?;
        let mut tombstones = self.tombstones_by_account()?;

        self.accounts
            .iter()
            .map(|account| {
                let account_tombstones = tombstones
                    .remove(account.account_id.as_str())
                    .unwrap_or_default();
                build_ledger(account, account_tombstones, &secrets, clock.clone())
            })
            .collect()
    }

    /// The ledger of one account.
    pub fn ledger(&self, account_id: &AccountId, clock: Arc<dyn Clock>) -> Result<AccountLedger> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.account_id == account_id.as_str())
            .ok_or_else(|| StorageError::AccountNotFound {
                account_id: account_id.clone(),
            })?;
        let secrets = self.secret_table()?;
        let tombstones = self
            .tombstones_by_account()?
            .remove(account_id.as_str())
            .unwrap_or_default();
        build_ledger(account, tombstones, &secrets, clock)
    }

    pub fn account_users(&self) -> Result<Vec<AccountUser>> {
        export_all(&self.account_users)
    }

    fn secret_table(&self) -> Result<HashMap<&str, &SecretRecord>> {
        let mut table = HashMap::with_capacity(self.secrets.len());
        for secret in &self.secrets {
            if table.insert(secret.secret_id.as_str(), secret).is_some() {
                return Err(StorageError::DuplicateSecret {
                    secret_id: secret.secret_id.as_str().into(),
                }
                .into());
            }
        }
        Ok(table)
    }

    fn tombstones_by_account(&self) -> Result<HashMap<&str, Vec<Tombstone>>> {
        let mut grouped: HashMap<&str, Vec<Tombstone>> = HashMap::new();
        for record in &self.tombstones {
            grouped
                .entry(record.account_id.as_str())
                .or_default()
                .push(record.export()?);
        }
        Ok(grouped)
    }
}

fn unknown_account(account_id: &str) -> crate::Error {
    tracing::warn!(%account_id, "Reference to unknown account");
    StorageError::UnknownAccount {
        account_id: account_id.into(),
    }
    .into()
}

fn check_joined_secret(
    event: &EventRecord,
    secret_id: &str,
    secrets: &HashMap<&str, &SecretRecord>,
) -> Result<()> {
    let stored = secrets.get(secret_id).ok_or_else(|| {
        tracing::warn!(event_id = %event.event_id, %secret_id, "Event references unknown secret");
        StorageError::UnknownSecret {
            event_id: event.event_id.as_str().into(),
            secret_id: secret_id.into(),
        }
    })?;
    if let Some(joined) = &event.secret {
        if joined.secret_id == secret_id && joined != *stored {
            return Err(StorageError::SecretConflict {
                secret_id: secret_id.into(),
            }
            .into());
        }
    }
    Ok(())
}

/// Export one account, joining each event's secret from the table when the
/// record does not carry it already.
fn build_ledger(
    record: &AccountRecord,
    tombstones: Vec<Tombstone>,
    secrets: &HashMap<&str, &SecretRecord>,
    clock: Arc<dyn Clock>,
) -> Result<AccountLedger> {
    let mut record = record.clone();
    let mut account_secrets: BTreeMap<&str, Secret> = BTreeMap::new();

    for event in record.events.iter_mut().flatten() {
        if event.secret.is_some() {
            continue;
        }
        if let Some(secret_id) = &event.secret_id {
            event.secret = secrets.get(secret_id.as_str()).map(|s| (*s).clone());
        }
    }
    for secret_id in tombstones.iter().filter_map(|t| t.secret_id.as_ref()) {
        if let Some(secret) = secrets.get(secret_id.as_str()) {
            account_secrets.insert(secret.secret_id.as_str(), secret.export()?);
        }
    }

    let account = record.export()?;
    AccountLedger::from_parts(
        account,
        account_secrets.into_values().collect(),
        tombstones,
        clock,
    )
}
