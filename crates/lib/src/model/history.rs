//! Per-account event history.
//!
//! [`EventHistory`] holds at most one record per event id. Deleting an event
//! swaps the record for its tombstone in place; a tombstone never turns back
//! into an event.

use std::collections::BTreeMap;

use super::{
    errors::ModelError,
    event::{Event, HistoryEntry, Tombstone},
};
use crate::{
    Result,
    ids::{AccountId, EventId, SecretId, Sequence},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHistory {
    account_id: AccountId,
    entries: BTreeMap<EventId, HistoryEntry>,
}

impl EventHistory {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            entries: BTreeMap::new(),
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Add an active event.
    pub fn insert_event(&mut self, event: Event) -> Result<()> {
        self.insert(HistoryEntry::Active(event))
    }

    /// Add a stored tombstone.
    pub fn insert_tombstone(&mut self, tombstone: Tombstone) -> Result<()> {
        self.insert(HistoryEntry::Deleted(tombstone))
    }

    /// Add an entry, rejecting foreign accounts and already used event ids.
    pub fn insert(&mut self, entry: HistoryEntry) -> Result<()> {
        if entry.account_id() != &self.account_id {
            return Err(ModelError::ForeignAccount {
                event_id: entry.event_id().clone(),
                expected: self.account_id.clone(),
                actual: entry.account_id().clone(),
            }
            .into());
        }
        if self.entries.contains_key(entry.event_id()) {
            return Err(ModelError::DuplicateEvent {
                event_id: entry.event_id().clone(),
            }
            .into());
        }
        self.entries.insert(entry.event_id().clone(), entry);
        Ok(())
    }

    /// Replace an active event with its tombstone.
    pub fn delete(&mut self, event_id: &EventId) -> Result<Tombstone> {
        let entry = self
            .entries
            .get_mut(event_id)
            .ok_or_else(|| ModelError::EventNotFound {
                event_id: event_id.clone(),
            })?;

        let tombstone = match entry {
            HistoryEntry::Active(event) => event.to_tombstone(),
            HistoryEntry::Deleted(_) => {
                return Err(ModelError::EventAlreadyDeleted {
                    event_id: event_id.clone(),
                }
                .into());
            }
        };
        *entry = HistoryEntry::Deleted(tombstone.clone());

        tracing::info!(account_id = %self.account_id, %event_id, "Event replaced by tombstone");
        Ok(tombstone)
    }

    /// Tombstone every active event of one pseudonymous user.
    ///
    /// Returns the new tombstones in replay order. Events already deleted
    /// are left alone.
    pub fn delete_by_secret(&mut self, secret_id: &SecretId) -> Vec<Tombstone> {
        let mut tombstones = Vec::new();
        for entry in self.entries.values_mut() {
            let tombstone = match entry {
                HistoryEntry::Active(event) if event.secret_id() == Some(secret_id) => {
                    event.to_tombstone()
                }
                _ => continue,
            };
            *entry = HistoryEntry::Deleted(tombstone.clone());
            tombstones.push(tombstone);
        }
        tombstones.sort_by(|a, b| (&a.sequence, &a.event_id).cmp(&(&b.sequence, &b.event_id)));

        tracing::info!(
            account_id = %self.account_id,
            %secret_id,
            deleted = tombstones.len(),
            "User events replaced by tombstones"
        );
        tombstones
    }

    pub fn get(&self, event_id: &EventId) -> Option<&HistoryEntry> {
        self.entries.get(event_id)
    }

    pub fn contains(&self, event_id: &EventId) -> bool {
        self.entries.contains_key(event_id)
    }

    /// All entries in replay order.
    pub fn ordered(&self) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.replay_cmp(b));
        entries
    }

    /// Entries strictly after `sequence`, in replay order.
    ///
    /// Clients that already replayed up to `sequence` use this to pick up
    /// new events and deletions.
    pub fn since(&self, sequence: &Sequence) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self
            .entries
            .values()
            .filter(|entry| entry.sequence() > sequence)
            .collect();
        entries.sort_by(|a, b| a.replay_cmp(b));
        entries
    }

    /// Active events in replay order.
    pub fn events(&self) -> Vec<&Event> {
        self.ordered()
            .into_iter()
            .filter_map(HistoryEntry::as_event)
            .collect()
    }

    /// Tombstones in replay order.
    pub fn tombstones(&self) -> Vec<&Tombstone> {
        self.ordered()
            .into_iter()
            .filter_map(HistoryEntry::as_tombstone)
            .collect()
    }

    /// Highest sequence in the history, active or deleted.
    pub fn last_sequence(&self) -> Option<&Sequence> {
        self.entries.values().map(HistoryEntry::sequence).max()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries.values().filter(|e| !e.is_deleted()).count()
    }

    pub fn deleted_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_deleted()).count()
    }

    /// Split into active events and tombstones, both in replay order.
    pub fn into_parts(self) -> (Vec<Event>, Vec<Tombstone>) {
        let mut entries: Vec<HistoryEntry> = self.entries.into_values().collect();
        super::event::sort_for_replay(&mut entries);

        let mut events = Vec::new();
        let mut tombstones = Vec::new();
        for entry in entries {
            match entry {
                HistoryEntry::Active(event) => events.push(event),
                HistoryEntry::Deleted(tombstone) => tombstones.push(tombstone),
            }
        }
        (events, tombstones)
    }
}
