//! Events, tombstones and their replay order.
//!
//! An event is either active or deleted. Deletion replaces the [`Event`] with
//! a [`Tombstone`] carrying the same id, account, secret id and sequence, so
//! a client replaying history still sees the deletion at the right position.

use std::cmp::Ordering;

use super::secret::Secret;
use crate::ids::{AccountId, EventId, SecretId, Sequence};

/// Who an event is about.
///
/// Pseudonymous events carry their secret; there is no way to build one
/// that only names a secret id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Subject {
    /// Not tied to any pseudonymous user
    #[default]
    Anonymous,
    /// Tied to the user behind this secret
    Pseudonymous(Secret),
}

impl Subject {
    pub fn secret_id(&self) -> Option<&SecretId> {
        self.secret().map(|secret| &secret.secret_id)
    }

    pub fn secret(&self) -> Option<&Secret> {
        match self {
            Subject::Anonymous => None,
            Subject::Pseudonymous(secret) => Some(secret),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Subject::Anonymous)
    }
}

/// An analytics event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_id: EventId,
    pub sequence: Sequence,
    pub account_id: AccountId,
    pub subject: Subject,
    /// Opaque ciphertext, only meaningful to holders of the account's private key
    pub payload: String,
}

impl Event {
    pub fn secret_id(&self) -> Option<&SecretId> {
        self.subject.secret_id()
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject.is_anonymous()
    }

    /// The tombstone that replaces this event on deletion.
    pub fn to_tombstone(&self) -> Tombstone {
        Tombstone {
            event_id: self.event_id.clone(),
            account_id: self.account_id.clone(),
            secret_id: self.secret_id().cloned(),
            sequence: self.sequence.clone(),
        }
    }

    /// Consume the event, keeping only what its tombstone retains.
    pub fn tombstone(self) -> Tombstone {
        let secret_id = match self.subject {
            Subject::Anonymous => None,
            Subject::Pseudonymous(secret) => Some(secret.secret_id),
        };
        Tombstone {
            event_id: self.event_id,
            account_id: self.account_id,
            secret_id,
            sequence: self.sequence,
        }
    }
}

/// Deletion marker standing in for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tombstone {
    pub event_id: EventId,
    pub account_id: AccountId,
    pub secret_id: Option<SecretId>,
    pub sequence: Sequence,
}

/// Position of a history entry in replay order.
///
/// Ordered by sequence first and event id second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplayPosition<'a> {
    pub sequence: &'a Sequence,
    pub event_id: &'a EventId,
}

/// One record of an account's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Active(Event),
    Deleted(Tombstone),
}

impl HistoryEntry {
    pub fn event_id(&self) -> &EventId {
        match self {
            HistoryEntry::Active(event) => &event.event_id,
            HistoryEntry::Deleted(tombstone) => &tombstone.event_id,
        }
    }

    pub fn sequence(&self) -> &Sequence {
        match self {
            HistoryEntry::Active(event) => &event.sequence,
            HistoryEntry::Deleted(tombstone) => &tombstone.sequence,
        }
    }

    pub fn account_id(&self) -> &AccountId {
        match self {
            HistoryEntry::Active(event) => &event.account_id,
            HistoryEntry::Deleted(tombstone) => &tombstone.account_id,
        }
    }

    pub fn secret_id(&self) -> Option<&SecretId> {
        match self {
            HistoryEntry::Active(event) => event.secret_id(),
            HistoryEntry::Deleted(tombstone) => tombstone.secret_id.as_ref(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, HistoryEntry::Deleted(_))
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            HistoryEntry::Active(event) => Some(event),
            HistoryEntry::Deleted(_) => None,
        }
    }

    pub fn as_tombstone(&self) -> Option<&Tombstone> {
        match self {
            HistoryEntry::Active(_) => None,
            HistoryEntry::Deleted(tombstone) => Some(tombstone),
        }
    }

    pub fn position(&self) -> ReplayPosition<'_> {
        ReplayPosition {
            sequence: self.sequence(),
            event_id: self.event_id(),
        }
    }

    /// Compare two entries in replay order, regardless of their state.
    pub fn replay_cmp(&self, other: &Self) -> Ordering {
        self.position().cmp(&other.position())
    }
}

impl From<Event> for HistoryEntry {
    fn from(event: Event) -> Self {
        HistoryEntry::Active(event)
    }
}

impl From<Tombstone> for HistoryEntry {
    fn from(tombstone: Tombstone) -> Self {
        HistoryEntry::Deleted(tombstone)
    }
}

/// Sort entries into replay order.
pub fn sort_for_replay(entries: &mut [HistoryEntry]) {
    entries.sort_by(HistoryEntry::replay_cmp);
}
