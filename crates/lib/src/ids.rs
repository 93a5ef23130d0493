//! Typed identifiers used throughout EventVault.
//!
//! Every identifier is an opaque string in storage. The newtypes exist so an
//! account id can never be passed where an event id is expected.
//!
//! Account, account user and relationship ids are random UUIDs. Event ids and
//! sequences are time-ordered UUIDs rendered as 32 lowercase hex characters,
//! which makes their lexical order follow creation time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::{NoContext, Timestamp, Uuid};

use crate::clock::Clock;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like input.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<&$name> for String {
            fn from(id: &$name) -> Self {
                id.0.clone()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                &self.0 == other
            }
        }
    };
}

string_id!(
    /// Identifies a tenant account.
    AccountId
);
string_id!(
    /// Identifies a person who can log in and access accounts.
    AccountUserId
);
string_id!(
    /// Identifies the link between one account user and one account.
    RelationshipId
);
string_id!(
    /// Identifies an event, and the tombstone that replaces it on deletion.
    EventId
);
string_id!(
    /// Pseudonym of a real user within one account.
    ///
    /// Always 64 lowercase hex characters when produced by
    /// [`SecretId::derive`].
    SecretId
);
string_id!(
    /// Sortable token giving the total order of an account's history.
    Sequence
);

impl AccountId {
    /// Generates a fresh random account id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AccountUserId {
    /// Generates a fresh random account user id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl RelationshipId {
    /// Generates a fresh random relationship id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl EventId {
    /// Generates a lexically sortable event id for the clock's current time.
    pub fn generate(clock: &dyn Clock) -> Self {
        Self(time_ordered(clock.now_millis()).simple().to_string())
    }
}

fn time_ordered(millis: u64) -> Uuid {
    let ts = Timestamp::from_unix(
        NoContext,
        millis / 1000,
        ((millis % 1000) * 1_000_000) as u32,
    );
    Uuid::new_v7(ts)
}

/// Issues strictly increasing [`Sequence`] values for one account.
///
/// Values follow the clock, but when the clock stands still or goes
/// backwards the generator continues from the last value it issued.
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator {
    last: Option<u128>,
    /// Stored sequence in a format this generator cannot parse. Issued
    /// values must still sort above it.
    floor: Option<Sequence>,
}

impl SequenceGenerator {
    /// Creates a generator with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that continues after an already stored sequence.
    ///
    /// A sequence in a foreign format becomes a lexical floor: nothing is
    /// issued until the clock produces a value sorting above it.
    pub fn resume_after(last: Option<&Sequence>) -> Self {
        match last {
            None => Self::default(),
            Some(seq) => match parse_sequence(seq) {
                Some(value) => Self {
                    last: Some(value),
                    floor: None,
                },
                None => {
                    tracing::warn!(sequence = %seq, "Stored sequence has a foreign format");
                    Self {
                        last: None,
                        floor: Some(seq.clone()),
                    }
                }
            },
        }
    }

    /// Returns the next sequence, strictly greater than every previous one.
    ///
    /// Returns `None` when no such value can be produced: the value space is
    /// exhausted, or a foreign stored sequence still sorts above the clock.
    /// The generator is left unchanged in that case.
    pub fn next(&mut self, clock: &dyn Clock) -> Option<Sequence> {
        let candidate = time_ordered(clock.now_millis()).as_u128();
        let value = match self.last {
            Some(last) if candidate <= last => last.checked_add(1)?,
            _ => candidate,
        };
        let sequence = Sequence(format!("{value:032x}"));
        if self.floor.as_ref().is_some_and(|floor| &sequence <= floor) {
            return None;
        }
        self.floor = None;
        self.last = Some(value);
        Some(sequence)
    }

    /// The last sequence this generator issued or resumed from.
    pub fn last(&self) -> Option<Sequence> {
        match self.last {
            Some(value) => Some(Sequence(format!("{value:032x}"))),
            None => self.floor.clone(),
        }
    }
}

/// Parses a sequence issued by [`SequenceGenerator`]: 32 lowercase hex digits.
fn parse_sequence(seq: &Sequence) -> Option<u128> {
    let canonical = seq.len() == 32
        && seq
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !canonical {
        return None;
    }
    u128::from_str_radix(seq, 16).ok()
}
