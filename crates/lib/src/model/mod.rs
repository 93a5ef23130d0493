//! Storage-agnostic domain model.
//!
//! Business logic works on these types only. Conversion to and from the
//! storage shape lives in [`crate::storage`].

mod account;
mod account_user;
pub mod errors;
mod event;
mod history;
mod ledger;
mod secret;

pub use account::Account;
pub use account_user::{AccountUser, AccountUserRelationship, AdminLevel, Channel};
pub use errors::ModelError;
pub use event::{Event, HistoryEntry, ReplayPosition, Subject, Tombstone, sort_for_replay};
pub use history::EventHistory;
pub use ledger::AccountLedger;
pub use secret::{Secret, generate_user_salt};
