//! The storage boundary.
//!
//! Records here have the shape of the relational tables; business logic
//! never sees them. [`Export`] turns a record into its domain object and
//! rejects records that break a domain invariant; [`Import`] turns a domain
//! object back into a record.

pub mod errors;
mod records;
mod snapshot;
mod translate;

pub use errors::StorageError;
pub use records::{
    AccountRecord, AccountUserRecord, AccountUserRelationshipRecord, EventRecord, SecretRecord,
    TombstoneRecord,
};
pub use snapshot::{SnapshotSummary, StorageSnapshot};
pub use translate::{Export, Import, export_all, import_all};
