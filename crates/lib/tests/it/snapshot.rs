//! Storage snapshots and cross-table validation.

use std::sync::Arc;

use eventvault::{
    Clock, Error,
    storage::{StorageError, StorageSnapshot},
};

use crate::helpers::{sealed_secret, setup_account_with_owner, setup_ledger, test_clock};

fn populated_snapshot() -> StorageSnapshot {
    let mut ledger = setup_ledger(test_clock());
    ledger.ingest_for_user("U1", || sealed_secret("U1"), "a").unwrap();
    ledger.ingest_for_user("U2", || sealed_secret("U2"), "b").unwrap();
    let gone = ledger.ingest_for_user("U1", || sealed_secret("U1"), "c").unwrap();
    ledger.ingest(None, "d").unwrap();
    ledger.delete_event(&gone.event_id).unwrap();

    let (_, _, mut owner) = setup_account_with_owner();
    // Point the owner's relationship at the ledger's account
    owner.relationships[0].account_id = ledger.account().account_id.clone();

    StorageSnapshot::from_ledgers(vec![ledger], &[owner]).unwrap()
}

#[test]
fn test_validate_counts_tables() {
    let summary = populated_snapshot().validate().unwrap();
    assert_eq!(summary.accounts, 1);
    assert_eq!(summary.events, 3);
    assert_eq!(summary.anonymous_events, 1);
    assert_eq!(summary.tombstones, 1);
    assert_eq!(summary.secrets, 2);
    assert_eq!(summary.orphaned_secrets, 0);
    assert_eq!(summary.account_users, 1);
    assert_eq!(summary.relationships, 1);
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let snapshot = populated_snapshot();

    snapshot.save(&path).unwrap();
    let loaded = StorageSnapshot::load(&path).unwrap();
    assert_eq!(loaded, snapshot);
    loaded.validate().unwrap();
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = StorageSnapshot::load(dir.path().join("absent.json")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_ledgers_restore_history() {
    let snapshot = populated_snapshot();
    let clock: Arc<dyn Clock> = test_clock();
    let mut ledgers = snapshot.ledgers(clock).unwrap();
    assert_eq!(ledgers.len(), 1);

    let ledger = &mut ledgers[0];
    assert_eq!(ledger.history().active_count(), 3);
    assert_eq!(ledger.history().deleted_count(), 1);

    let last = ledger.history().last_sequence().cloned().unwrap();
    let next = ledger.ingest(None, "e").unwrap();
    assert!(next.sequence > last);
}

#[test]
fn test_missing_secret_row_is_rejected() {
    let mut snapshot = populated_snapshot();
    snapshot.secrets.pop();
    let err = snapshot.validate().unwrap_err();
    assert!(err.is_integrity_error());
    assert!(matches!(
        err,
        Error::Storage(StorageError::UnknownSecret { .. })
    ));
}

#[test]
fn test_conflicting_joined_secret_is_rejected() {
    let mut snapshot = populated_snapshot();
    let events = snapshot.accounts[0].events.as_mut().unwrap();
    let joined = events
        .iter_mut()
        .find_map(|e| e.secret.as_mut())
        .unwrap();
    joined.encrypted_secret = "tampered".to_string();

    assert!(matches!(
        snapshot.validate().unwrap_err(),
        Error::Storage(StorageError::SecretConflict { .. })
    ));
}

#[test]
fn test_relationship_to_unknown_account() {
    let mut snapshot = populated_snapshot();
    let relationships = snapshot.account_users[0].relationships.as_mut().unwrap();
    relationships[0].account_id = "ghost".to_string();
    assert!(matches!(
        snapshot.validate().unwrap_err(),
        Error::Storage(StorageError::UnknownAccount { .. })
    ));
}

#[test]
fn test_same_access_granted_twice_across_records() {
    let mut snapshot = populated_snapshot();
    let relationships = snapshot.account_users[0].relationships.as_mut().unwrap();
    let mut copy = relationships[0].clone();
    copy.relationship_id = "another".to_string();
    relationships.push(copy);

    assert!(matches!(
        snapshot.validate().unwrap_err(),
        Error::Storage(StorageError::DuplicateAccess { .. })
    ));
}

#[test]
fn test_unloaded_relationships_are_not_errors() {
    let mut snapshot = populated_snapshot();
    snapshot.account_users[0].relationships = None;
    let summary = snapshot.validate().unwrap();
    assert_eq!(summary.relationships, 0);
}
