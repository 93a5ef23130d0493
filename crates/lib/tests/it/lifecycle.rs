//! Event ingestion, deletion and account retirement.

use std::sync::Arc;

use eventvault::{
    Clock, Error, SecretId,
    model::{Account, AccountLedger, HistoryEntry, ModelError},
};

use crate::helpers::{sealed_secret, setup_ledger, test_clock};

#[test]
fn test_same_user_same_secret_and_delete_keeps_position() {
    let clock = test_clock();
    let mut account = Account::new("shop", "pub", "enc", clock.as_ref());
    account.account_id = "A1".into();
    account.user_salt = "s1".to_string();
    let clock: Arc<dyn Clock> = clock;
    let mut ledger = AccountLedger::new(account, clock).unwrap();

    let first = ledger.ingest_for_user("U1", || sealed_secret("U1"), "payload-1").unwrap();
    let second = ledger.ingest_for_user("U1", || sealed_secret("U1"), "payload-2").unwrap();

    let expected = SecretId::derive("U1", "s1");
    assert_eq!(first.secret_id(), Some(&expected));
    assert_eq!(second.secret_id(), Some(&expected));
    assert!(first.sequence < second.sequence);

    let tombstone = ledger.delete_event(&first.event_id).unwrap();
    assert_eq!(tombstone.event_id, first.event_id);
    assert_eq!(tombstone.sequence, first.sequence);
    assert_eq!(tombstone.account_id, "A1");
    assert_eq!(tombstone.secret_id, Some(expected));

    let history = ledger.history();
    assert!(history.get(&first.event_id).unwrap().is_deleted());
    assert!(!history.get(&second.event_id).unwrap().is_deleted());

    let ordered: Vec<&HistoryEntry> = history.ordered();
    assert_eq!(ordered[0].event_id(), &first.event_id);
    assert_eq!(ordered[1].event_id(), &second.event_id);
}

#[test]
fn test_deleted_event_cannot_be_deleted_again() {
    let mut ledger = setup_ledger(test_clock());
    let event = ledger.ingest(None, "payload").unwrap();
    ledger.delete_event(&event.event_id).unwrap();

    let err = ledger.delete_event(&event.event_id).unwrap_err();
    assert!(matches!(
        err,
        Error::Model(ModelError::EventAlreadyDeleted { .. })
    ));
    assert_eq!(ledger.history().deleted_count(), 1);
}

#[test]
fn test_unknown_event_deletion() {
    let mut ledger = setup_ledger(test_clock());
    let err = ledger.delete_event(&"missing".into()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_retired_account_rejects_new_events() {
    let mut ledger = setup_ledger(test_clock());
    let kept = ledger.ingest_for_user("U1", || sealed_secret("U1"), "a").unwrap();
    ledger.retire();

    let err = ledger.ingest(None, "late").unwrap_err();
    assert!(matches!(err, Error::Model(ModelError::AccountRetired { .. })));

    // History stays intact and deletable
    assert_eq!(ledger.history().active_count(), 1);
    assert!(ledger.delete_event(&kept.event_id).is_ok());
    assert!(ledger.account().retired);
}

#[test]
fn test_opt_out_tombstones_only_that_user() {
    let mut ledger = setup_ledger(test_clock());
    for i in 0..3 {
        ledger
            .ingest_for_user("U1", || sealed_secret("U1"), format!("u1-{i}"))
            .unwrap();
        ledger
            .ingest_for_user("U2", || sealed_secret("U2"), format!("u2-{i}"))
            .unwrap();
    }
    ledger.ingest(None, "anonymous").unwrap();

    let tombstones = ledger.delete_user_events("U1");
    assert_eq!(tombstones.len(), 3);
    assert!(tombstones.windows(2).all(|w| w[0].sequence < w[1].sequence));

    let u2 = ledger.account().secret_id_for("U2");
    let remaining = ledger.history().events();
    assert_eq!(remaining.len(), 4);
    assert!(
        remaining
            .iter()
            .all(|e| e.is_anonymous() || e.secret_id() == Some(&u2))
    );
}

#[test]
fn test_incremental_replay_sees_deletions() {
    let mut ledger = setup_ledger(test_clock());
    let a = ledger.ingest(None, "a").unwrap();
    let b = ledger.ingest(None, "b").unwrap();
    let c = ledger.ingest(None, "c").unwrap();
    ledger.delete_event(&b.event_id).unwrap();

    let later = ledger.history().since(&a.sequence);
    assert_eq!(later.len(), 2);
    assert_eq!(later[0].event_id(), &b.event_id);
    assert!(later[0].is_deleted());
    assert_eq!(later[1].event_id(), &c.event_id);
    assert!(ledger.history().since(&c.sequence).is_empty());
}

#[test]
fn test_sequences_strictly_increase_on_frozen_clock() {
    let clock = Arc::new(eventvault::FixedClock::frozen(crate::helpers::START_MILLIS));
    let mut ledger = setup_ledger(clock);
    let sequences: Vec<_> = (0..50)
        .map(|i| ledger.ingest(None, format!("p{i}")).unwrap().sequence)
        .collect();
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_ledger_round_trip_through_parts() {
    let clock = test_clock();
    let mut ledger = setup_ledger(clock.clone());
    ledger.ingest_for_user("U1", || sealed_secret("U1"), "a").unwrap();
    let gone = ledger.ingest(None, "b").unwrap();
    ledger.delete_event(&gone.event_id).unwrap();

    let (account, secrets, tombstones) = ledger.into_parts();
    let clock: Arc<dyn Clock> = clock;
    let restored = AccountLedger::from_parts(account, secrets, tombstones, clock).unwrap();
    assert_eq!(restored.history().active_count(), 1);
    assert_eq!(restored.history().deleted_count(), 1);
    assert_eq!(restored.secrets().count(), 1);
}
