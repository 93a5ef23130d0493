//! Record <-> domain translation.

use eventvault::{
    Error,
    model::{AccountUser, AdminLevel, ModelError},
    storage::{
        AccountRecord, AccountUserRecord, AccountUserRelationshipRecord, EventRecord, Export,
        Import, SecretRecord, StorageError, TombstoneRecord,
    },
};

use crate::helpers::{sealed_secret, setup_account_with_owner, setup_ledger, test_clock};

fn relationship(id: &str, user: &str, account: &str) -> AccountUserRelationshipRecord {
    AccountUserRelationshipRecord {
        relationship_id: id.to_string(),
        account_user_id: user.to_string(),
        account_id: account.to_string(),
        password_encrypted_key_encryption_key: "p".to_string(),
        email_encrypted_key_encryption_key: "e".to_string(),
        one_time_encrypted_key_encryption_key: "o".to_string(),
    }
}

fn user_record(relationships: Option<Vec<AccountUserRelationshipRecord>>) -> AccountUserRecord {
    AccountUserRecord {
        account_user_id: "u1".to_string(),
        hashed_email: "he".to_string(),
        hashed_password: "hp".to_string(),
        salt: "salt".to_string(),
        admin_level: 1,
        relationships,
    }
}

#[test]
fn test_account_round_trip_from_domain() {
    let mut ledger = setup_ledger(test_clock());
    ledger.ingest_for_user("U1", || sealed_secret("U1"), "a").unwrap();
    ledger.ingest(None, "b").unwrap();
    let (account, _, _) = ledger.into_parts();

    let record = AccountRecord::import(&account);
    assert_eq!(record.events.as_ref().map(Vec::len), Some(2));
    assert_eq!(record.export().unwrap(), account);
}

#[test]
fn test_account_round_trip_from_record() {
    let mut ledger = setup_ledger(test_clock());
    ledger.ingest_for_user("U1", || sealed_secret("U1"), "a").unwrap();
    let (account, _, _) = ledger.into_parts();
    let record = AccountRecord::import(&account);

    assert_eq!(AccountRecord::import(&record.export().unwrap()), record);
}

#[test]
fn test_unloaded_events_become_empty() {
    let mut ledger = setup_ledger(test_clock());
    ledger.ingest(None, "a").unwrap();
    let (account, _, _) = ledger.into_parts();

    let mut record = AccountRecord::import(&account);
    record.events = None;
    let exported = record.export().unwrap();
    assert!(exported.events.is_empty());

    // Importing back yields a loaded, empty collection
    assert_eq!(AccountRecord::import(&exported).events, Some(Vec::new()));
}

#[test]
fn test_event_order_is_preserved() {
    let mut ledger = setup_ledger(test_clock());
    for i in 0..5 {
        ledger.ingest(None, format!("p{i}")).unwrap();
    }
    let (account, _, _) = ledger.into_parts();
    let mut record = AccountRecord::import(&account);
    record.events.as_mut().unwrap().reverse();

    let exported = record.export().unwrap();
    let ids: Vec<String> = exported.events.iter().map(|e| e.event_id.to_string()).collect();
    let record_ids: Vec<String> = record
        .events
        .unwrap()
        .into_iter()
        .map(|e| e.event_id)
        .collect();
    assert_eq!(ids, record_ids);
}

#[test]
fn test_event_without_joined_secret_is_rejected() {
    let record = EventRecord {
        event_id: "e1".to_string(),
        sequence: "0001".to_string(),
        account_id: "a1".to_string(),
        secret_id: Some("s1".to_string()),
        payload: "p".to_string(),
        secret: None,
    };
    let err = record.export().unwrap_err();
    assert!(err.is_integrity_error());
    assert!(matches!(
        err,
        Error::Storage(StorageError::MissingSecret { .. })
    ));
}

#[test]
fn test_tombstone_round_trip_keeps_null_secret() {
    let record = TombstoneRecord {
        event_id: "e1".to_string(),
        account_id: "a1".to_string(),
        secret_id: None,
        sequence: "0001".to_string(),
    };
    let domain = record.export().unwrap();
    assert_eq!(domain.secret_id, None);
    assert_eq!(TombstoneRecord::import(&domain), record);
}

#[test]
fn test_secret_round_trip() {
    let record = SecretRecord {
        secret_id: "s1".to_string(),
        encrypted_secret: "ciphertext".to_string(),
    };
    assert_eq!(SecretRecord::import(&record.export().unwrap()), record);
}

#[test]
fn test_account_user_round_trip_with_real_keys() {
    let (_, _, owner) = setup_account_with_owner();
    let record = AccountUserRecord::import(&owner);
    assert_eq!(record.admin_level, 1);
    assert_eq!(record.relationships.as_ref().map(Vec::len), Some(1));
    assert_eq!(record.export().unwrap(), owner);
}

#[test]
fn test_admin_levels() {
    let mut record = user_record(None);
    record.admin_level = 2;
    assert_eq!(record.export().unwrap().admin_level, AdminLevel::ReadOnly);

    record.admin_level = 0;
    assert!(matches!(
        record.export().unwrap_err(),
        Error::Model(ModelError::UnknownAdminLevel { level: 0 })
    ));
}

#[test]
fn test_duplicate_relationship_is_rejected() {
    let record = user_record(Some(vec![
        relationship("r1", "u1", "a1"),
        relationship("r2", "u1", "a1"),
    ]));
    let err = record.export().unwrap_err();
    assert!(err.is_integrity_error());
    assert!(matches!(
        err,
        Error::Model(ModelError::DuplicateRelationship { .. })
    ));
}

#[test]
fn test_unloaded_relationships_become_empty() {
    let user: AccountUser = user_record(None).export().unwrap();
    assert!(user.relationships.is_empty());
    assert_eq!(
        AccountUserRecord::import(&user).relationships,
        Some(Vec::new())
    );
}

#[test]
fn test_translation_is_usable_across_threads() {
    let records: Vec<SecretRecord> = (0..8)
        .map(|i| SecretRecord {
            secret_id: format!("s{i}"),
            encrypted_secret: format!("c{i}"),
        })
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = records
            .iter()
            .map(|record| scope.spawn(move || record.export().unwrap()))
            .collect();
        for (handle, record) in handles.into_iter().zip(&records) {
            assert_eq!(handle.join().unwrap().secret_id, record.secret_id);
        }
    });
}
