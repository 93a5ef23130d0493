//! The three key recovery channels.

use eventvault::{
    Error,
    model::{AccountUser, AccountUserRelationship, AdminLevel, Channel},
    recovery::{KeyEncryptionKey, RecoveryError, RecoveryFactor, RecoveryFactors},
};

use crate::helpers::{EMAIL, PASSWORD, TOKEN, factors, setup_account_with_owner, test_params};

#[test]
fn test_each_channel_alone_unlocks_the_private_key() {
    let (account, kek, owner) = setup_account_with_owner();
    let params = test_params();

    for factor in factors().iter() {
        let recovered = owner
            .unlock_account(&account.account_id, &factor, &params)
            .unwrap();
        assert_eq!(recovered, kek, "{:?} channel", factor.channel());
        assert_eq!(
            account.unlock_private_key(&recovered).unwrap().as_slice(),
            b"private-key"
        );
    }
}

#[test]
fn test_verify_channels_agrees() {
    let (account, kek, owner) = setup_account_with_owner();
    let relationship = owner.relationship(&account.account_id).unwrap();
    let verified = relationship
        .verify_channels(&factors(), &owner.salt, &test_params())
        .unwrap();
    assert_eq!(verified, kek);
}

#[test]
fn test_rotating_one_channel_leaves_others_working() {
    let (account, kek, mut owner) = setup_account_with_owner();
    let params = test_params();
    let salt = owner.salt.clone();
    let relationship = owner.relationship_mut(&account.account_id).unwrap();
    let before = relationship.clone();

    relationship
        .rotate(
            &RecoveryFactor::password(PASSWORD),
            &RecoveryFactor::one_time("fresh-token"),
            &salt,
            &params,
        )
        .unwrap();

    assert_eq!(
        relationship.password_encrypted_key_encryption_key,
        before.password_encrypted_key_encryption_key
    );
    assert_eq!(
        relationship.email_encrypted_key_encryption_key,
        before.email_encrypted_key_encryption_key
    );
    for factor in [
        RecoveryFactor::password(PASSWORD),
        RecoveryFactor::email(EMAIL),
        RecoveryFactor::one_time("fresh-token"),
    ] {
        assert_eq!(relationship.unlock(&factor, &salt, &params).unwrap(), kek);
    }
    let err = relationship
        .unlock(&RecoveryFactor::one_time(TOKEN), &salt, &params)
        .unwrap_err();
    assert!(err.is_authentication_error());
}

#[test]
fn test_divergent_channel_is_fatal() {
    let (account, _, mut owner) = setup_account_with_owner();
    let params = test_params();
    let salt = owner.salt.clone();
    let other = AccountUserRelationship::grant(
        &owner,
        "other-account".into(),
        &KeyEncryptionKey::generate(),
        &factors(),
        &params,
    )
    .unwrap();
    let relationship = owner.relationship_mut(&account.account_id).unwrap();

    // Corrupt the email channel with a copy wrapping a different key
    relationship.set_encrypted_key_encryption_key(
        Channel::Email,
        other.email_encrypted_key_encryption_key.clone(),
    );

    let err = relationship
        .verify_channels(&factors(), &salt, &params)
        .unwrap_err();
    assert!(err.is_integrity_error());
    assert!(matches!(
        err,
        Error::Recovery(RecoveryError::DivergentKeyEncryptionKey {
            channel: Channel::Email,
            ..
        })
    ));
}

#[test]
fn test_forgotten_password_reset_by_email() {
    let (account, kek, mut owner) = setup_account_with_owner();
    let params = test_params();

    owner
        .reset_password(&RecoveryFactor::email(EMAIL), "new password", &params)
        .unwrap();

    assert!(owner.verify_password(PASSWORD).is_err());
    assert!(owner.verify_password("new password").is_ok());
    let recovered = owner
        .unlock_account(
            &account.account_id,
            &RecoveryFactor::password("new password"),
            &params,
        )
        .unwrap();
    assert_eq!(recovered, kek);
}

#[test]
fn test_rotation_needs_a_factor_that_unlocks() {
    let (account, kek, mut owner) = setup_account_with_owner();
    let params = test_params();
    let salt = owner.salt.clone();
    let relationship = owner.relationship_mut(&account.account_id).unwrap();
    let before = relationship.clone();

    let err = relationship
        .renew_one_time_token(&RecoveryFactor::password("not the password"), &salt, &params)
        .unwrap_err();
    assert!(err.is_authentication_error());
    assert_eq!(*relationship, before);

    let token = relationship
        .renew_one_time_token(&RecoveryFactor::email(EMAIL), &salt, &params)
        .unwrap();
    let recovered = relationship
        .unlock(&RecoveryFactor::one_time(&token), &salt, &params)
        .unwrap();
    assert_eq!(recovered, kek);
}

#[test]
fn test_reset_of_fresh_signup_needs_matching_email() {
    let params = test_params();
    let mut user =
        AccountUser::signup("fresh@example.com", "pw", AdminLevel::ReadOnly, &params).unwrap();

    let err = user
        .reset_password(&RecoveryFactor::one_time("arbitrary"), "taken over", &params)
        .unwrap_err();
    assert!(err.is_authentication_error());
    let err = user
        .reset_password(&RecoveryFactor::password("pw"), "taken over", &params)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Recovery(RecoveryError::ResetChannelNotAllowed { .. })
    ));
    assert!(user.verify_password("pw").is_ok());
    assert!(user.verify_password("taken over").is_err());
}

#[test]
fn test_password_change_keeps_salt() {
    let (_, _, mut owner) = setup_account_with_owner();
    let salt = owner.salt.clone();
    owner
        .change_password(PASSWORD, "another", &test_params())
        .unwrap();
    assert_eq!(owner.salt, salt);
    assert!(owner.matches_email(EMAIL));
}

#[test]
fn test_sharing_access_with_a_reader() {
    let (account, kek, owner) = setup_account_with_owner();
    let params = test_params();
    let mut reader =
        AccountUser::signup("reader@example.com", "reader-pw", AdminLevel::ReadOnly, &params)
            .unwrap();
    let reader_factors = RecoveryFactors::with_new_token("reader-pw", "reader@example.com");

    owner
        .share_access(
            &account.account_id,
            &RecoveryFactor::password(PASSWORD),
            &mut reader,
            &reader_factors,
            &params,
        )
        .unwrap();

    let recovered = reader
        .unlock_account(
            &account.account_id,
            &RecoveryFactor::one_time(&reader_factors.one_time),
            &params,
        )
        .unwrap();
    assert_eq!(recovered, kek);

    // A second grant for the same account is refused
    let err = owner
        .share_access(
            &account.account_id,
            &RecoveryFactor::password(PASSWORD),
            &mut reader,
            &reader_factors,
            &params,
        )
        .unwrap_err();
    assert!(err.is_integrity_error());
}

#[test]
fn test_no_access_without_relationship() {
    let (_, _, owner) = setup_account_with_owner();
    let err = owner
        .unlock_account(
            &"other-account".into(),
            &RecoveryFactor::password(PASSWORD),
            &test_params(),
        )
        .unwrap_err();
    assert!(err.is_not_found());
}
