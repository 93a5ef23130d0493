use std::sync::Arc;

use eventvault::{
    Clock, FixedClock, KdfParams,
    model::{Account, AccountLedger, AccountUser, AdminLevel},
    recovery::{KeyEncryptionKey, RecoveryFactors},
};

/// 2024-01-01 00:00:00 UTC
pub const START_MILLIS: u64 = 1704067200000;

pub const EMAIL: &str = "owner@example.com";
pub const PASSWORD: &str = "correct horse battery staple";
pub const TOKEN: &str = "one-time-token";

/// Argon2 parameters cheap enough for tests.
pub fn test_params() -> KdfParams {
    KdfParams::new(64, 1, 1)
}

pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(START_MILLIS))
}

pub fn factors() -> RecoveryFactors {
    RecoveryFactors::new(PASSWORD, EMAIL, TOKEN)
}

/// A fresh account with an empty ledger.
pub fn setup_ledger(clock: Arc<FixedClock>) -> AccountLedger {
    let account = Account::new("shop", "public-key", "sealed-private-key", clock.as_ref());
    let clock: Arc<dyn Clock> = clock;
    AccountLedger::new(account, clock).expect("Failed to create ledger")
}

/// An account with a sealed private key and a super admin holding its KEK.
pub fn setup_account_with_owner() -> (Account, KeyEncryptionKey, AccountUser) {
    let clock = test_clock();
    let (account, kek) = Account::create_sealed("shop", "public-key", b"private-key", clock.as_ref())
        .expect("Failed to create account");

    let mut owner = AccountUser::signup(EMAIL, PASSWORD, AdminLevel::SuperAdmin, &test_params())
        .expect("Failed to sign up owner");
    owner
        .grant_access(account.account_id.clone(), &kek, &factors(), &test_params())
        .expect("Failed to grant access");

    (account, kek, owner)
}

/// Encrypted user secret stand-in; the model treats it as opaque.
pub fn sealed_secret(user: &str) -> eventvault::Result<String> {
    Ok(format!("sealed-secret-of-{user}"))
}
