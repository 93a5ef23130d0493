//! Pseudonyms and user secrets.

use crate::{
    crypto::{self, hash_identifier},
    ids::SecretId,
};

/// Generate a random pseudonym salt for a new account.
pub fn generate_user_salt() -> String {
    crypto::generate_salt()
}

impl SecretId {
    /// Derive the pseudonym of a real user within one account.
    ///
    /// The same `user_id` always maps to the same id under one `user_salt`,
    /// while different salts (different accounts) give unrelated ids.
    pub fn derive(user_id: impl AsRef<str>, user_salt: impl AsRef<str>) -> Self {
        SecretId::new(hash_identifier(user_salt, user_id))
    }
}

/// A user's pseudonym together with the user secret encrypted for the
/// account owner.
///
/// Nothing in here identifies the real user to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    pub secret_id: SecretId,
    /// Opaque ciphertext, only decryptable with the account's private key
    pub encrypted_secret: String,
}

impl Secret {
    pub fn new(secret_id: SecretId, encrypted_secret: impl Into<String>) -> Self {
        Self {
            secret_id,
            encrypted_secret: encrypted_secret.into(),
        }
    }
}
