//! Key-encryption-keys and the account private key they protect.

use std::fmt;

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::errors::RecoveryError;
use crate::{
    Error, Result,
    clock::Clock,
    crypto::{self, CryptoError, KEY_LENGTH},
    model::Account,
};

/// Symmetric key whose only purpose is decrypting an account's private key.
///
/// Zeroized on drop. `Debug` never prints the key bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyEncryptionKey([u8; KEY_LENGTH]);

impl KeyEncryptionKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for KeyEncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyEncryptionKey(..)")
    }
}

/// Encrypt an account private key under a key-encryption-key.
///
/// The result is what gets stored as the account's `encrypted_private_key`.
pub fn seal_private_key(kek: &KeyEncryptionKey, private_key: impl AsRef<[u8]>) -> Result<String> {
    crypto::seal(kek.as_bytes(), private_key)
}

impl Account {
    /// Create an account whose private key is sealed under a new key-encryption-key.
    ///
    /// The returned key is what gets distributed to account users through
    /// their relationships.
    pub fn create_sealed(
        name: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl AsRef<[u8]>,
        clock: &dyn Clock,
    ) -> Result<(Self, KeyEncryptionKey)> {
        let kek = KeyEncryptionKey::generate();
        let encrypted_private_key = seal_private_key(&kek, private_key)?;
        let account = Account::new(name, public_key, encrypted_private_key, clock);
        tracing::info!(account_id = %account.account_id, "Created account with sealed private key");
        Ok((account, kek))
    }

    /// Decrypt the account's private key.
    pub fn unlock_private_key(&self, kek: &KeyEncryptionKey) -> Result<Zeroizing<Vec<u8>>> {
        crypto::open(kek.as_bytes(), &self.encrypted_private_key).map_err(|err| match err {
            Error::Crypto(ref e) if e.is_authentication_failure() => {
                RecoveryError::PrivateKeyLocked {
                    account_id: self.account_id.clone(),
                }
                .into()
            }
            other => other,
        })
    }
}
