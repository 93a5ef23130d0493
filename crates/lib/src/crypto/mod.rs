//! Cryptographic primitives behind the key recovery model.
//!
//! The domain model treats every encrypted field as an opaque string. This
//! module is the one binding of that boundary shipped with the crate:
//! - Argon2id for password hashing and for deriving wrapping keys
//! - AES-256-GCM for sealing key material
//! - SHA-256 for pseudonyms and hashed identifiers
//!
//! Sealed values are encoded as `base64(nonce) "." base64(ciphertext)`.

pub mod errors;

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};
use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

pub use errors::CryptoError;

use crate::{Result, config::KdfParams};

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Derived key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// Shortest salt Argon2 accepts
pub const MIN_SALT_LENGTH: usize = 8;

const SEAL_SEPARATOR: char = '.';

fn argon2(params: &KdfParams) -> Result<Argon2<'static>> {
    let params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| CryptoError::InvalidParameters {
        reason: e.to_string(),
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Generate a random salt (base64 encoded, 22 chars).
pub fn generate_salt() -> String {
    SaltString::generate(&mut rand_core::OsRng)
        .as_str()
        .to_string()
}

/// Hash a password using Argon2id.
///
/// Returns the hash in PHC string format, which embeds its own salt and
/// parameters.
pub fn hash_password(password: impl AsRef<str>, params: &KdfParams) -> Result<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    let hash = argon2(params)?
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map_err(|e| CryptoError::HashingFailed {
            reason: e.to_string(),
        })?
        .to_string();

    Ok(hash)
}

/// Verify a password against its PHC hash.
pub fn verify_password(password: impl AsRef<str>, password_hash: impl AsRef<str>) -> Result<()> {
    let parsed_hash =
        PasswordHash::new(password_hash.as_ref()).map_err(|_| CryptoError::MalformedPasswordHash)?;

    Argon2::default()
        .verify_password(password.as_ref().as_bytes(), &parsed_hash)
        .map_err(|_| CryptoError::InvalidPassword.into())
}

/// Derive a 32-byte wrapping key from a secret and a salt using Argon2id.
pub fn derive_key(
    secret: impl AsRef<str>,
    salt: impl AsRef<str>,
    params: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>> {
    let salt = salt.as_ref();
    if salt.len() < MIN_SALT_LENGTH {
        return Err(CryptoError::InvalidSaltLength {
            minimum: MIN_SALT_LENGTH,
            actual: salt.len(),
        }
        .into());
    }

    let mut key = Zeroizing::new(vec![0u8; KEY_LENGTH]);
    argon2(params)?
        .hash_password_into(secret.as_ref().as_bytes(), salt.as_bytes(), &mut key)
        .map_err(|e| CryptoError::KeyDerivationFailed {
            reason: e.to_string(),
        })?;

    Ok(key)
}

fn cipher(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: key.len(),
        }
        .into());
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| {
        CryptoError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: key.len(),
        }
        .into()
    })
}

/// Encrypt `plaintext` under a 32-byte key with a fresh random nonce.
pub fn seal(key: impl AsRef<[u8]>, plaintext: impl AsRef<[u8]>) -> Result<String> {
    let cipher = cipher(key.as_ref())?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_ref())
        .map_err(|_| CryptoError::SealFailed)?;

    Ok(format!(
        "{}{}{}",
        Base64::encode_string(&nonce),
        SEAL_SEPARATOR,
        Base64::encode_string(&ciphertext)
    ))
}

/// Decrypt a value produced by [`seal`].
pub fn open(key: impl AsRef<[u8]>, sealed: impl AsRef<str>) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = cipher(key.as_ref())?;

    let (nonce_part, ciphertext_part) =
        sealed
            .as_ref()
            .split_once(SEAL_SEPARATOR)
            .ok_or_else(|| CryptoError::MalformedSealedValue {
                reason: "missing separator".to_string(),
            })?;

    let nonce_bytes =
        Base64::decode_vec(nonce_part).map_err(|_| CryptoError::MalformedSealedValue {
            reason: "nonce is not valid base64".to_string(),
        })?;
    if nonce_bytes.len() != NONCE_LENGTH {
        return Err(CryptoError::MalformedSealedValue {
            reason: format!(
                "nonce length: expected {}, got {}",
                NONCE_LENGTH,
                nonce_bytes.len()
            ),
        }
        .into());
    }
    let ciphertext =
        Base64::decode_vec(ciphertext_part).map_err(|_| CryptoError::MalformedSealedValue {
            reason: "ciphertext is not valid base64".to_string(),
        })?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| CryptoError::OpenFailed)?;

    Ok(Zeroizing::new(plaintext))
}

/// Hash an identifier together with a salt: hex-encoded SHA-256 of `salt || value`.
pub fn hash_identifier(salt: impl AsRef<str>, value: impl AsRef<str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_ref().as_bytes());
    hasher.update(value.as_ref().as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate `len` random bytes encoded as base64, e.g. a one-time recovery token.
pub fn random_token(len: usize) -> String {
    use rand::RngCore;

    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Base64::encode_string(&bytes)
}
