//! Vault configuration.
//!
//! The only tunable behaviour in the library is the cost of Argon2id key
//! derivation, used for password hashes and for every recovery channel.
//! Configuration is read from JSON; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Argon2id cost parameters.
///
/// Defaults match the Argon2 crate's recommended defaults. Changing them
/// after keys were issued makes existing ciphertexts undecryptable, because
/// the parameters are not stored next to each ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl KdfParams {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Key derivation parameters for passwords and recovery channels
    pub kdf: KdfParams,
}

impl VaultConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&data)?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded vault configuration");
        Ok(config)
    }

    /// Write configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}
