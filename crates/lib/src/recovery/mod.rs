//! Multi-channel key recovery.
//!
//! An account's private key is sealed under a [`KeyEncryptionKey`]. Each
//! account user related to the account holds that KEK three times, wrapped
//! by keys derived from their password, their email address and a one-time
//! token. Any single channel recovers the KEK, and any single channel can be
//! rotated without touching the others.
//!
//! ```
//! use eventvault::{FixedClock, KdfParams};
//! use eventvault::model::{Account, AccountUser, AdminLevel};
//! use eventvault::recovery::{RecoveryFactor, RecoveryFactors};
//!
//! let params = KdfParams::new(64, 1, 1);
//! let (account, kek) =
//!     Account::create_sealed("shop", "public", b"private", &FixedClock::default())?;
//!
//! let mut user = AccountUser::signup("ann@example.com", "pw", AdminLevel::SuperAdmin, &params)?;
//! let factors = RecoveryFactors::new("pw", "ann@example.com", "token");
//! user.grant_access(account.account_id.clone(), &kek, &factors, &params)?;
//!
//! let recovered =
//!     user.unlock_account(&account.account_id, &RecoveryFactor::email("ann@example.com"), &params)?;
//! assert_eq!(account.unlock_private_key(&recovered)?.as_slice(), b"private");
//! # Ok::<(), eventvault::Error>(())
//! ```

mod credentials;
pub mod errors;
mod factor;
mod kek;
mod relationship;

pub use errors::RecoveryError;
pub use factor::{ONE_TIME_TOKEN_BYTES, RecoveryFactor, RecoveryFactors};
pub use kek::{KeyEncryptionKey, seal_private_key};
