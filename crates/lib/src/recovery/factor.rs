//! Recovery factors: the secrets that unlock each channel.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{Result, config::KdfParams, crypto, model::Channel};

/// Length in bytes of a generated one-time token before encoding.
pub const ONE_TIME_TOKEN_BYTES: usize = 32;

/// Canonical form of an email address for hashing and key derivation.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// One channel together with the material that unlocks it.
#[derive(Clone, Copy)]
pub struct RecoveryFactor<'a> {
    channel: Channel,
    material: &'a str,
}

impl<'a> RecoveryFactor<'a> {
    pub fn new(channel: Channel, material: &'a str) -> Self {
        Self { channel, material }
    }

    pub fn password(password: &'a str) -> Self {
        Self::new(Channel::Password, password)
    }

    pub fn email(email: &'a str) -> Self {
        Self::new(Channel::Email, email)
    }

    pub fn one_time(token: &'a str) -> Self {
        Self::new(Channel::OneTime, token)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub(crate) fn material(&self) -> &'a str {
        self.material
    }

    /// Derive the key wrapping this channel's copy of the key-encryption-key.
    ///
    /// Email addresses are normalized first, so case and surrounding
    /// whitespace do not matter.
    pub(crate) fn wrapping_key(&self, salt: &str, params: &KdfParams) -> Result<Zeroizing<Vec<u8>>> {
        match self.channel {
            Channel::Email => {
                let email = Zeroizing::new(normalize_email(self.material));
                crypto::derive_key(email.as_str(), salt, params)
            }
            Channel::Password | Channel::OneTime => crypto::derive_key(self.material, salt, params),
        }
    }
}

impl fmt::Debug for RecoveryFactor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryFactor")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// The material for all three channels, used when granting access.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryFactors {
    pub password: String,
    pub email: String,
    pub one_time: String,
}

impl RecoveryFactors {
    pub fn new(
        password: impl Into<String>,
        email: impl Into<String>,
        one_time: impl Into<String>,
    ) -> Self {
        Self {
            password: password.into(),
            email: email.into(),
            one_time: one_time.into(),
        }
    }

    /// Factors with a freshly generated one-time token.
    ///
    /// The token must be handed to the user; it is not stored anywhere.
    pub fn with_new_token(password: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(password, email, crypto::random_token(ONE_TIME_TOKEN_BYTES))
    }

    pub fn get(&self, channel: Channel) -> RecoveryFactor<'_> {
        match channel {
            Channel::Password => RecoveryFactor::password(&self.password),
            Channel::Email => RecoveryFactor::email(&self.email),
            Channel::OneTime => RecoveryFactor::one_time(&self.one_time),
        }
    }

    /// All three factors in channel order.
    pub fn iter(&self) -> impl Iterator<Item = RecoveryFactor<'_>> {
        Channel::ALL.into_iter().map(move |channel| self.get(channel))
    }
}

impl fmt::Debug for RecoveryFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryFactors").finish_non_exhaustive()
    }
}
