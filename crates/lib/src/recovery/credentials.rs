//! Account user signup and password management.

use super::{
    errors::RecoveryError,
    factor::{RecoveryFactor, normalize_email},
};
use crate::{
    Error, Result,
    config::KdfParams,
    crypto,
    ids::AccountUserId,
    model::{AccountUser, AdminLevel, Channel},
};

fn hash_email(salt: &str, email: &str) -> String {
    crypto::hash_identifier(salt, normalize_email(email))
}

impl AccountUser {
    /// Create a new account user with no relationships.
    ///
    /// The password is stored as an Argon2id PHC string and the email as a
    /// salted SHA-256 of its normalized form.
    pub fn signup(
        email: &str,
        password: &str,
        admin_level: AdminLevel,
        params: &KdfParams,
    ) -> Result<Self> {
        let salt = crypto::generate_salt();
        let user = Self {
            account_user_id: AccountUserId::generate(),
            hashed_email: hash_email(&salt, email),
            hashed_password: crypto::hash_password(password, params)?,
            salt,
            admin_level,
            relationships: Vec::new(),
        };
        tracing::info!(account_user_id = %user.account_user_id, "Signed up account user");
        Ok(user)
    }

    /// Check a password against the stored hash.
    pub fn verify_password(&self, password: &str) -> Result<()> {
        crypto::verify_password(password, &self.hashed_password).map_err(|err| match err {
            Error::Crypto(ref e) if e.is_authentication_failure() => {
                RecoveryError::InvalidCredentials {
                    account_user_id: self.account_user_id.clone(),
                }
                .into()
            }
            other => other,
        })
    }

    pub fn matches_email(&self, email: &str) -> bool {
        hash_email(&self.salt, email) == self.hashed_email
    }

    /// Change the password and rotate the password channel of every relationship.
    ///
    /// Either every relationship is rotated or none is.
    pub fn change_password(
        &mut self,
        old_password: &str,
        new_password: &str,
        params: &KdfParams,
    ) -> Result<()> {
        self.verify_password(old_password)?;

        let mut relationships = self.relationships.clone();
        for relationship in &mut relationships {
            relationship.change_password(old_password, new_password, &self.salt, params)?;
        }

        self.hashed_password = crypto::hash_password(new_password, params)?;
        self.relationships = relationships;
        tracing::info!(
            account_user_id = %self.account_user_id,
            relationships = self.relationships.len(),
            "Changed password"
        );
        Ok(())
    }

    /// Set a new password after proving control of the email or a one-time token.
    ///
    /// An email factor must match the stored email hash. A one-time token
    /// only exists inside relationships, so a user without any cannot reset
    /// through one. Every relationship must unlock through `via`; either all
    /// of them move to the new password or none does.
    pub fn reset_password(
        &mut self,
        via: &RecoveryFactor<'_>,
        new_password: &str,
        params: &KdfParams,
    ) -> Result<()> {
        let verified = match via.channel() {
            Channel::Password => {
                return Err(RecoveryError::ResetChannelNotAllowed {
                    channel: via.channel(),
                }
                .into());
            }
            Channel::Email => self.matches_email(via.material()),
            Channel::OneTime => !self.relationships.is_empty(),
        };
        if !verified {
            tracing::warn!(
                account_user_id = %self.account_user_id,
                channel = %via.channel(),
                "Rejected password reset"
            );
            return Err(RecoveryError::InvalidCredentials {
                account_user_id: self.account_user_id.clone(),
            }
            .into());
        }

        let mut relationships = self.relationships.clone();
        for relationship in &mut relationships {
            relationship.reset_password(via, new_password, &self.salt, params)?;
        }

        self.hashed_password = crypto::hash_password(new_password, params)?;
        self.relationships = relationships;
        tracing::info!(
            account_user_id = %self.account_user_id,
            channel = %via.channel(),
            "Reset password"
        );
        Ok(())
    }
}
