//! Issuing, unlocking, verifying and rotating the three KEK copies.
//!
//! Every channel wraps the same key-encryption-key with a key derived from
//! that channel's factor and the account user's salt. Channels are
//! independent: unlocking or rotating one never touches the other two.

use super::{
    errors::RecoveryError,
    factor::{ONE_TIME_TOKEN_BYTES, RecoveryFactor, RecoveryFactors},
    kek::KeyEncryptionKey,
};
use crate::{
    Error, Result,
    config::KdfParams,
    crypto,
    ids::{AccountId, RelationshipId},
    model::{AccountUser, AccountUserRelationship, Channel, ModelError},
};

impl AccountUserRelationship {
    /// Give `user` access to an account by encrypting its KEK once per channel.
    pub fn grant(
        user: &AccountUser,
        account_id: AccountId,
        kek: &KeyEncryptionKey,
        factors: &RecoveryFactors,
        params: &KdfParams,
    ) -> Result<Self> {
        let wrap = |channel: Channel| -> Result<String> {
            let key = factors.get(channel).wrapping_key(&user.salt, params)?;
            crypto::seal(&*key, kek.as_bytes())
        };

        let relationship = Self {
            relationship_id: RelationshipId::generate(),
            account_user_id: user.account_user_id.clone(),
            account_id,
            password_encrypted_key_encryption_key: wrap(Channel::Password)?,
            email_encrypted_key_encryption_key: wrap(Channel::Email)?,
            one_time_encrypted_key_encryption_key: wrap(Channel::OneTime)?,
        };

        tracing::info!(
            relationship_id = %relationship.relationship_id,
            account_user_id = %relationship.account_user_id,
            account_id = %relationship.account_id,
            "Granted account access"
        );
        Ok(relationship)
    }

    /// Recover the KEK through the factor's channel only.
    pub fn unlock(
        &self,
        factor: &RecoveryFactor<'_>,
        salt: &str,
        params: &KdfParams,
    ) -> Result<KeyEncryptionKey> {
        let channel = factor.channel();
        let key = factor.wrapping_key(salt, params)?;

        let plaintext = crypto::open(&*key, self.encrypted_key_encryption_key(channel))
            .map_err(|err| match err {
                Error::Crypto(ref e) if e.is_authentication_failure() => {
                    RecoveryError::ChannelLocked {
                        relationship_id: self.relationship_id.clone(),
                        channel,
                    }
                    .into()
                }
                other => other,
            })?;

        KeyEncryptionKey::from_bytes(&plaintext).map_err(|_| {
            tracing::warn!(
                relationship_id = %self.relationship_id,
                %channel,
                "Channel decrypted to a malformed key-encryption-key"
            );
            RecoveryError::MalformedKeyEncryptionKey {
                relationship_id: self.relationship_id.clone(),
                channel,
            }
            .into()
        })
    }

    /// Unlock all three channels and check they hold the same KEK.
    ///
    /// Disagreement is reported as corruption; the channels are never
    /// reconciled.
    pub fn verify_channels(
        &self,
        factors: &RecoveryFactors,
        salt: &str,
        params: &KdfParams,
    ) -> Result<KeyEncryptionKey> {
        let kek = self.unlock(&factors.get(Channel::Password), salt, params)?;
        for channel in [Channel::Email, Channel::OneTime] {
            if self.unlock(&factors.get(channel), salt, params)? != kek {
                tracing::warn!(
                    relationship_id = %self.relationship_id,
                    %channel,
                    "Divergent key-encryption-key detected"
                );
                return Err(RecoveryError::DivergentKeyEncryptionKey {
                    relationship_id: self.relationship_id.clone(),
                    channel,
                }
                .into());
            }
        }
        Ok(kek)
    }

    /// Re-encrypt one channel under a replacement factor.
    ///
    /// The KEK is first recovered through `via`, so the rotated channel
    /// always wraps the key the other channels hold. Returns that KEK.
    pub fn rotate(
        &mut self,
        via: &RecoveryFactor<'_>,
        replacement: &RecoveryFactor<'_>,
        salt: &str,
        params: &KdfParams,
    ) -> Result<KeyEncryptionKey> {
        let kek = self.unlock(via, salt, params)?;
        self.rewrap(&kek, replacement, salt, params)?;
        Ok(kek)
    }

    /// Move the password channel from `old_password` to `new_password`.
    pub fn change_password(
        &mut self,
        old_password: &str,
        new_password: &str,
        salt: &str,
        params: &KdfParams,
    ) -> Result<()> {
        self.rotate(
            &RecoveryFactor::password(old_password),
            &RecoveryFactor::password(new_password),
            salt,
            params,
        )?;
        Ok(())
    }

    /// Recover the KEK through the email or one-time channel and set a new password.
    ///
    /// Returns the recovered KEK so the caller can continue the session.
    pub fn reset_password(
        &mut self,
        via: &RecoveryFactor<'_>,
        new_password: &str,
        salt: &str,
        params: &KdfParams,
    ) -> Result<KeyEncryptionKey> {
        if via.channel() == Channel::Password {
            return Err(RecoveryError::ResetChannelNotAllowed {
                channel: via.channel(),
            }
            .into());
        }
        self.rotate(via, &RecoveryFactor::password(new_password), salt, params)
    }

    /// Replace the one-time channel with a freshly generated token.
    ///
    /// Returns the new token. The previous token stops working.
    pub fn renew_one_time_token(
        &mut self,
        via: &RecoveryFactor<'_>,
        salt: &str,
        params: &KdfParams,
    ) -> Result<String> {
        let token = crypto::random_token(ONE_TIME_TOKEN_BYTES);
        self.rotate(via, &RecoveryFactor::one_time(&token), salt, params)?;
        Ok(token)
    }

    fn rewrap(
        &mut self,
        kek: &KeyEncryptionKey,
        replacement: &RecoveryFactor<'_>,
        salt: &str,
        params: &KdfParams,
    ) -> Result<()> {
        let channel = replacement.channel();
        let key = replacement.wrapping_key(salt, params)?;
        let ciphertext = crypto::seal(&*key, kek.as_bytes())?;
        self.set_encrypted_key_encryption_key(channel, ciphertext);

        tracing::info!(relationship_id = %self.relationship_id, %channel, "Rotated recovery channel");
        Ok(())
    }
}

impl AccountUser {
    /// Grant this user access to an account.
    ///
    /// Fails without deriving any key when the user already has a
    /// relationship with the account.
    pub fn grant_access(
        &mut self,
        account_id: AccountId,
        kek: &KeyEncryptionKey,
        factors: &RecoveryFactors,
        params: &KdfParams,
    ) -> Result<&AccountUserRelationship> {
        if self.relationship(&account_id).is_some() {
            return Err(ModelError::DuplicateRelationship {
                account_user_id: self.account_user_id.clone(),
                account_id,
            }
            .into());
        }
        let relationship =
            AccountUserRelationship::grant(self, account_id.clone(), kek, factors, params)?;
        self.add_relationship(relationship)?;
        self.require_relationship(&account_id)
    }

    /// Grant `grantee` access to an account this user can already unlock.
    ///
    /// Only super admins may share access.
    pub fn share_access(
        &self,
        account_id: &AccountId,
        via: &RecoveryFactor<'_>,
        grantee: &mut AccountUser,
        grantee_factors: &RecoveryFactors,
        params: &KdfParams,
    ) -> Result<()> {
        if !self.admin_level.can_manage_users() {
            return Err(RecoveryError::InsufficientPermissions {
                account_user_id: self.account_user_id.clone(),
            }
            .into());
        }
        let kek = self.unlock_account(account_id, via, params)?;
        grantee.grant_access(account_id.clone(), &kek, grantee_factors, params)?;
        Ok(())
    }

    /// Recover the KEK of an account through one channel.
    pub fn unlock_account(
        &self,
        account_id: &AccountId,
        factor: &RecoveryFactor<'_>,
        params: &KdfParams,
    ) -> Result<KeyEncryptionKey> {
        self.require_relationship(account_id)?
            .unlock(factor, &self.salt, params)
    }
}
