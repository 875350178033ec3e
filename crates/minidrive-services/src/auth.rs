//! Authentication oracle: resolves who is acting.
//!
//! Secrets are never stored; only their lowercase hex SHA-256 digest is kept and
//! compared.

use async_trait::async_trait;
use minidrive_core::validation::{validate_new_secret, validate_user_name};
use minidrive_core::{DriveError, DriveResult, Identity, UserAccount};
use minidrive_db::UserRepository;
use sha2::{Digest, Sha256};

/// Source of the acting identity.
#[async_trait]
pub trait AuthOracle: Send + Sync {
    /// The identity of the signed-in user, if any.
    async fn current_identity(&self) -> DriveResult<Option<Identity>>;

    /// Check credentials and, on success, make this user the current one.
    async fn authenticate(&self, user_name: &str, secret: &str) -> DriveResult<Identity>;

    async fn register(
        &self,
        user_name: &str,
        secret: &str,
        confirmation: &str,
    ) -> DriveResult<UserAccount>;

    async fn sign_out(&self) -> DriveResult<()>;
}

pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Oracle backed by the local `users` table.
#[derive(Clone)]
pub struct LocalAuthOracle {
    users: UserRepository,
}

impl LocalAuthOracle {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AuthOracle for LocalAuthOracle {
    async fn current_identity(&self) -> DriveResult<Option<Identity>> {
        self.users
            .current()
            .await?
            .map(|account| account.identity())
            .transpose()
    }

    #[tracing::instrument(skip(self, secret))]
    async fn authenticate(&self, user_name: &str, secret: &str) -> DriveResult<Identity> {
        let user_name = user_name.trim();
        let account = self
            .users
            .find(user_name)
            .await?
            .ok_or(DriveError::AuthenticationFailed)?;

        if account.password_digest != hash_secret(secret) {
            tracing::warn!("Rejected credentials");
            return Err(DriveError::AuthenticationFailed);
        }

        self.users.set_current(&account.user_name).await?;
        tracing::info!("User signed in");
        account.identity()
    }

    #[tracing::instrument(skip(self, secret, confirmation))]
    async fn register(
        &self,
        user_name: &str,
        secret: &str,
        confirmation: &str,
    ) -> DriveResult<UserAccount> {
        let user_name = validate_user_name(user_name)?;
        validate_new_secret(secret, confirmation)?;

        self.users.create(&user_name, &hash_secret(secret)).await
    }

    async fn sign_out(&self) -> DriveResult<()> {
        self.users.clear_current().await?;
        tracing::info!("User signed out");
        Ok(())
    }
}
