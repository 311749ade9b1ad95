//! Identity provider seam.
//!
//! The persistence API never stores credentials itself; it asks an [`IdentityProvider`] to
//! create accounts, issue and revoke session tokens, and resolve a bearer token to a user.
//! [`InMemoryIdentity`] is the development implementation: accounts are pre-confirmed and
//! everything is lost on restart.

use api_shared::{SessionRes, User};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use storyforge_types::{EmailAddress, NonEmptyText, TextError};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{0}")]
    InvalidInput(#[from] TextError),
    #[error("Password should be at least 6 characters")]
    WeakPassword,
    #[error("A user with this email address has already been registered")]
    EmailTaken,
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("invalid or expired session token")]
    InvalidToken,
}

impl IdentityError {
    /// True for failures caused by what the caller sent rather than by the provider.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IdentityError::InvalidToken)
    }
}

pub type IdentityResult<T> = std::result::Result<T, IdentityError>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registers a new, already confirmed account.
    async fn create_user(
        &self,
        email: &EmailAddress,
        password: &str,
        name: &NonEmptyText,
    ) -> IdentityResult<User>;

    /// Resolves a session token to its user.
    async fn user_for_token(&self, token: &str) -> IdentityResult<User>;

    /// Checks credentials and issues a new session token.
    async fn sign_in(&self, email: &EmailAddress, password: &str) -> IdentityResult<SessionRes>;

    /// Revokes a session token.
    async fn sign_out(&self, token: &str) -> IdentityResult<()>;
}

struct Account {
    user: User,
    salt: String,
    password_hash: String,
}

#[derive(Default)]
struct Directory {
    accounts: HashMap<EmailAddress, Account>,
    sessions: HashMap<String, EmailAddress>,
}

/// In-process identity provider for development and tests.
///
/// Not meant to face untrusted clients:
/// - Sessions never expire. A token lives until `sign_out` or a restart, so the session table
///   only grows for callers that never sign out.
/// - Password hashes are compared with `==`, which is not constant time.
#[derive(Default)]
pub struct InMemoryIdentity {
    directory: RwLock<Directory>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn create_user(
        &self,
        email: &EmailAddress,
        password: &str,
        name: &NonEmptyText,
    ) -> IdentityResult<User> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }

        let mut directory = self.directory.write().await;
        if directory.accounts.contains_key(email) {
            return Err(IdentityError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.as_str().to_owned(),
            name: name.as_str().to_owned(),
        };
        let salt = Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&salt, password);
        directory.accounts.insert(
            email.clone(),
            Account {
                user: user.clone(),
                salt,
                password_hash,
            },
        );
        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    async fn user_for_token(&self, token: &str) -> IdentityResult<User> {
        let directory = self.directory.read().await;
        directory
            .sessions
            .get(token)
            .and_then(|email| directory.accounts.get(email))
            .map(|account| account.user.clone())
            .ok_or(IdentityError::InvalidToken)
    }

    async fn sign_in(&self, email: &EmailAddress, password: &str) -> IdentityResult<SessionRes> {
        let mut directory = self.directory.write().await;
        let user = match directory.accounts.get(email) {
            Some(account) if hash_password(&account.salt, password) == account.password_hash => {
                account.user.clone()
            }
            _ => return Err(IdentityError::InvalidCredentials),
        };

        let access_token = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        directory
            .sessions
            .insert(access_token.clone(), email.clone());
        tracing::debug!(user_id = %user.id, "issued session");
        Ok(SessionRes { access_token, user })
    }

    async fn sign_out(&self, token: &str) -> IdentityResult<()> {
        self.directory
            .write()
            .await
            .sessions
            .remove(token)
            .map(|_| ())
            .ok_or(IdentityError::InvalidToken)
    }
}
