//! Credential store boundary: durable account records keyed by unique email.
//!
//! Adapters enforce email uniqueness themselves; callers may pre-check for a
//! friendlier error but must treat [`StoreError::DuplicateEmail`] from a
//! write as the authoritative signal.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::claims::Role;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Durable identity record. Emails are stored normalized (trimmed,
/// lowercased); `role` is assigned by the store, never by callers.
#[derive(Clone)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("role", &self.role)
            .finish()
    }
}

/// Insert payload; the store assigns id and role.
#[derive(Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .finish()
    }
}

/// Mutable profile fields; the password hash has its own operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's uniqueness constraint rejected the write.
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Abstract persistence capability consumed by the account flows.
///
/// Update operations distinguish "zero rows affected" (`Ok(false)`) from a
/// backend failure (`Err`).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email_normalized: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Insert a new account, role defaulted by the store.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> Result<bool, StoreError>;

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_masks_credential_material() {
        let account = Account {
            id: Uuid::nil(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: Role::Customer,
        };
        let rendered = format!("{account:?}");
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("argon2id"));

        let new_account = NewAccount {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
        };
        assert!(!format!("{new_account:?}").contains("argon2id"));
    }
}
