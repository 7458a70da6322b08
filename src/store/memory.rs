//! In-memory credential store for tests and DSN-less development runs.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount, ProfileFields, StoreError};
use crate::auth::claims::Role;

/// Same uniqueness semantics as the SQL adapter, enforced under one lock so
/// check and write cannot interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: promote an account to a given role, mimicking an operator
    /// acting directly on the store.
    pub async fn assign_role(&self, id: Uuid, role: Role) -> bool {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(&id) {
            Some(account) => {
                account.role = role;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email_normalized: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|account| account.email == email_normalized)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.values().any(|existing| existing.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let account = Account {
            id: Uuid::new_v4(),
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            password_hash: account.password_hash,
            role: Role::Customer,
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts
            .values()
            .any(|other| other.id != id && other.email == fields.email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        match accounts.get_mut(&id) {
            Some(account) => {
                account.first_name = fields.first_name;
                account.last_name = fields.last_name;
                account.email = fields.email;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(&id) {
            Some(account) => {
                account.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_customer_role() -> Result<()> {
        let store = MemoryStore::new();
        let account = store.insert(new_account("ann@example.com")).await?;
        assert_eq!(account.role, Role::Customer);

        let found = store.find_by_email("ann@example.com").await?;
        assert_eq!(found.map(|a| a.id), Some(account.id));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() -> Result<()> {
        let store = MemoryStore::new();
        store.insert(new_account("ann@example.com")).await?;
        let result = store.insert(new_account("ann@example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
        Ok(())
    }

    #[tokio::test]
    async fn profile_update_respects_other_accounts_emails() -> Result<()> {
        let store = MemoryStore::new();
        let ann = store.insert(new_account("ann@example.com")).await?;
        store.insert(new_account("bob@example.com")).await?;

        let stolen = ProfileFields {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "bob@example.com".to_string(),
        };
        assert!(matches!(
            store.update_profile(ann.id, stolen).await,
            Err(StoreError::DuplicateEmail)
        ));

        // Keeping your own email is not a conflict.
        let unchanged = ProfileFields {
            first_name: "Anne".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
        };
        assert!(store.update_profile(ann.id, unchanged).await?);
        let reloaded = store.find_by_id(ann.id).await?;
        assert_eq!(reloaded.map(|a| a.first_name), Some("Anne".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn updates_against_missing_ids_affect_zero_rows() -> Result<()> {
        let store = MemoryStore::new();
        let fields = ProfileFields {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
        };
        assert!(!store.update_profile(Uuid::new_v4(), fields).await?);
        assert!(!store.update_password_hash(Uuid::new_v4(), "$stub").await?);
        Ok(())
    }

    #[tokio::test]
    async fn password_update_replaces_only_the_hash() -> Result<()> {
        let store = MemoryStore::new();
        let ann = store.insert(new_account("ann@example.com")).await?;
        assert!(store.update_password_hash(ann.id, "$argon2id$new").await?);
        let reloaded = store.find_by_id(ann.id).await?.map(|a| a.password_hash);
        assert_eq!(reloaded, Some("$argon2id$new".to_string()));
        Ok(())
    }
}
