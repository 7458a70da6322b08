//! Actor identity types: roles, session claims, and the per-request actor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Account;

/// Coarse-grained permission tier. Assignment is store-managed; no flow in
/// this crate writes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Customer,
    Employee,
    Admin,
}

impl Role {
    /// Roles allowed past the elevated gate.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Employee => "Employee",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Customer" => Ok(Self::Customer),
            "Employee" => Ok(Self::Employee),
            "Admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Account projection embedded in the bearer token.
///
/// Built only through [`SessionClaims::from_account`], which has no access
/// to the password hash field by construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl SessionClaims {
    /// Project the token-safe subset of an account record.
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.id,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

/// Identity resolved for the current request. Rebuilt from the transport
/// token on every request; never persisted.
#[derive(Clone, Debug)]
pub enum ActorContext {
    Anonymous,
    Authenticated(SessionClaims),
}

impl ActorContext {
    #[must_use]
    pub fn claims(&self) -> Option<&SessionClaims> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(claims) => Some(claims),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    fn account() -> Account {
        Account {
            id: Uuid::nil(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Customer,
        }
    }

    #[test]
    fn role_round_trips_through_str() -> Result<()> {
        for role in [Role::Customer, Role::Employee, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().ok(), Some(role));
        }
        assert!("Owner".parse::<Role>().is_err());
        Ok(())
    }

    #[test]
    fn elevated_roles() {
        assert!(!Role::Customer.is_elevated());
        assert!(Role::Employee.is_elevated());
        assert!(Role::Admin.is_elevated());
    }

    #[test]
    fn claims_never_carry_the_password_hash() -> Result<()> {
        let claims = SessionClaims::from_account(&account());
        let value = serde_json::to_value(&claims)?;
        let object = value.as_object().context("claims should be an object")?;
        assert!(object.keys().all(|key| !key.contains("password")));
        assert_eq!(
            object.get("first_name").and_then(serde_json::Value::as_str),
            Some("Ann")
        );
        Ok(())
    }

    #[test]
    fn actor_context_exposes_claims_only_when_authenticated() {
        let anonymous = ActorContext::Anonymous;
        assert!(!anonymous.is_authenticated());
        assert!(anonymous.claims().is_none());

        let actor = ActorContext::Authenticated(SessionClaims::from_account(&account()));
        assert!(actor.is_authenticated());
        assert_eq!(actor.claims().map(|c| c.email.as_str()), Some("ann@example.com"));
    }
}
