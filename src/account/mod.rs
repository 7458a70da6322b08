//! Account flows: register, login, profile update, and password change.
//!
//! Each flow is a sequence over the auth core and the credential store. The
//! HTTP layer stays a thin mapper: everything here is callable (and tested)
//! without a server.

use anyhow::anyhow;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::claims::SessionClaims;
use crate::auth::gate::GateRejection;
use crate::auth::password;
use crate::auth::policy::{self, FieldViolation};
use crate::auth::state::AuthState;
use crate::store::{Account, NewAccount, ProfileFields, StoreError};

/// Failure taxonomy for account flows. Validation and credential errors are
/// recovered at this boundary by the caller; only `Storage` may propagate to
/// a generic handler.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("insufficient role")]
    InsufficientRole,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::Backend(err) => Self::Storage(err),
        }
    }
}

impl From<GateRejection> for AuthError {
    fn from(err: GateRejection) -> Self {
        match err {
            GateRejection::NotAuthenticated => Self::NotAuthenticated,
            GateRejection::InsufficientRole => Self::InsufficientRole,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RegistrationInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A freshly signed token plus the claims it carries.
#[derive(Clone, Debug)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

/// Create an account. Succeeds silently; the caller still has to log in.
///
/// The pre-insert lookup is a fast path for friendlier duplicate errors; the
/// store's own uniqueness constraint remains the guarantee under concurrent
/// registrations.
///
/// # Errors
///
/// `Validation`, `DuplicateEmail`, or `Storage`.
pub async fn register(state: &AuthState, input: RegistrationInput) -> Result<(), AuthError> {
    let first_name = input.first_name.trim().to_string();
    let last_name = input.last_name.trim().to_string();
    let email = policy::normalize_email(&input.email);

    let violations =
        policy::registration_violations(&first_name, &last_name, &email, &input.password);
    if !violations.is_empty() {
        return Err(AuthError::Validation(violations));
    }

    if state.store().find_by_email(&email).await?.is_some() {
        return Err(AuthError::DuplicateEmail);
    }

    let password_hash = password::hash(input.password).await?;
    let account = state
        .store()
        .insert(NewAccount {
            first_name,
            last_name,
            email,
            password_hash,
        })
        .await?;

    info!(account_id = %account.id, "registered account");
    Ok(())
}

/// Authenticate and mint a session.
///
/// Unknown emails still verify against a fallback hash so both failure paths
/// do comparable work before collapsing into `InvalidCredentials`.
///
/// # Errors
///
/// `InvalidCredentials` or `Storage`.
pub async fn login(
    state: &AuthState,
    email: &str,
    password_plain: &str,
) -> Result<IssuedSession, AuthError> {
    let email = policy::normalize_email(email);
    let account = state.store().find_by_email(&email).await?;

    let stored_hash = account.as_ref().map_or_else(
        || state.fallback_hash().to_string(),
        |account| account.password_hash.clone(),
    );
    let verified = password::verify(password_plain.to_string(), stored_hash).await?;

    let Some(account) = account else {
        return Err(AuthError::InvalidCredentials);
    };
    if !verified {
        return Err(AuthError::InvalidCredentials);
    }

    info!(account_id = %account.id, "login succeeded");
    issue_session(state, &account)
}

/// Update names and email, then re-issue claims from the stored record so
/// the old token's contents are no longer load-bearing.
///
/// # Errors
///
/// `Validation`, `DuplicateEmail`, or `Storage`.
pub async fn update_profile(
    state: &AuthState,
    account_id: Uuid,
    input: ProfileInput,
) -> Result<IssuedSession, AuthError> {
    let first_name = input.first_name.trim().to_string();
    let last_name = input.last_name.trim().to_string();
    let email = policy::normalize_email(&input.email);

    let violations = policy::profile_violations(&first_name, &last_name, &email);
    if !violations.is_empty() {
        return Err(AuthError::Validation(violations));
    }

    let current = state
        .store()
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| anyhow!("account {account_id} missing from credential store"))?;

    // Re-check uniqueness only when the email actually changes, excluding the
    // account's own row.
    if email != current.email {
        if let Some(existing) = state.store().find_by_email(&email).await? {
            if existing.id != account_id {
                return Err(AuthError::DuplicateEmail);
            }
        }
    }

    let updated = state
        .store()
        .update_profile(
            account_id,
            ProfileFields {
                first_name,
                last_name,
                email,
            },
        )
        .await?;
    if !updated {
        return Err(AuthError::Storage(anyhow!(
            "profile update affected no rows for account {account_id}"
        )));
    }

    let account = state
        .store()
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| anyhow!("account {account_id} missing after profile update"))?;

    info!(account_id = %account.id, "profile updated, session re-issued");
    issue_session(state, &account)
}

/// Replace the stored password hash and re-issue the session. Claims are
/// password-independent, so the re-issue is defense in depth rather than a
/// correctness requirement.
///
/// # Errors
///
/// `Validation` or `Storage`.
pub async fn change_password(
    state: &AuthState,
    account_id: Uuid,
    new_password: &str,
) -> Result<IssuedSession, AuthError> {
    if let Some(violation) = policy::password_violation(new_password) {
        return Err(AuthError::Validation(vec![violation]));
    }

    let password_hash = password::hash(new_password.to_string()).await?;
    let updated = state
        .store()
        .update_password_hash(account_id, &password_hash)
        .await?;
    if !updated {
        return Err(AuthError::Storage(anyhow!(
            "password update affected no rows for account {account_id}"
        )));
    }

    let account = state
        .store()
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| anyhow!("account {account_id} missing after password update"))?;

    info!(account_id = %account.id, "password changed");
    issue_session(state, &account)
}

fn issue_session(state: &AuthState, account: &Account) -> Result<IssuedSession, AuthError> {
    let claims = SessionClaims::from_account(account);
    let token = state
        .codec()
        .issue(&claims, state.config().session_ttl_seconds())
        .map_err(|err| {
            AuthError::Storage(anyhow::Error::new(err).context("failed to issue session token"))
        })?;
    Ok(IssuedSession { token, claims })
}
