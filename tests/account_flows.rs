//! End-to-end exercise of the account flows over the in-memory store:
//! register, duplicate registration, login, token tampering, and a profile
//! update colliding with another account's email.

use anyhow::{Context, Result};
use custos::account::{self, AuthError, ProfileInput, RegistrationInput};
use custos::auth::claims::{ActorContext, Role};
use custos::auth::gate::{require_authenticated, require_elevated, GateRejection};
use custos::auth::state::{AuthConfig, AuthState};
use custos::store::MemoryStore;
use secrecy::SecretString;
use std::sync::Arc;

fn state_with_store() -> Result<(AuthState, Arc<MemoryStore>)> {
    let store = Arc::new(MemoryStore::new());
    let state = AuthState::new(
        AuthConfig::new("http://localhost:8080".to_string()),
        &SecretString::from("integration-test-secret"),
        store.clone(),
    )?;
    Ok((state, store))
}

fn ann() -> RegistrationInput {
    RegistrationInput {
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        email: "ann@example.com".to_string(),
        password: "Str0ng!Passw0rd".to_string(),
    }
}

#[tokio::test]
async fn register_login_tamper_and_collide() -> Result<()> {
    let (state, _store) = state_with_store()?;

    // Register Ann, then hit the duplicate on an exact re-registration.
    account::register(&state, ann()).await?;
    assert!(matches!(
        account::register(&state, ann()).await,
        Err(AuthError::DuplicateEmail)
    ));

    // Login produces a token whose decoded claims carry the first name and,
    // by construction, nothing password-shaped.
    let session = account::login(&state, "ann@example.com", "Str0ng!Passw0rd").await?;
    let decoded = state.codec().verify(&session.token)?;
    assert_eq!(decoded.first_name, "Ann");
    let claims_json = serde_json::to_value(&decoded)?;
    let object = claims_json
        .as_object()
        .context("claims should serialize to an object")?;
    assert!(object.keys().all(|key| !key.to_lowercase().contains("password")));

    // One flipped character must read as tampering, never as claims.
    let mut tampered = session.token.clone().into_bytes();
    let position = tampered.len() - 5;
    tampered[position] = if tampered[position] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered)?;
    assert!(matches!(
        state.codec().verify(&tampered),
        Err(custos::auth::token::TokenError::Tampered)
    ));

    // A second account exists; moving Ann onto its email must fail and leave
    // her profile untouched.
    account::register(
        &state,
        RegistrationInput {
            first_name: "Bob".to_string(),
            last_name: "Day".to_string(),
            email: "bob@example.com".to_string(),
            password: "An0ther!Passw0rd".to_string(),
        },
    )
    .await?;
    let result = account::update_profile(
        &state,
        decoded.account_id,
        ProfileInput {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "bob@example.com".to_string(),
        },
    )
    .await;
    assert!(matches!(result, Err(AuthError::DuplicateEmail)));

    let reloaded = state
        .store()
        .find_by_id(decoded.account_id)
        .await?
        .context("ann should still exist")?;
    assert_eq!(reloaded.email, "ann@example.com");
    Ok(())
}

#[tokio::test]
async fn both_login_misses_collapse_into_invalid_credentials() -> Result<()> {
    let (state, _store) = state_with_store()?;
    account::register(&state, ann()).await?;

    for (email, password) in [
        ("ann@example.com", "Wr0ng!Passw0rd!"),
        ("missing@example.com", "Str0ng!Passw0rd"),
    ] {
        let err = account::login(&state, email, password)
            .await
            .err()
            .context("login must fail")?;
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "invalid credentials");
    }
    Ok(())
}

#[tokio::test]
async fn elevated_gate_tracks_store_assigned_roles() -> Result<()> {
    let (state, store) = state_with_store()?;
    account::register(&state, ann()).await?;
    let session = account::login(&state, "ann@example.com", "Str0ng!Passw0rd").await?;

    // Fresh registrations are customers and stay out of the staff area.
    let actor = ActorContext::Authenticated(session.claims.clone());
    assert!(require_authenticated(&actor).is_ok());
    assert_eq!(
        require_elevated(&actor),
        Err(GateRejection::InsufficientRole)
    );

    // Promotion happens in the store, outside any flow; claims pick it up at
    // the next login.
    assert!(store.assign_role(session.claims.account_id, Role::Employee).await);
    let session = account::login(&state, "ann@example.com", "Str0ng!Passw0rd").await?;
    let actor = ActorContext::Authenticated(session.claims);
    assert!(require_elevated(&actor).is_ok());
    Ok(())
}

#[tokio::test]
async fn expired_sessions_resolve_to_errors_at_the_codec() -> Result<()> {
    let (state, _store) = state_with_store()?;
    account::register(&state, ann()).await?;
    let session = account::login(&state, "ann@example.com", "Str0ng!Passw0rd").await?;

    // Issue with a pinned clock and verify one TTL later.
    let now = 1_700_000_000;
    let token = state.codec().issue_at(&session.claims, 60, now)?;
    assert!(state.codec().verify_at(&token, now + 59).is_ok());
    assert!(matches!(
        state.codec().verify_at(&token, now + 60),
        Err(custos::auth::token::TokenError::Expired)
    ));
    Ok(())
}
