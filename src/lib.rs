//! # Custos (Account Authentication & Authorization)
//!
//! `custos` is the identity core behind a storefront web application. It owns
//! credential registration, password hashing, stateless session tokens, and
//! role-based gating; the storefront's CRUD surface calls into it to establish
//! who is asking and what they may do.
//!
//! ## Sessions
//!
//! Sessions are client-held: an HMAC-signed bearer token carried in an
//! `HttpOnly` cookie, rebuilt into an [`auth::claims::ActorContext`] on every
//! request by the session middleware. There is no server-side session table,
//! so logout clears the cookie but cannot revoke an already-issued, unexpired
//! token.
//!
//! ## Roles
//!
//! Accounts carry one of three roles (`Customer`, `Employee`, `Admin`),
//! assigned by the credential store and never writable through any flow here.
//! Route guards gate on "any authenticated actor" or "elevated role".
//!
//! ## Credential store
//!
//! Persistence sits behind [`store::CredentialStore`]: a Postgres adapter for
//! production and an in-memory adapter for tests and DSN-less development.
//! Email uniqueness is enforced by the store itself; pre-checks in the flows
//! are a user-experience fast path, not the guarantee.

pub mod account;
pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
