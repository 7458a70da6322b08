//! Auth configuration and shared per-process state.

use anyhow::{Context, Result};
use rand::{rngs::OsRng, RngCore};
use secrecy::SecretString;
use std::sync::Arc;

use super::{password, token::TokenCodec};
use crate::store::CredentialStore;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    public_base_url: String,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(public_base_url: String) -> Self {
        Self {
            public_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Only mark cookies secure when the service is reached over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.public_base_url.starts_with("https://")
    }
}

/// Immutable process-lifetime state: configuration, the token codec, and the
/// credential store behind its trait.
pub struct AuthState {
    config: AuthConfig,
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
    fallback_hash: String,
}

impl AuthState {
    /// Build the shared state. Hashes one random value up front so login can
    /// burn comparable CPU on unknown emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the signing secret is unusable or the fallback
    /// hash cannot be produced.
    pub fn new(
        config: AuthConfig,
        token_secret: &SecretString,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let codec = TokenCodec::new(token_secret).context("failed to build token codec")?;

        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .context("failed to seed login fallback hash")?;
        let fallback_hash = password::hash_blocking(&hex_lower(&seed))
            .context("failed to hash login fallback value")?;

        Ok(Self {
            config,
            codec,
            store,
            fallback_hash,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn fallback_hash(&self) -> &str {
        &self.fallback_hash
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
