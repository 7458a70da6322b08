use crate::api;
use crate::auth::state::{AuthConfig, AuthState};
use crate::store::{CredentialStore, MemoryStore, PostgresStore};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::warn;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub token_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub public_base_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the auth state cannot be
/// built, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let config = AuthConfig::new(args.public_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    let store: Arc<dyn CredentialStore> = match &args.dsn {
        Some(dsn) => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?;
            Arc::new(PostgresStore::new(pool))
        }
        None => {
            // Development convenience only: every restart forgets all accounts.
            warn!("no DSN configured, falling back to the in-memory credential store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(
        AuthState::new(config, &args.token_secret, store)
            .context("failed to build auth state")?,
    );

    api::serve(args.port, state).await
}
