//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes, such as
//! starting the API server with its full configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth::{
    ARG_PUBLIC_BASE_URL, ARG_SESSION_TTL_SECONDS, ARG_TOKEN_SECRET,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches.get_one::<String>("dsn").cloned();

    let token_secret = matches
        .get_one::<String>(ARG_TOKEN_SECRET)
        .cloned()
        .context("missing required argument: --token-secret")?;

    let session_ttl_seconds = matches
        .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
        .copied()
        .unwrap_or(3600);
    if session_ttl_seconds <= 0 {
        anyhow::bail!("--session-ttl-seconds must be positive");
    }

    let public_base_url = matches
        .get_one::<String>(ARG_PUBLIC_BASE_URL)
        .cloned()
        .context("missing required argument: --public-base-url")?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret: SecretString::from(token_secret),
        session_ttl_seconds,
        public_base_url,
    }))
}
