//! Session resolution middleware and the cookie transport boundary.
//!
//! Runs before route dispatch on every request so `ActorContext` is always
//! present downstream. Token failures never propagate: the actor resolves to
//! `Anonymous` and the stale cookie is cleared on the way out.

use axum::{
    extract::{Request, State},
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::{claims::ActorContext, state::AuthConfig, state::AuthState, token::TokenError};

pub const SESSION_COOKIE_NAME: &str = "custos_session";

/// Resolve the inbound token into an [`ActorContext`] request extension.
pub async fn resolve_actor(
    State(state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut stale_token = false;
    let actor = match extract_session_token(request.headers()) {
        None => ActorContext::Anonymous,
        Some(token) => match state.codec().verify(&token) {
            Ok(claims) => ActorContext::Authenticated(claims),
            Err(err) => {
                // The three failure kinds stay distinct in the logs; callers
                // only ever observe Anonymous plus a cleared cookie.
                match err {
                    TokenError::Expired => debug!("session token expired"),
                    TokenError::Tampered => debug!("session token signature mismatch"),
                    _ => debug!("session token rejected: {err}"),
                }
                stale_token = true;
                ActorContext::Anonymous
            }
        },
    };
    request.extensions_mut().insert(actor);

    let mut response = next.run(request).await;
    if stale_token {
        if let Ok(cookie) = clear_session_cookie(state.config()) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    response
}

/// Build the `HttpOnly` session cookie carrying a freshly issued token.
///
/// # Errors
///
/// Returns an error if the token produces an invalid header value.
pub fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Cookie that instructs the browser to drop the session token.
///
/// # Errors
///
/// Returns an error if the header value cannot be constructed.
pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the bearer token from the `Authorization` header or session cookie.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
