//! Route handlers: thin mappers from HTTP to the account flows and gates.

pub mod account;
pub mod health;
pub mod staff;

use axum::response::IntoResponse;

// axum handler for the service banner
pub async fn root() -> impl IntoResponse {
    crate::APP_USER_AGENT
}
