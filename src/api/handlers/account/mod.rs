//! Account endpoints.
//!
//! Flow overview: the session middleware has already resolved the actor;
//! handlers run a gate where required, call the matching account flow, and
//! map the result onto status codes, redirects, and cookies.

pub mod types;

use axum::{
    extract::Extension,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::error;

use self::types::{
    ChangePasswordRequest, LoginRequest, ManagementResponse, RegisterRequest, RegisterResponse,
    SessionResponse, UpdateProfileRequest, ViolationsResponse,
};
use crate::account::{self, AuthError, IssuedSession, ProfileInput, RegistrationInput};
use crate::auth::claims::ActorContext;
use crate::auth::gate::{require_authenticated, GateRejection};
use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::auth::state::AuthState;

/// Landing area after login and profile mutations.
pub const MANAGEMENT_REDIRECT: &str = "/account/management";

#[utoipa::path(
    post,
    path = "/v1/account/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; log in to authenticate", body = RegisterResponse),
        (status = 400, description = "Field policy violations", body = ViolationsResponse),
        (status = 409, description = "Email already registered", body = String)
    ),
    tag = "account"
)]
pub async fn register(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let input = RegistrationInput {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        password: request.password,
    };
    match account::register(&state, input).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                message: "Registration complete. Please log in.".to_string(),
            }),
        )
            .into_response(),
        Err(err) => flow_error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/account/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Authenticated; session cookie set, redirect to the management area"),
        (status = 401, description = "Invalid credentials", body = String)
    ),
    tag = "account"
)]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match account::login(&state, &request.email, &request.password).await {
        Ok(session) => redirect_with_session(&state, &session, MANAGEMENT_REDIRECT),
        Err(err) => flow_error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/account/logout",
    responses(
        (status = 303, description = "Session cookie cleared, redirect home")
    ),
    tag = "account"
)]
pub async fn logout(state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // No store access and no token inspection: clearing is unconditional and
    // therefore idempotent.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(state.config()) {
        headers.insert(SET_COOKIE, cookie);
    }
    headers.insert(LOCATION, HeaderValue::from_static("/"));
    (StatusCode::SEE_OTHER, headers).into_response()
}

#[utoipa::path(
    get,
    path = "/v1/account/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "account"
)]
pub async fn session(Extension(actor): Extension<ActorContext>) -> impl IntoResponse {
    match actor.claims() {
        Some(claims) => {
            (StatusCode::OK, Json(SessionResponse::from_claims(claims))).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/account/management",
    responses(
        (status = 200, description = "Management payload for the signed-in account", body = ManagementResponse),
        (status = 303, description = "Not authenticated; redirect to login")
    ),
    tag = "account"
)]
pub async fn management(Extension(actor): Extension<ActorContext>) -> impl IntoResponse {
    let claims = match require_authenticated(&actor) {
        Ok(claims) => claims,
        Err(rejection) => return rejection.into_response(),
    };
    (
        StatusCode::OK,
        Json(ManagementResponse {
            account_id: claims.account_id.to_string(),
            first_name: claims.first_name.clone(),
            role: claims.role,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/account/update",
    request_body = UpdateProfileRequest,
    responses(
        (status = 303, description = "Profile updated; fresh session cookie set"),
        (status = 400, description = "Field policy violations", body = ViolationsResponse),
        (status = 409, description = "Email already registered", body = String)
    ),
    tag = "account"
)]
pub async fn update_profile(
    state: Extension<Arc<AuthState>>,
    Extension(actor): Extension<ActorContext>,
    payload: Option<Json<UpdateProfileRequest>>,
) -> impl IntoResponse {
    let claims = match require_authenticated(&actor) {
        Ok(claims) => claims,
        Err(rejection) => return rejection.into_response(),
    };
    let request: UpdateProfileRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    // The target account is always the authenticated one; ids in request
    // bodies are not trusted.
    let input = ProfileInput {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
    };
    match account::update_profile(&state, claims.account_id, input).await {
        Ok(session) => redirect_with_session(&state, &session, MANAGEMENT_REDIRECT),
        Err(err) => flow_error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/account/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 303, description = "Password changed; fresh session cookie set"),
        (status = 400, description = "Password policy violation", body = ViolationsResponse)
    ),
    tag = "account"
)]
pub async fn change_password(
    state: Extension<Arc<AuthState>>,
    Extension(actor): Extension<ActorContext>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> impl IntoResponse {
    let claims = match require_authenticated(&actor) {
        Ok(claims) => claims,
        Err(rejection) => return rejection.into_response(),
    };
    let request: ChangePasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match account::change_password(&state, claims.account_id, &request.password).await {
        Ok(session) => redirect_with_session(&state, &session, MANAGEMENT_REDIRECT),
        Err(err) => flow_error_response(&err),
    }
}

/// 303 with the session cookie attached, pointing at `target`.
fn redirect_with_session(state: &AuthState, session: &IssuedSession, target: &str) -> Response {
    let cookie = match session_cookie(state.config(), &session.token) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Try again.".to_string(),
            )
                .into_response();
        }
    };
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    match HeaderValue::from_str(target) {
        Ok(location) => {
            headers.insert(LOCATION, location);
        }
        Err(err) => error!("invalid redirect target {target}: {err}"),
    }
    (StatusCode::SEE_OTHER, headers).into_response()
}

/// Shared flow-error mapping. Storage detail is logged, never echoed.
fn flow_error_response(err: &AuthError) -> Response {
    match err {
        AuthError::Validation(violations) => (
            StatusCode::BAD_REQUEST,
            Json(ViolationsResponse {
                violations: violations.clone(),
            }),
        )
            .into_response(),
        AuthError::DuplicateEmail => (
            StatusCode::CONFLICT,
            "Email exists. Please log in or use a different email address.".to_string(),
        )
            .into_response(),
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Please check your credentials and try again.".to_string(),
        )
            .into_response(),
        AuthError::NotAuthenticated => GateRejection::NotAuthenticated.into_response(),
        AuthError::InsufficientRole => GateRejection::InsufficientRole.into_response(),
        AuthError::Storage(err) => {
            error!("account flow failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Try again.".to_string(),
            )
                .into_response()
        }
    }
}
