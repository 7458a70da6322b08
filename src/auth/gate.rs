//! Route guards over the resolved actor.
//!
//! Pure predicates: nothing here touches the store or mutates state. A
//! rejection names a redirect target and a user-facing notice, never a raw
//! error dump.

use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::claims::{ActorContext, SessionClaims};

pub const LOGIN_REDIRECT: &str = "/account/login";

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GateRejection {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("insufficient role")]
    InsufficientRole,
}

impl GateRejection {
    #[must_use]
    pub const fn redirect_target(self) -> &'static str {
        LOGIN_REDIRECT
    }

    #[must_use]
    pub const fn notice(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Please log in.",
            Self::InsufficientRole => {
                "You do not have the required authorization to access this area. \
                 Please log in with an authorized account."
            }
        }
    }
}

/// Pass any authenticated actor, reject `Anonymous`.
pub fn require_authenticated(actor: &ActorContext) -> Result<&SessionClaims, GateRejection> {
    actor.claims().ok_or(GateRejection::NotAuthenticated)
}

/// Pass `Employee` and `Admin`; everything else, anonymous included, is an
/// insufficient role.
pub fn require_elevated(actor: &ActorContext) -> Result<&SessionClaims, GateRejection> {
    match actor.claims() {
        Some(claims) if claims.role.is_elevated() => Ok(claims),
        _ => Err(GateRejection::InsufficientRole),
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("notice", self.notice())
            .finish();
        let location = format!("{}?{query}", self.redirect_target());
        match HeaderValue::from_str(&location) {
            Ok(value) => (StatusCode::SEE_OTHER, [(LOCATION, value)]).into_response(),
            Err(_) => StatusCode::SEE_OTHER.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Role;
    use uuid::Uuid;

    fn actor(role: Role) -> ActorContext {
        ActorContext::Authenticated(SessionClaims {
            account_id: Uuid::nil(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            role,
        })
    }

    #[test]
    fn anonymous_actors_are_not_authenticated() {
        assert_eq!(
            require_authenticated(&ActorContext::Anonymous),
            Err(GateRejection::NotAuthenticated)
        );
    }

    #[test]
    fn any_role_passes_the_authenticated_gate() {
        for role in [Role::Customer, Role::Employee, Role::Admin] {
            assert!(require_authenticated(&actor(role)).is_ok());
        }
    }

    #[test]
    fn only_employee_and_admin_pass_the_elevated_gate() {
        assert_eq!(
            require_elevated(&ActorContext::Anonymous),
            Err(GateRejection::InsufficientRole)
        );
        assert_eq!(
            require_elevated(&actor(Role::Customer)),
            Err(GateRejection::InsufficientRole)
        );
        assert!(require_elevated(&actor(Role::Employee)).is_ok());
        assert!(require_elevated(&actor(Role::Admin)).is_ok());
    }

    #[test]
    fn rejections_redirect_to_login_with_a_notice() {
        let response = GateRejection::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(location.starts_with(LOGIN_REDIRECT));
        assert!(location.contains("notice=Please+log+in."));
    }
}
