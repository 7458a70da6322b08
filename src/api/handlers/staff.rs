//! Elevated-only probe the storefront uses to gate its management area.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::claims::{ActorContext, Role};
use crate::auth::gate::require_elevated;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct StaffResponse {
    pub first_name: String,
    pub role: Role,
}

#[utoipa::path(
    get,
    path = "/v1/staff",
    responses(
        (status = 200, description = "Actor holds an elevated role", body = StaffResponse),
        (status = 303, description = "Anonymous or customer; redirect to login")
    ),
    tag = "staff"
)]
pub async fn staff(Extension(actor): Extension<ActorContext>) -> impl IntoResponse {
    match require_elevated(&actor) {
        Ok(claims) => (
            StatusCode::OK,
            Json(StaffResponse {
                first_name: claims.first_name.clone(),
                role: claims.role,
            }),
        )
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::SessionClaims;
    use axum::http::header::LOCATION;
    use uuid::Uuid;

    fn actor(role: Role) -> ActorContext {
        ActorContext::Authenticated(SessionClaims {
            account_id: Uuid::nil(),
            first_name: "Eve".to_string(),
            last_name: "Ops".to_string(),
            email: "eve@example.com".to_string(),
            role,
        })
    }

    #[tokio::test]
    async fn employees_and_admins_pass() {
        for role in [Role::Employee, Role::Admin] {
            let response = staff(Extension(actor(role))).await.into_response();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn customers_and_anonymous_are_redirected_with_a_notice() {
        for actor_context in [ActorContext::Anonymous, actor(Role::Customer)] {
            let response = staff(Extension(actor_context)).await.into_response();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            assert!(location.starts_with("/account/login"));
            assert!(location.contains("notice="));
        }
    }
}
