//! OpenAPI document for the service, served by the Swagger UI route.

use utoipa::OpenApi;

use super::handlers;
use crate::auth::claims::Role;
use crate::auth::policy::FieldViolation;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "custos",
        description = "Account authentication and authorization service"
    ),
    paths(
        handlers::health::health,
        handlers::account::register,
        handlers::account::login,
        handlers::account::logout,
        handlers::account::session,
        handlers::account::management,
        handlers::account::update_profile,
        handlers::account::change_password,
        handlers::staff::staff,
    ),
    components(schemas(
        Role,
        FieldViolation,
        handlers::health::Health,
        handlers::account::types::RegisterRequest,
        handlers::account::types::LoginRequest,
        handlers::account::types::UpdateProfileRequest,
        handlers::account::types::ChangePasswordRequest,
        handlers::account::types::RegisterResponse,
        handlers::account::types::ViolationsResponse,
        handlers::account::types::SessionResponse,
        handlers::account::types::ManagementResponse,
        handlers::staff::StaffResponse,
    )),
    tags(
        (name = "account", description = "Registration, login, and self-service"),
        (name = "staff", description = "Elevated-role endpoints"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_account_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/health",
            "/v1/account/register",
            "/v1/account/login",
            "/v1/account/logout",
            "/v1/account/session",
            "/v1/account/management",
            "/v1/account/update",
            "/v1/account/password",
            "/v1/staff",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }
}
