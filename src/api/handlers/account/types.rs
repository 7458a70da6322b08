//! Request/response types for account endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::claims::{Role, SessionClaims};
use crate::auth::policy::FieldViolation;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ViolationsResponse {
    pub violations: Vec<FieldViolation>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub account_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl SessionResponse {
    #[must_use]
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            account_id: claims.account_id.to_string(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// Payload for the authenticated landing area.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ManagementResponse {
    pub account_id: String,
    pub first_name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use uuid::Uuid;

    #[test]
    fn register_request_round_trips() -> Result<()> {
        let request = RegisterRequest {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            password: "Str0ng!Passw0rd".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let email = value
            .get("email")
            .and_then(serde_json::Value::as_str)
            .context("missing email")?;
        assert_eq!(email, "ann@example.com");
        let decoded: RegisterRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.first_name, "Ann");
        Ok(())
    }

    #[test]
    fn session_response_projects_claims() {
        let claims = SessionClaims {
            account_id: Uuid::nil(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            role: Role::Employee,
        };
        let response = SessionResponse::from_claims(&claims);
        assert_eq!(response.account_id, Uuid::nil().to_string());
        assert_eq!(response.role, Role::Employee);
    }
}
