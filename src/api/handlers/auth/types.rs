//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::handlers::valid_email;
use crate::api::views::{require, Validate, ViewError};

/// Roles a user can pick at signup.
pub const SIGNUP_ROLES: [&str; 3] = ["donor", "volunteer", "orphanage"];

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ViewError> {
        require("Email", &self.email)?;
        require("Password", &self.password)
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ViewError> {
        require("Username", &self.username)?;
        require("Email", &self.email)?;
        require("Password", &self.password)?;
        require("Role", &self.role)?;
        if !valid_email(self.email.trim()) {
            return Err(ViewError::Validation("Email is invalid.".to_string()));
        }
        if !SIGNUP_ROLES.contains(&self.role.as_str()) {
            return Err(ViewError::Validation(
                "Role must be donor, volunteer or orphanage.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RecoveryRequest {
    #[serde(default)]
    pub email: String,
}

impl Validate for RecoveryRequest {
    fn validate(&self) -> Result<(), ViewError> {
        require("Email", &self.email)
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
}
