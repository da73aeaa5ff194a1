use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(ApiError::Validation(format!(
            "{field} must be {min}-{max} characters"
        )));
    }
    Ok(())
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("invalid email".into()));
        }
        if self.password.chars().count() < 8 {
            return Err(ApiError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        require_len("username", &self.username, 3, 20)?;
        require_len("first_name", &self.first_name, 3, 20)?;
        require_len("last_name", &self.last_name, 3, 20)?;
        Ok(())
    }
}

/// Request body for login. The plaintext password only lives for the
/// duration of the request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("invalid email".into()));
        }
        if self.password.is_empty() {
            return Err(ApiError::Validation("password cannot be empty".into()));
        }
        Ok(())
    }
}

/// Partial update; only the name fields are mutable through this path.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_len("first_name", &self.first_name, 3, 20)?;
        require_len("last_name", &self.last_name, 3, 20)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub new_password: String,
}

impl UpdatePasswordRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.new_password.chars().count() < 8 {
            return Err(ApiError::Validation(
                "new_password must be at least 8 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Confirmation body for mutations that do not return a resource.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}
