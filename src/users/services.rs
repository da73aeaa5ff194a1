use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::jwt::TokenProvider;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;

use super::dto::{LoginRequest, RegisterRequest, UpdatePasswordRequest, UpdateUserRequest};
use super::repo::{NewUser, User, UserRepository};

/// Orchestrates registration, login and account management. All
/// consistency is check-then-act against the store; the UNIQUE email
/// constraint in the migration backs the duplicate check under races.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenProvider>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { repo, tokens }
    }

    pub async fn register(&self, mut req: RegisterRequest) -> Result<(), ApiError> {
        req.email = req.email.trim().to_lowercase();
        req.validate()?;

        if self.repo.find_by_email(&req.email).await?.is_some() {
            warn!(email = %req.email, "email already registered");
            return Err(ApiError::AlreadyExists("user"));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .repo
            .create(NewUser {
                email: req.email,
                password_hash,
                username: req.username,
                first_name: req.first_name,
                last_name: req.last_name,
                // role is never taken from the request
                role: "user".into(),
            })
            .await?;
        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(())
    }

    pub async fn login(&self, mut req: LoginRequest) -> Result<String, ApiError> {
        req.email = req.email.trim().to_lowercase();
        req.validate()?;

        let user = self
            .repo
            .find_by_email(&req.email)
            .await?
            .ok_or(ApiError::NotFound("user"))?;

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = user.id, "login with wrong password");
            return Err(ApiError::Unauthorized("invalid credentials".into()));
        }

        let token = self.tokens.issue(&user.id.to_string())?;
        info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("user"))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();
        self.repo
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::NotFound("user"))
    }

    pub async fn get_all(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.repo.list().await?)
    }

    pub async fn update_user(&self, id: i64, req: UpdateUserRequest) -> Result<(), ApiError> {
        req.validate()?;
        // email, password and role are immutable through this path
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound("user"));
        }
        if !self
            .repo
            .update_names(id, &req.first_name, &req.last_name)
            .await?
        {
            return Err(ApiError::NotFound("user"));
        }
        info!(user_id = id, "user updated");
        Ok(())
    }

    pub async fn update_password(
        &self,
        id: i64,
        req: UpdatePasswordRequest,
    ) -> Result<(), ApiError> {
        req.validate()?;
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound("user"));
        }
        // The caller's current password is not re-verified here; the
        // bearer token is the only proof of identity on this path.
        let password_hash = hash_password(&req.new_password)?;
        if !self.repo.update_password(id, &password_hash).await? {
            return Err(ApiError::NotFound("user"));
        }
        info!(user_id = id, "password updated");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound("user"));
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }
}
