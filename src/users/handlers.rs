use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

use super::dto::{
    LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UpdatePasswordRequest,
    UpdateUserRequest,
};
use super::repo::User;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/user/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/auth/user/email/:email", get(get_user_by_email))
        .route("/auth/user/:id/password", put(update_password))
        .route("/auth/users", get(list_users))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.users.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("user registered")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.users.login(payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get_by_id(id).await?))
}

#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(email): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get_by_email(&email).await?))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.get_all().await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.update_user(id, payload).await?;
    Ok(Json(MessageResponse::new("user updated")))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.update_password(id, payload).await?;
    Ok(Json(MessageResponse::new("password updated")))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.delete(id).await?;
    Ok(Json(MessageResponse::new("user deleted")))
}
