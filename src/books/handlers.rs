use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};
use crate::users::dto::MessageResponse;

use super::dto::BookInput;
use super::repo::Book;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/books", get(list_books).post(create_book))
        .route(
            "/auth/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
}

#[instrument(skip(state))]
pub async fn list_books(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.books.get_all().await?))
}

#[instrument(skip(state))]
pub async fn get_book(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.get_by_id(id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_book(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(payload): Json<BookInput>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.create(payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_book(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<BookInput>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.update(id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.books.delete(id).await?;
    Ok(Json(MessageResponse::new("book deleted")))
}
