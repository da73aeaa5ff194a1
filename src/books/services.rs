use std::sync::Arc;

use tracing::info;

use crate::error::ApiError;

use super::dto::BookInput;
use super::repo::{Book, BookRepository};

/// Thin orchestration over the book repository; the catalog has no
/// business rules beyond existence checks.
#[derive(Clone)]
pub struct BookService {
    repo: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: BookInput) -> Result<Book, ApiError> {
        let book = self.repo.create(&input).await?;
        info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Book, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("book"))
    }

    pub async fn get_all(&self) -> Result<Vec<Book>, ApiError> {
        Ok(self.repo.list().await?)
    }

    pub async fn update(&self, id: i64, input: BookInput) -> Result<Book, ApiError> {
        let book = self
            .repo
            .update(id, &input)
            .await?
            .ok_or(ApiError::NotFound("book"))?;
        info!(book_id = id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound("book"));
        }
        info!(book_id = id, "book deleted");
        Ok(())
    }
}
