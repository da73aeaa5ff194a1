use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::dto::BookInput;

/// Book record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: i32,
    pub stock: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn create(&self, input: &BookInput) -> anyhow::Result<Book>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>>;
    async fn list(&self) -> anyhow::Result<Vec<Book>>;
    async fn update(&self, id: i64, input: &BookInput) -> anyhow::Result<Option<Book>>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

pub struct PgBookRepo {
    db: PgPool,
}

impl PgBookRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for PgBookRepo {
    async fn create(&self, input: &BookInput) -> anyhow::Result<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author, price, stock, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(&self.db)
        .await?;
        Ok(book)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, price, stock, created_at, updated_at FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(book)
    }

    async fn list(&self) -> anyhow::Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, price, stock, created_at, updated_at FROM books ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(books)
    }

    async fn update(&self, id: i64, input: &BookInput) -> anyhow::Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
               SET title = $1, author = $2, price = $3, stock = $4, updated_at = now()
             WHERE id = $5
            RETURNING id, title, author, price, stock, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.price)
        .bind(input.stock)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(book)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    /// In-memory repository used by service and router tests.
    #[derive(Default)]
    pub(crate) struct InMemoryBookRepo {
        books: Mutex<Vec<Book>>,
    }

    impl InMemoryBookRepo {
        pub(crate) fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl BookRepository for InMemoryBookRepo {
        async fn create(&self, input: &BookInput) -> anyhow::Result<Book> {
            let mut books = self.books.lock().unwrap();
            let id = books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
            let now = OffsetDateTime::now_utc();
            let book = Book {
                id,
                title: input.title.clone(),
                author: input.author.clone(),
                price: input.price,
                stock: input.stock,
                created_at: now,
                updated_at: now,
            };
            books.push(book.clone());
            Ok(book)
        }

        async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
            Ok(self
                .books
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == id)
                .cloned())
        }

        async fn list(&self) -> anyhow::Result<Vec<Book>> {
            Ok(self.books.lock().unwrap().clone())
        }

        async fn update(&self, id: i64, input: &BookInput) -> anyhow::Result<Option<Book>> {
            let mut books = self.books.lock().unwrap();
            match books.iter_mut().find(|b| b.id == id) {
                Some(book) => {
                    book.title = input.title.clone();
                    book.author = input.author.clone();
                    book.price = input.price;
                    book.stock = input.stock;
                    book.updated_at = OffsetDateTime::now_utc();
                    Ok(Some(book.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: i64) -> anyhow::Result<bool> {
            let mut books = self.books.lock().unwrap();
            let before = books.len();
            books.retain(|b| b.id != id);
            Ok(books.len() < before)
        }
    }
}
