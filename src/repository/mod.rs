//! Repository layer for database operations.
//!
//! Each table is owned by one store. The store traits are the seams the
//! services depend on; the Postgres repositories below are their production
//! implementations.

pub mod author_books;
pub mod authors;
pub mod books;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorFilterField, AuthorPatch, Book, BookFilterField, CreateBook, NewAuthor,
        UpdateBook,
    },
};

/// Owns book records. `get_by_id`, `update` and `filter` return books with their authors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: &CreateBook) -> AppResult<Book>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    /// Return the books whose ISBN is in `isbns`. Unknown ISBNs are skipped, never an error.
    async fn get_by_isbns(&self, isbns: &[String]) -> AppResult<Vec<Book>>;

    async fn update(&self, id: i32, patch: &UpdateBook) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Substring match on one allow-listed column
    async fn filter(&self, field: BookFilterField, value: &str) -> AppResult<Vec<Book>>;
}

/// Owns author records. Returned authors carry their associated books.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn create(&self, author: &NewAuthor) -> AppResult<Author>;

    async fn get_by_id(&self, id: i32) -> AppResult<Author>;

    /// Field-level update; columns left `None` in the patch are untouched
    async fn update(&self, id: i32, patch: &AuthorPatch) -> AppResult<Author>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn filter(&self, field: AuthorFilterField, value: &str) -> AppResult<Vec<Author>>;
}

/// Owns the author/book junction rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorBookStore: Send + Sync {
    async fn insert(&self, author_id: i32, book_id: i32) -> AppResult<()>;

    /// Remove every row for the author, returning how many were removed
    async fn delete_all_for_author(&self, author_id: i32) -> AppResult<u64>;

    async fn insert_batch(&self, author_id: i32, book_ids: &[i32]) -> AppResult<()>;

    /// Discard the author's current rows and insert `book_ids` in their place
    async fn replace_for_author(&self, author_id: i32, book_ids: &[i32]) -> AppResult<()> {
        self.delete_all_for_author(author_id).await?;
        self.insert_batch(author_id, book_ids).await
    }
}

/// Map a unique-key violation to `Conflict`, anything else to `Database`
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message.into()),
        _ => AppError::Database(err),
    }
}

/// Build an ILIKE pattern matching `value` anywhere, with wildcards in `value` taken literally
pub(crate) fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub authors: authors::AuthorsRepository,
    pub author_books: author_books::AuthorBooksRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            author_books: author_books::AuthorBooksRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
