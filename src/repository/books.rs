//! Books repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, Pool, Postgres};

use super::{conflict_on_unique, contains_pattern, BookStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorSummary,
        book::{Book, BookFilterField, CreateBook, UpdateBook},
    },
};

const BOOK_COLUMNS: &str =
    "id, title, description, isbn, publishing_company, publication_date, created_at, updated_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

/// One junction row joined with its author
#[derive(FromRow)]
struct BookAuthorRow {
    book_id: i32,
    #[sqlx(flatten)]
    author: AuthorSummary,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load the authors of several books at once, keyed by book id
    async fn authors_by_book(&self, book_ids: &[i32]) -> AppResult<HashMap<i32, Vec<AuthorSummary>>> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, BookAuthorRow>(
            r#"
            SELECT ab.book_id, a.id, a.name, a.surname, a.email
            FROM author_books ab
            JOIN authors a ON a.id = ab.author_id
            WHERE ab.book_id = ANY($1)
            ORDER BY ab.book_id, a.id
            "#,
        )
        .bind(book_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut authors: HashMap<i32, Vec<AuthorSummary>> = HashMap::new();
        for row in rows {
            authors.entry(row.book_id).or_default().push(row.author);
        }
        Ok(authors)
    }

    async fn with_authors(&self, mut book: Book) -> AppResult<Book> {
        book.authors = self
            .authors_by_book(&[book.id])
            .await?
            .remove(&book.id)
            .unwrap_or_default();
        Ok(book)
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO books (title, description, isbn, publishing_company, publication_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(&book.title)
            .bind(&book.description)
            .bind(&book.isbn)
            .bind(&book.publishing_company)
            .bind(book.publication_date)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, format!("Book with ISBN {} already exists", book.isbn)))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        self.with_authors(book).await
    }

    async fn get_by_isbns(&self, isbns: &[String]) -> AppResult<Vec<Book>> {
        if isbns.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {} FROM books WHERE isbn = ANY($1) ORDER BY id",
            BOOK_COLUMNS
        );
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(isbns)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn update(&self, id: i32, patch: &UpdateBook) -> AppResult<Book> {
        let query = format!(
            r#"
            UPDATE books SET
                title = COALESCE($1::text, title),
                description = COALESCE($2::text, description),
                isbn = COALESCE($3::text, isbn),
                publishing_company = COALESCE($4::text, publishing_company),
                publication_date = COALESCE($5::date, publication_date),
                updated_at = $6
            WHERE id = $7
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(&patch.isbn)
            .bind(&patch.publishing_company)
            .bind(patch.publication_date)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Another book already uses this ISBN"))?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        self.with_authors(book).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn filter(&self, field: BookFilterField, value: &str) -> AppResult<Vec<Book>> {
        // Only the enum's static column name is interpolated
        let query = format!(
            "SELECT {} FROM books WHERE {} ILIKE $1 ORDER BY id",
            BOOK_COLUMNS,
            field.column()
        );
        let mut books = sqlx::query_as::<_, Book>(&query)
            .bind(contains_pattern(value))
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        let mut authors = self.authors_by_book(&ids).await?;
        for book in &mut books {
            book.authors = authors.remove(&book.id).unwrap_or_default();
        }
        Ok(books)
    }
}
