//! Authors repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use super::{conflict_on_unique, contains_pattern, AuthorStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorFilterField, AuthorPatch, NewAuthor},
        book::Book,
    },
};

/// One junction row joined with its book
#[derive(FromRow)]
struct AuthorBookRow {
    author_id: i32,
    #[sqlx(flatten)]
    book: Book,
}

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load the books of several authors at once, keyed by author id
    async fn books_by_author(&self, author_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Book>>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, AuthorBookRow>(
            r#"
            SELECT ab.author_id, b.id, b.title, b.description, b.isbn, b.publishing_company,
                   b.publication_date, b.created_at, b.updated_at
            FROM author_books ab
            JOIN books b ON b.id = ab.book_id
            WHERE ab.author_id = ANY($1)
            ORDER BY ab.author_id, b.id
            "#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut books: HashMap<i32, Vec<Book>> = HashMap::new();
        for row in rows {
            books.entry(row.author_id).or_default().push(row.book);
        }
        Ok(books)
    }

    async fn with_books(&self, mut author: Author) -> AppResult<Author> {
        author.books_published = self
            .books_by_author(&[author.id])
            .await?
            .remove(&author.id)
            .unwrap_or_default();
        Ok(author)
    }
}

#[async_trait]
impl AuthorStore for AuthorsRepository {
    async fn create(&self, author: &NewAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, surname, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, surname, email
            "#,
        )
        .bind(&author.name)
        .bind(&author.surname)
        .bind(&author.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Author email is already registered"))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, name, surname, email FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;

        self.with_books(author).await
    }

    async fn update(&self, id: i32, patch: &AuthorPatch) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET
                name = COALESCE($1::text, name),
                surname = COALESCE($2::text, surname),
                email = COALESCE($3::text, email)
            WHERE id = $4
            RETURNING id, name, surname, email
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.surname)
        .bind(&patch.email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Author email is already registered"))?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;

        self.with_books(author).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    async fn filter(&self, field: AuthorFilterField, value: &str) -> AppResult<Vec<Author>> {
        let query = format!(
            "SELECT id, name, surname, email FROM authors WHERE {} ILIKE $1 ORDER BY id",
            field.column()
        );
        let mut authors = sqlx::query_as::<_, Author>(&query)
            .bind(contains_pattern(value))
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let mut books = self.books_by_author(&ids).await?;
        for author in &mut authors {
            author.books_published = books.remove(&author.id).unwrap_or_default();
        }
        Ok(authors)
    }
}
