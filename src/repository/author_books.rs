//! Author/book junction repository (N:M relationship)

use async_trait::async_trait;
use sqlx::{PgExecutor, Pool, Postgres};

use super::{conflict_on_unique, AuthorBookStore};
use crate::error::AppResult;

async fn delete_for_author<'e, E: PgExecutor<'e>>(executor: E, author_id: i32) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM author_books WHERE author_id = $1")
        .bind(author_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Single statement, so the batch lands entirely or not at all.
/// Existing pairs are skipped, which makes a retried batch converge.
async fn insert_many<'e, E: PgExecutor<'e>>(
    executor: E,
    author_id: i32,
    book_ids: &[i32],
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO author_books (book_id, author_id)
        SELECT book_id, $2 FROM UNNEST($1::int4[]) AS t(book_id)
        ON CONFLICT (book_id, author_id) DO NOTHING
        "#,
    )
    .bind(book_ids)
    .bind(author_id)
    .execute(executor)
    .await?;
    Ok(())
}

#[derive(Clone)]
pub struct AuthorBooksRepository {
    pool: Pool<Postgres>,
}

impl AuthorBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorBookStore for AuthorBooksRepository {
    async fn insert(&self, author_id: i32, book_id: i32) -> AppResult<()> {
        sqlx::query("INSERT INTO author_books (book_id, author_id) VALUES ($1, $2)")
            .bind(book_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(
                    e,
                    format!("Author {} is already linked to book {}", author_id, book_id),
                )
            })?;
        Ok(())
    }

    async fn delete_all_for_author(&self, author_id: i32) -> AppResult<u64> {
        delete_for_author(&self.pool, author_id).await
    }

    async fn insert_batch(&self, author_id: i32, book_ids: &[i32]) -> AppResult<()> {
        if book_ids.is_empty() {
            return Ok(());
        }
        insert_many(&self.pool, author_id, book_ids).await
    }

    /// Delete and insert run in one transaction: a failure leaves the previous set in place.
    async fn replace_for_author(&self, author_id: i32, book_ids: &[i32]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let removed = delete_for_author(&mut *tx, author_id).await?;
        if !book_ids.is_empty() {
            insert_many(&mut *tx, author_id, book_ids).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            author_id,
            removed,
            inserted = book_ids.len(),
            "Replaced author book associations"
        );
        Ok(())
    }
}
