//! Author service.
//!
//! Keeps the `author_books` junction consistent with the author records:
//! junction rows are only ever written here, always point at books that were
//! just resolved from their ISBN, and are purged before their author.
//!
//! Every store call is awaited in sequence inside the caller's future, so
//! dropping that future (client gone, request timeout) abandons the remaining
//! steps.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorFilterField, AuthorPatch, AuthorWithResolution, NewAuthor, ResolutionReport},
        book::Book,
    },
    repository::{AuthorBookStore, AuthorStore, BookStore},
};

#[derive(Clone)]
pub struct AuthorsService {
    authors: Arc<dyn AuthorStore>,
    author_books: Arc<dyn AuthorBookStore>,
    books: Arc<dyn BookStore>,
}

impl AuthorsService {
    pub fn new(
        authors: Arc<dyn AuthorStore>,
        author_books: Arc<dyn AuthorBookStore>,
        books: Arc<dyn BookStore>,
    ) -> Self {
        Self {
            authors,
            author_books,
            books,
        }
    }

    /// Map ISBNs to existing books. Unknown ISBNs are dropped; if none is
    /// known the whole request fails with `BookNotFound`.
    async fn resolve_books(&self, isbns: &[String]) -> AppResult<(Vec<Book>, ResolutionReport)> {
        let books = self.books.get_by_isbns(isbns).await?;
        if books.is_empty() {
            return Err(AppError::BookNotFound {
                isbns: isbns.to_vec(),
            });
        }

        let report = ResolutionReport::new(isbns, &books);
        if !report.unresolved_isbns.is_empty() {
            tracing::warn!(
                unresolved = ?report.unresolved_isbns,
                resolved = books.len(),
                "Dropping ISBNs that match no book"
            );
        }
        Ok((books, report))
    }

    /// Create an author bound to the books behind `isbns`.
    ///
    /// The author row is written before its junction rows and is not removed
    /// if one of those inserts fails.
    pub async fn create(&self, draft: &NewAuthor, isbns: &[String]) -> AppResult<AuthorWithResolution> {
        let (books, report) = self.resolve_books(isbns).await?;

        let mut author = self.authors.create(draft).await?;

        for book in &books {
            self.author_books.insert(author.id, book.id).await?;
        }

        tracing::info!(
            author_id = author.id,
            books = books.len(),
            "Author created"
        );

        author.books_published = books;
        Ok(AuthorWithResolution {
            author,
            resolution: Some(report),
        })
    }

    pub async fn get(&self, id: i32) -> AppResult<Author> {
        self.authors.get_by_id(id).await
    }

    /// Substring search on one column. No match is reported as `NotFound`.
    pub async fn filter(&self, field: AuthorFilterField, value: &str) -> AppResult<Vec<Author>> {
        let authors = self.authors.filter(field, value).await?;
        if authors.is_empty() {
            return Err(AppError::NotFound("no author matches".to_string()));
        }
        Ok(authors)
    }

    /// Patch an author's fields and, when `isbns` is non-empty, replace its
    /// whole book set with the books they resolve to. An empty `isbns` keeps
    /// the current book set. After a replacement the author is read back so
    /// the result shows the stored book set.
    pub async fn update(
        &self,
        id: i32,
        patch: &AuthorPatch,
        isbns: &[String],
    ) -> AppResult<AuthorWithResolution> {
        let current = self.authors.get_by_id(id).await?;

        let resolved = if isbns.is_empty() {
            None
        } else {
            Some(self.resolve_books(isbns).await?)
        };

        if patch.is_empty() {
            tracing::debug!(author_id = id, "No author fields to change");
        }
        let mut author = self.authors.update(id, patch).await?;

        let resolution = match resolved {
            Some((books, report)) => {
                let book_ids: Vec<i32> = books.iter().map(|b| b.id).collect();
                self.author_books.replace_for_author(id, &book_ids).await?;
                tracing::info!(
                    author_id = id,
                    previous = current.books_published.len(),
                    current = book_ids.len(),
                    "Author book set replaced"
                );
                author = self.authors.get_by_id(id).await?;
                Some(report)
            }
            None => None,
        };

        tracing::info!(author_id = id, "Author updated");
        Ok(AuthorWithResolution { author, resolution })
    }

    /// Remove the author's junction rows, then the author itself
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let removed = self.author_books.delete_all_for_author(id).await?;
        self.authors.delete(id).await?;
        tracing::info!(author_id = id, removed_links = removed, "Author deleted");
        Ok(())
    }
}
