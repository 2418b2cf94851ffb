//! In-memory stores backing the service tests

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;

use super::{AuthorBookStore, AuthorStore, BookStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorFilterField, AuthorPatch, AuthorSummary, Book, BookFilterField, CreateBook,
        NewAuthor, UpdateBook,
    },
};

#[derive(Default)]
struct State {
    books: Vec<Book>,
    authors: Vec<Author>,
    /// (author_id, book_id)
    links: BTreeSet<(i32, i32)>,
    next_book_id: i32,
    next_author_id: i32,
}

impl State {
    fn books_of(&self, author_id: i32) -> Vec<Book> {
        self.books
            .iter()
            .filter(|b| self.links.contains(&(author_id, b.id)))
            .cloned()
            .collect()
    }

    fn with_authors(&self, book: &Book) -> Book {
        let authors = self
            .authors
            .iter()
            .filter(|a| self.links.contains(&(a.id, book.id)))
            .map(|a| AuthorSummary {
                id: a.id,
                name: a.name.clone(),
                surname: a.surname.clone(),
                email: a.email.clone(),
            })
            .collect();
        Book {
            authors,
            ..book.clone()
        }
    }

    fn book_exists(&self, book_id: i32) -> AppResult<()> {
        if !self.books.iter().any(|b| b.id == book_id) {
            return Err(AppError::Internal(format!("book {} does not exist", book_id)));
        }
        Ok(())
    }
}

/// One shared catalog implementing all three store traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a book directly, returning its id
    pub fn seed_book(&self, isbn: &str, title: &str) -> i32 {
        let mut state = self.lock();
        state.next_book_id += 1;
        let id = state.next_book_id;
        let now = Utc::now();
        state.books.push(Book {
            id,
            title: title.to_string(),
            description: String::new(),
            isbn: isbn.to_string(),
            publishing_company: "Seed Press".to_string(),
            publication_date: None,
            created_at: now,
            updated_at: now,
            authors: Vec::new(),
        });
        id
    }

    /// Book ids currently linked to the author
    pub fn links_for(&self, author_id: i32) -> BTreeSet<i32> {
        self.lock()
            .links
            .iter()
            .filter(|(a, _)| *a == author_id)
            .map(|(_, b)| *b)
            .collect()
    }

    pub fn link_count(&self) -> usize {
        self.lock().links.len()
    }

    pub fn author_count(&self) -> usize {
        self.lock().authors.len()
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut state = self.lock();
        if state.books.iter().any(|b| b.isbn == book.isbn) {
            return Err(AppError::Conflict(format!("Book with ISBN {} already exists", book.isbn)));
        }
        state.next_book_id += 1;
        let now = Utc::now();
        let created = Book {
            id: state.next_book_id,
            title: book.title.clone(),
            description: book.description.clone(),
            isbn: book.isbn.clone(),
            publishing_company: book.publishing_company.clone(),
            publication_date: book.publication_date,
            created_at: now,
            updated_at: now,
            authors: Vec::new(),
        };
        state.books.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let state = self.lock();
        state
            .books
            .iter()
            .find(|b| b.id == id)
            .map(|b| state.with_authors(b))
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn get_by_isbns(&self, isbns: &[String]) -> AppResult<Vec<Book>> {
        Ok(self
            .lock()
            .books
            .iter()
            .filter(|b| isbns.contains(&b.isbn))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, patch: &UpdateBook) -> AppResult<Book> {
        let mut state = self.lock();
        if let Some(ref isbn) = patch.isbn {
            if state.books.iter().any(|b| b.id != id && &b.isbn == isbn) {
                return Err(AppError::Conflict("Another book already uses this ISBN".to_string()));
            }
        }
        let book = state
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        if let Some(ref title) = patch.title {
            book.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            book.description = description.clone();
        }
        if let Some(ref isbn) = patch.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(ref company) = patch.publishing_company {
            book.publishing_company = company.clone();
        }
        if patch.publication_date.is_some() {
            book.publication_date = patch.publication_date;
        }
        book.updated_at = Utc::now();
        let updated = book.clone();
        Ok(state.with_authors(&updated))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock();
        let before = state.books.len();
        state.books.retain(|b| b.id != id);
        if state.books.len() == before {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        // Mirrors ON DELETE CASCADE on author_books.book_id
        state.links.retain(|(_, book_id)| *book_id != id);
        Ok(())
    }

    async fn filter(&self, field: BookFilterField, value: &str) -> AppResult<Vec<Book>> {
        let state = self.lock();
        Ok(state
            .books
            .iter()
            .filter(|b| {
                let column = match field {
                    BookFilterField::Title => &b.title,
                    BookFilterField::Description => &b.description,
                    BookFilterField::Isbn => &b.isbn,
                    BookFilterField::PublishingCompany => &b.publishing_company,
                };
                contains(column, value)
            })
            .map(|b| state.with_authors(b))
            .collect())
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn create(&self, author: &NewAuthor) -> AppResult<Author> {
        let mut state = self.lock();
        if state.authors.iter().any(|a| a.email == author.email) {
            return Err(AppError::Conflict("Author email is already registered".to_string()));
        }
        state.next_author_id += 1;
        let created = Author {
            id: state.next_author_id,
            name: author.name.clone(),
            surname: author.surname.clone(),
            email: author.email.clone(),
            books_published: Vec::new(),
        };
        state.authors.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        let state = self.lock();
        let mut author = state
            .authors
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        author.books_published = state.books_of(id);
        Ok(author)
    }

    async fn update(&self, id: i32, patch: &AuthorPatch) -> AppResult<Author> {
        let mut state = self.lock();
        if let Some(ref email) = patch.email {
            if state.authors.iter().any(|a| a.id != id && &a.email == email) {
                return Err(AppError::Conflict("Author email is already registered".to_string()));
            }
        }
        let author = state
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        if let Some(ref name) = patch.name {
            author.name = name.clone();
        }
        if let Some(ref surname) = patch.surname {
            author.surname = surname.clone();
        }
        if let Some(ref email) = patch.email {
            author.email = email.clone();
        }
        let mut updated = author.clone();
        updated.books_published = state.books_of(id);
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock();
        if state.links.iter().any(|(author_id, _)| *author_id == id) {
            return Err(AppError::Internal(format!(
                "author_books still references author {}",
                id
            )));
        }
        let before = state.authors.len();
        state.authors.retain(|a| a.id != id);
        if state.authors.len() == before {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    async fn filter(&self, field: AuthorFilterField, value: &str) -> AppResult<Vec<Author>> {
        let state = self.lock();
        Ok(state
            .authors
            .iter()
            .filter(|a| {
                let column = match field {
                    AuthorFilterField::Name => &a.name,
                    AuthorFilterField::Surname => &a.surname,
                    AuthorFilterField::Email => &a.email,
                };
                contains(column, value)
            })
            .map(|a| Author {
                books_published: state.books_of(a.id),
                ..a.clone()
            })
            .collect())
    }
}

#[async_trait]
impl AuthorBookStore for MemoryStore {
    async fn insert(&self, author_id: i32, book_id: i32) -> AppResult<()> {
        let mut state = self.lock();
        state.book_exists(book_id)?;
        if !state.links.insert((author_id, book_id)) {
            return Err(AppError::Conflict(format!(
                "Author {} is already linked to book {}",
                author_id, book_id
            )));
        }
        Ok(())
    }

    async fn delete_all_for_author(&self, author_id: i32) -> AppResult<u64> {
        let mut state = self.lock();
        let before = state.links.len();
        state.links.retain(|(a, _)| *a != author_id);
        Ok((before - state.links.len()) as u64)
    }

    async fn insert_batch(&self, author_id: i32, book_ids: &[i32]) -> AppResult<()> {
        let mut state = self.lock();
        // All or nothing, like the single-statement insert
        for book_id in book_ids {
            state.book_exists(*book_id)?;
        }
        for book_id in book_ids {
            state.links.insert((author_id, *book_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_batch_rejects_missing_book() {
        let store = MemoryStore::new();
        let dune = store.seed_book("111", "Dune");

        let err = store.insert_batch(1, &[dune, 42]).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(store.link_count(), 0);
    }

    #[tokio::test]
    async fn test_replace_never_links_a_missing_book() {
        let store = MemoryStore::new();
        let dune = store.seed_book("111", "Dune");

        store.insert_batch(1, &[dune]).await.unwrap();
        assert!(store.replace_for_author(1, &[dune, 42]).await.is_err());

        assert!(!store.links_for(1).contains(&42));
    }

    #[tokio::test]
    async fn test_book_delete_cascades_links() {
        let store = MemoryStore::new();
        let dune = store.seed_book("111", "Dune");
        store.insert(1, dune).await.unwrap();

        BookStore::delete(&store, dune).await.unwrap();

        assert_eq!(store.link_count(), 0);
    }
}
