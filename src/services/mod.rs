//! Business logic services

pub mod authors;
pub mod books;

use std::sync::Arc;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
}

impl Services {
    /// Create all services backed by the Postgres repositories
    pub fn new(repository: Repository) -> Self {
        let book_store = Arc::new(repository.books);
        Self {
            authors: authors::AuthorsService::new(
                Arc::new(repository.authors),
                Arc::new(repository.author_books),
                book_store.clone(),
            ),
            books: books::BooksService::new(book_store),
        }
    }
}
