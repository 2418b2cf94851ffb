//! Book catalog service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilterField, CreateBook, UpdateBook},
    repository::BookStore,
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let book = self.books.create(data).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.books.get_by_id(id).await
    }

    /// Substring search on one column. No match is reported as `NotFound`.
    pub async fn filter(&self, field: BookFilterField, value: &str) -> AppResult<Vec<Book>> {
        let books = self.books.filter(field, value).await?;
        if books.is_empty() {
            return Err(AppError::NotFound("no book matches".to_string()));
        }
        Ok(books)
    }

    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        self.books.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}
