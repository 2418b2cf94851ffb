//! Book endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookFilterField, CreateBook, FilterQuery, UpdateBook},
};

use super::{RecordId, ValidatedJson};

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 409, description = "ISBN already registered"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.create(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    RecordId(id): RecordId,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Search books by substring on one column
#[utoipa::path(
    get,
    path = "/books/filter",
    tag = "books",
    params(FilterQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 404, description = "No book matches"),
        (status = 422, description = "Field not allowed (title, description, isbn, publishing_company)")
    )
)]
pub async fn filter_books(
    State(state): State<crate::AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let field: BookFilterField = query.field.parse()?;
    let books = state.services.books.filter(field, &query.value).await?;
    Ok(Json(books))
}

/// Update book fields
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already registered")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    RecordId(id): RecordId,
    ValidatedJson(data): ValidatedJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update(id, &data).await?;
    Ok(Json(book))
}

/// Delete a book. Its author links go with it.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    RecordId(id): RecordId,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
