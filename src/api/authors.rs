//! Author endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorFilterField, AuthorWithResolution, CreateAuthor, UpdateAuthor},
        book::FilterQuery,
    },
};

use super::{RecordId, ValidatedJson};

/// Create an author bound to existing books
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created; unknown ISBNs are listed in the resolution", body = AuthorWithResolution),
        (status = 404, description = "None of the ISBNs matches a book"),
        (status = 409, description = "Author email is already registered"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<CreateAuthor>,
) -> AppResult<(StatusCode, Json<AuthorWithResolution>)> {
    let (draft, isbns) = data.into_parts();
    let created = state.services.authors.create(&draft, &isbns).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get author by ID, with the books they wrote
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    RecordId(id): RecordId,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.get(id).await?;
    Ok(Json(author))
}

/// Search authors by substring on one column
#[utoipa::path(
    get,
    path = "/authors/filter",
    tag = "authors",
    params(FilterQuery),
    responses(
        (status = 200, description = "Matching authors", body = Vec<Author>),
        (status = 404, description = "No author matches"),
        (status = 422, description = "Field not allowed (name, surname, email)")
    )
)]
pub async fn filter_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let field: AuthorFilterField = query.field.parse()?;
    let authors = state.services.authors.filter(field, &query.value).await?;
    Ok(Json(authors))
}

/// Update author fields and, when `books_published` is non-empty, replace their book set
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = AuthorWithResolution),
        (status = 404, description = "Author not found, or none of the ISBNs matches a book"),
        (status = 409, description = "Author email is already registered")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    RecordId(id): RecordId,
    ValidatedJson(data): ValidatedJson<UpdateAuthor>,
) -> AppResult<Json<AuthorWithResolution>> {
    let (patch, isbns) = data.into_parts();
    let updated = state.services.authors.update(id, &patch, &isbns).await?;
    Ok(Json(updated))
}

/// Delete an author and their book links
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    RecordId(id): RecordId,
) -> AppResult<StatusCode> {
    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
