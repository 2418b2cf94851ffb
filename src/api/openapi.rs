//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Book and author catalog REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::create_book,
        books::get_book,
        books::filter_books,
        books::update_book,
        books::delete_book,
        // Authors
        authors::create_author,
        authors::get_author,
        authors::filter_authors,
        authors::update_author,
        authors::delete_author,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookFilterField,
            crate::models::book::FilterQuery,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorSummary,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::author::AuthorFilterField,
            crate::models::author::AuthorWithResolution,
            crate::models::author::ResolutionReport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "authors", description = "Authors and the books they wrote")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
