//! Book model and related types

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::author::AuthorSummary;
use crate::error::AppError;

/// Full book record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// External key, unique across all books
    pub isbn: String,
    pub publishing_company: String,
    pub publication_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Who wrote the book, through `author_books`. Loaded on book reads only.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<AuthorSummary>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 14, message = "ISBN must be 1-14 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 50, message = "Publishing company must be 1-50 characters"))]
    pub publishing_company: String,
    pub publication_date: Option<NaiveDate>,
}

/// Update book request. Absent or blank fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[serde(default, deserialize_with = "super::blank_as_none")]
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::blank_as_none")]
    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::blank_as_none")]
    #[validate(length(min = 1, max = 14, message = "ISBN must be 1-14 characters"))]
    pub isbn: Option<String>,
    #[serde(default, deserialize_with = "super::blank_as_none")]
    #[validate(length(min = 1, max = 50, message = "Publishing company must be 1-50 characters"))]
    pub publishing_company: Option<String>,
    pub publication_date: Option<NaiveDate>,
}

/// Columns a book may be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookFilterField {
    Title,
    Description,
    Isbn,
    PublishingCompany,
}

impl BookFilterField {
    pub const ALL: [BookFilterField; 4] = [
        BookFilterField::Title,
        BookFilterField::Description,
        BookFilterField::Isbn,
        BookFilterField::PublishingCompany,
    ];

    pub fn column(self) -> &'static str {
        match self {
            BookFilterField::Title => "title",
            BookFilterField::Description => "description",
            BookFilterField::Isbn => "isbn",
            BookFilterField::PublishingCompany => "publishing_company",
        }
    }
}

impl fmt::Display for BookFilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for BookFilterField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|f| f.column()).collect();
                AppError::Validation(format!(
                    "Unsupported filter field '{}', allowed: {}",
                    s,
                    allowed.join(", ")
                ))
            })
    }
}

/// Filter query parameters (API)
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct FilterQuery {
    /// Column to search in
    pub field: String,
    /// Substring to look for
    #[serde(default)]
    pub value: String,
}
