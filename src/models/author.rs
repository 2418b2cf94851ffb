//! Author model and related types

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::book::Book;
use crate::error::AppError;

/// Full author model. `books_published` is derived from the `author_books` junction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub books_published: Vec<Book>,
}

/// Author as listed on a book, without its own book set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorSummary {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
}

/// Author fields to persist, without id or associations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub surname: String,
    pub email: String,
}

fn validate_isbns(isbns: &Vec<String>) -> Result<(), ValidationError> {
    if isbns.iter().any(|isbn| isbn.trim().is_empty()) {
        let mut err = ValidationError::new("isbn");
        err.message = Some("ISBNs must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 500, message = "Name must be 1-500 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Surname must be 1-500 characters"))]
    pub surname: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// ISBNs of the books written by this author
    #[validate(
        length(min = 1, message = "At least one ISBN is required"),
        custom(function = "validate_isbns")
    )]
    pub books_published: Vec<String>,
}

impl CreateAuthor {
    /// Split the request into the author draft and the requested ISBNs
    pub fn into_parts(self) -> (NewAuthor, Vec<String>) {
        (
            NewAuthor {
                name: self.name,
                surname: self.surname,
                email: self.email,
            },
            self.books_published,
        )
    }
}

/// Author field patch. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

impl AuthorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.surname.is_none() && self.email.is_none()
    }
}

/// Update author request. Absent or blank fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[serde(default, deserialize_with = "super::blank_as_none")]
    #[validate(length(min = 1, max = 500, message = "Name must be 1-500 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::blank_as_none")]
    #[validate(length(min = 1, max = 500, message = "Surname must be 1-500 characters"))]
    pub surname: Option<String>,
    #[serde(default, deserialize_with = "super::blank_as_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Replaces the whole book set when non-empty; empty or absent keeps it
    #[serde(default)]
    #[validate(custom(function = "validate_isbns"))]
    pub books_published: Vec<String>,
}

impl UpdateAuthor {
    /// Split the request into the field patch and the requested ISBNs
    pub fn into_parts(self) -> (AuthorPatch, Vec<String>) {
        (
            AuthorPatch {
                name: self.name,
                surname: self.surname,
                email: self.email,
            },
            self.books_published,
        )
    }
}

/// Outcome of mapping requested ISBNs to existing books
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolutionReport {
    /// Number of ISBNs requested
    pub requested: usize,
    /// IDs of the books the author is now bound to
    pub resolved_book_ids: Vec<i32>,
    /// Requested ISBNs that matched no book and were dropped
    pub unresolved_isbns: Vec<String>,
}

impl ResolutionReport {
    pub fn new(requested: &[String], books: &[Book]) -> Self {
        let unresolved_isbns = requested
            .iter()
            .filter(|isbn| !books.iter().any(|b| &b.isbn == *isbn))
            .cloned()
            .collect();
        Self {
            requested: requested.len(),
            resolved_book_ids: books.iter().map(|b| b.id).collect(),
            unresolved_isbns,
        }
    }
}

/// Author together with the ISBN resolution that produced its book set
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorWithResolution {
    pub author: Author,
    /// Absent when the book set was left untouched
    pub resolution: Option<ResolutionReport>,
}

/// Columns an author may be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthorFilterField {
    Name,
    Surname,
    Email,
}

impl AuthorFilterField {
    pub const ALL: [AuthorFilterField; 3] = [
        AuthorFilterField::Name,
        AuthorFilterField::Surname,
        AuthorFilterField::Email,
    ];

    pub fn column(self) -> &'static str {
        match self {
            AuthorFilterField::Name => "name",
            AuthorFilterField::Surname => "surname",
            AuthorFilterField::Email => "email",
        }
    }
}

impl fmt::Display for AuthorFilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for AuthorFilterField {
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
