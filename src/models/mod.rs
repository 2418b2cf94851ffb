//! Data models for the Bookshelf catalog

pub mod author;
pub mod book;

use serde::{Deserialize, Deserializer};

// Re-export commonly used types
pub use author::{
    Author, AuthorFilterField, AuthorPatch, AuthorSummary, NewAuthor, ResolutionReport,
};
pub use book::{Book, BookFilterField, CreateBook, UpdateBook};

/// Read an optional string field, treating a blank value as absent
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
