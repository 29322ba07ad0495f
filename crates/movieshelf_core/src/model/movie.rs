//! Movie domain model.
//!
//! # Responsibility
//! - Define the record mirrored from the remote collection.
//! - Provide the validation predicate gating every write.
//!
//! # Invariants
//! - `id` stays empty until the backend assigns a document id.
//! - A record is only written when it validates against the exact document
//!   id the write is keyed by.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for a record targeted at a concrete document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieValidationError {
    /// Record id differs from the document id the write would be keyed by.
    DocumentIdMismatch { expected: String, actual: String },
    EmptyTitle,
    EmptyGenre,
    NonPositiveYear(i32),
}

impl Display for MovieValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentIdMismatch { expected, actual } => write!(
                f,
                "movie id `{actual}` does not match target document id `{expected}`"
            ),
            Self::EmptyTitle => write!(f, "movie title must not be empty"),
            Self::EmptyGenre => write!(f, "movie genre must not be empty"),
            Self::NonPositiveYear(year) => {
                write!(f, "movie year must be positive, got {year}")
            }
        }
    }
}

impl Error for MovieValidationError {}

/// Canonical movie record mirrored from the remote collection.
///
/// The full record, including `id`, is what gets written to the remote
/// document, so the serde shape is the document wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Backend-assigned document id; empty before the record is created.
    pub id: String,
    pub title: String,
    pub genre: String,
    /// Release year; must be strictly positive.
    pub year: i32,
}

impl Movie {
    /// Creates a record that has not been persisted yet.
    ///
    /// # Invariants
    /// - `id` starts empty; the catalog assigns it at creation time.
    pub fn new(title: impl Into<String>, genre: impl Into<String>, year: i32) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            genre: genre.into(),
            year,
        }
    }

    /// Creates a record whose backend identity is already known.
    ///
    /// Used by mirror/decoding paths where the document id exists.
    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        genre: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            genre: genre.into(),
            year,
        }
    }

    /// Returns whether the backend has assigned this record an identity.
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Boolean form of [`Movie::validate_for_document`].
    pub fn is_valid_for_document(&self, document_id: &str) -> bool {
        self.validate_for_document(document_id).is_ok()
    }

    /// Validates this record for a write keyed by `document_id`.
    ///
    /// Pure check, no side effects. All write paths go through it.
    ///
    /// # Errors
    /// - `DocumentIdMismatch` when `id` differs from `document_id`.
    /// - `EmptyTitle` / `EmptyGenre` for blank required fields.
    /// - `NonPositiveYear` when `year <= 0`.
    pub fn validate_for_document(&self, document_id: &str) -> Result<(), MovieValidationError> {
        if self.id != document_id {
            return Err(MovieValidationError::DocumentIdMismatch {
                expected: document_id.to_string(),
                actual: self.id.clone(),
            });
        }
        if self.title.is_empty() {
            return Err(MovieValidationError::EmptyTitle);
        }
        if self.genre.is_empty() {
            return Err(MovieValidationError::EmptyGenre);
        }
        if self.year <= 0 {
            return Err(MovieValidationError::NonPositiveYear(self.year));
        }
        Ok(())
    }
}
