//! Document-store collaborator seam.
//!
//! # Responsibility
//! - Define the narrow contract the catalog consumes from a remote
//!   document store.
//! - Keep transport and storage details behind trait objects.
//!
//! # Invariants
//! - Store APIs return semantic errors; backend failure never panics.
//! - Change feeds deliver full snapshots, never incremental patches.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod collection;
pub mod memory;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by the document-store collaborator.
///
/// `Clone` so the change feed can broadcast one failure to every listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport or backend-side failure, carrying the backend's message.
    Backend(String),
    /// Record could not be converted to or from the document payload.
    Serialization(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "backend error: {message}"),
            Self::Serialization(message) => {
                write!(f, "document serialization failed: {message}")
            }
        }
    }
}

impl Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}
