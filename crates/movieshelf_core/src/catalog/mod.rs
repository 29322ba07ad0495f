//! Movie catalog component and process-wide shared instance.
//!
//! # Responsibility
//! - Orchestrate store calls into catalog-level operations.
//! - Maintain the local mirror fed by the collection change feed.
//!
//! # Invariants
//! - The mirror always holds the full most recent snapshot; it is swapped
//!   wholesale, never patched.
//! - Write paths never bypass record validation.

pub mod movie_catalog;
pub mod shared;
