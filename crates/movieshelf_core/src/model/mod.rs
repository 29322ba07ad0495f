//! Domain model for the movie catalog.
//!
//! # Responsibility
//! - Define the canonical movie record shared by catalog and store layers.
//! - Keep the validation rules gating every write path in one place.
//!
//! # Invariants
//! - `Movie::id` is assigned by the backend exactly once at creation time.
//! - Validation is pure: no I/O, no mutation.

pub mod movie;
