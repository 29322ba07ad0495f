//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `movieshelf_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("movieshelf_core version={}", movieshelf_core::core_version());
}
