//! Process-wide shared catalog instance.
//!
//! # Responsibility
//! - Provide one default catalog per process for host/UI callers.
//! - Offer an unconditional replacement path for test isolation.
//!
//! # Invariants
//! - `shared_catalog` is sticky: after the first call, the backend handle
//!   argument of later calls is ignored.
//! - `reset_shared_catalog` swaps the instance atomically.

use crate::catalog::movie_catalog::MovieCatalog;
use crate::store::collection::DocumentStore;
use log::info;
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

static SHARED_CATALOG: Lazy<RwLock<Option<Arc<MovieCatalog>>>> = Lazy::new(|| RwLock::new(None));

/// Returns the process-wide catalog, creating it on first call.
///
/// Sticky: once created, later calls return the existing instance and
/// ignore `store`. Hold the returned `Arc` (or construct via
/// [`MovieCatalog::new`]) to work with an explicit instance instead.
pub fn shared_catalog(store: &dyn DocumentStore) -> Arc<MovieCatalog> {
    let mut slot = SHARED_CATALOG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    match slot.as_ref() {
        Some(existing) => Arc::clone(existing),
        None => {
            let catalog = MovieCatalog::new(store);
            info!("event=catalog_shared_init module=catalog status=ok");
            *slot = Some(Arc::clone(&catalog));
            catalog
        }
    }
}

/// Replaces the process-wide catalog with a fresh instance bound to `store`.
///
/// Intended for test isolation: drops every record the previous instance
/// mirrored.
pub fn reset_shared_catalog(store: &dyn DocumentStore) -> Arc<MovieCatalog> {
    let catalog = MovieCatalog::new(store);
    let mut slot = SHARED_CATALOG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    info!("event=catalog_shared_reset module=catalog status=ok");
    *slot = Some(Arc::clone(&catalog));
    catalog
}
