//! Collection handle contract and change-feed types.
//!
//! # Responsibility
//! - Define the capability set the catalog needs from one remote collection.
//! - Model the live change feed as explicit snapshot/error events.
//!
//! # Invariants
//! - Every write and delete is keyed by a `DocumentRef` obtained from the
//!   same collection.
//! - A snapshot event always carries the full current document set.

use crate::store::{StoreError, StoreResult};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One remote document: backend id plus raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Typed target of a write or delete.
///
/// Kept as an explicit value handed out by the collection so that the id a
/// write is keyed by stays observable to validation (and to test doubles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    id: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// One change-feed delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    /// Full current document set, in backend delivery order.
    Snapshot(Vec<Document>),
    /// Backend-side failure; the feed keeps delivering afterwards.
    Error(StoreError),
}

/// Receiver side of a collection change feed.
///
/// Invoked on whatever thread the backend delivers from.
pub trait ChangeListener: Send + Sync {
    fn on_event(&self, event: CollectionEvent);
}

/// Handle for one registered change listener.
///
/// Dropping the handle does NOT detach the listener; the feed stays live
/// for the lifetime of the backend unless [`ListenerRegistration::remove`]
/// is called.
pub struct ListenerRegistration {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl ListenerRegistration {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Detaches the listener. Later calls are no-ops.
    pub fn remove(&self) {
        let cancel = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }
}

/// Backend handle exposing named collections of documents.
pub trait DocumentStore: Send + Sync {
    /// Returns the handle for one named collection.
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection>;
}

/// Capability set for one remote collection.
pub trait DocumentCollection: Send + Sync {
    /// Allocates a reference carrying a fresh backend-generated id.
    fn new_document(&self) -> StoreResult<DocumentRef>;

    /// Resolves the reference for an existing document id.
    fn document(&self, id: &str) -> StoreResult<DocumentRef>;

    /// Writes the full document payload keyed by `doc`.
    fn set_document(&self, doc: &DocumentRef, data: Value) -> StoreResult<()>;

    /// Deletes the document keyed by `doc`.
    ///
    /// Deleting an id the backend does not know is not an error.
    fn delete_document(&self, doc: &DocumentRef) -> StoreResult<()>;

    /// Returns every document whose `field` equals `value`.
    fn query_equal(&self, field: &str, value: &Value) -> StoreResult<Vec<Document>>;

    /// Registers a change listener on the live feed.
    ///
    /// The current full snapshot is delivered to the listener immediately,
    /// then one event per committed change.
    fn subscribe(&self, listener: Arc<dyn ChangeListener>) -> StoreResult<ListenerRegistration>;
}
