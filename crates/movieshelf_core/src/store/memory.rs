//! In-memory document store.
//!
//! # Responsibility
//! - Implement the store traits without a remote backend, for tests, demos
//!   and hosts running offline.
//! - Reproduce remote change-feed semantics: one full snapshot per
//!   committed change, delivery order = commit order.
//!
//! # Invariants
//! - Document order is insertion order; replacing a document keeps its slot.
//! - Listener callbacks run with no internal lock held.

use crate::store::collection::{
    ChangeListener, CollectionEvent, Document, DocumentCollection, DocumentRef, DocumentStore,
    ListenerRegistration,
};
use crate::store::StoreResult;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// Writers never panic while holding these locks, so a poisoned guard still
// protects consistent state.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory backend handle holding named collections.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Arc<dyn DocumentCollection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        let mut collections = lock(&self.collections);
        Arc::clone(
            collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(MemoryCollection::new(name)) as Arc<dyn DocumentCollection>),
        )
    }
}

type Listeners = Arc<Mutex<Vec<(u64, Arc<dyn ChangeListener>)>>>;

/// In-memory implementation of one document collection.
pub struct MemoryCollection {
    name: String,
    documents: Mutex<Vec<Document>>,
    listeners: Listeners,
    next_listener_id: AtomicU64,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Mutex::new(Vec::new()),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> Vec<Document> {
        lock(&self.documents).clone()
    }

    /// Delivers the current full snapshot to every registered listener.
    ///
    /// Listeners are invoked outside the internal locks so a callback can
    /// call back into the collection.
    fn broadcast(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<Arc<dyn ChangeListener>> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener.on_event(CollectionEvent::Snapshot(snapshot.clone()));
        }
    }
}

impl DocumentCollection for MemoryCollection {
    fn new_document(&self) -> StoreResult<DocumentRef> {
        Ok(DocumentRef::new(Uuid::new_v4().to_string()))
    }

    fn document(&self, id: &str) -> StoreResult<DocumentRef> {
        Ok(DocumentRef::new(id))
    }

    fn set_document(&self, doc: &DocumentRef, data: Value) -> StoreResult<()> {
        {
            let mut documents = lock(&self.documents);
            match documents.iter_mut().find(|existing| existing.id == doc.id()) {
                Some(existing) => existing.data = data,
                None => documents.push(Document {
                    id: doc.id().to_string(),
                    data,
                }),
            }
        }
        debug!(
            "event=doc_set module=memory_store status=ok collection={} doc_id={}",
            self.name,
            doc.id()
        );
        self.broadcast();
        Ok(())
    }

    fn delete_document(&self, doc: &DocumentRef) -> StoreResult<()> {
        let removed = {
            let mut documents = lock(&self.documents);
            let before = documents.len();
            documents.retain(|existing| existing.id != doc.id());
            documents.len() != before
        };
        if removed {
            debug!(
                "event=doc_delete module=memory_store status=ok collection={} doc_id={}",
                self.name,
                doc.id()
            );
            self.broadcast();
        }
        Ok(())
    }

    fn query_equal(&self, field: &str, value: &Value) -> StoreResult<Vec<Document>> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|document| document.data.get(field) == Some(value))
            .collect())
    }

    fn subscribe(&self, listener: Arc<dyn ChangeListener>) -> StoreResult<ListenerRegistration> {
        let listener_id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).push((listener_id, Arc::clone(&listener)));

        // Live feeds open with the current full document set.
        listener.on_event(CollectionEvent::Snapshot(self.snapshot()));

        let listeners = Arc::clone(&self.listeners);
        Ok(ListenerRegistration::new(move || {
            lock(&listeners).retain(|(id, _)| *id != listener_id);
        }))
    }
}
