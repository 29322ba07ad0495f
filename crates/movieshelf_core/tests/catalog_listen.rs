//! Live-mirror behavior, end-to-end over the in-memory backend.

use movieshelf_core::{
    CatalogObserver, ChangeListener, CollectionEvent, Document, DocumentCollection, DocumentRef,
    DocumentStore, ListenerRegistration, MemoryStore, Movie, MovieCatalog, StoreError, StoreResult,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CountingObserver {
    updates: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

impl CountingObserver {
    fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .expect("observer lock should not be poisoned")
            .clone()
    }
}

impl CatalogObserver for CountingObserver {
    fn on_data_updated(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, message: &str) {
        self.errors
            .lock()
            .expect("observer lock should not be poisoned")
            .push(message.to_string());
    }
}

#[test]
fn added_movie_appears_in_mirror_after_notification() {
    let store = MemoryStore::new();
    let catalog = MovieCatalog::new(&store);
    let observer = Arc::new(CountingObserver::default());
    catalog
        .listen_for_updates(observer.clone())
        .expect("subscribe should succeed");

    // The feed opens with the current (empty) snapshot.
    assert_eq!(observer.update_count(), 1);
    assert!(catalog.movies().is_empty());

    let mut movie = Movie::new("Oppenheimer", "Thriller/Historical Drama", 2023);
    catalog
        .add_movie(&mut movie)
        .expect("valid movie should be added");

    assert_eq!(observer.update_count(), 2);
    let movies = catalog.movies();
    assert_eq!(movies.len(), 1);
    assert!(!movie.id.is_empty());
    assert_eq!(movies[0].id, movie.id);
    assert_eq!(movies[0].title, "Oppenheimer");
    assert_eq!(movies[0].genre, "Thriller/Historical Drama");
    assert_eq!(movies[0].year, 2023);
}

#[test]
fn mirror_is_replaced_wholesale_on_each_notification() {
    let store = MemoryStore::new();
    let catalog = MovieCatalog::new(&store);
    let observer = Arc::new(CountingObserver::default());
    catalog
        .listen_for_updates(observer.clone())
        .expect("subscribe should succeed");

    let mut first = Movie::new("Heat", "Crime", 1995);
    let mut second = Movie::new("Ronin", "Action", 1998);
    catalog.add_movie(&mut first).expect("first add");
    catalog.add_movie(&mut second).expect("second add");
    assert_eq!(catalog.movies().len(), 2);

    catalog.delete_movie(&first).expect("delete should succeed");

    let movies = catalog.movies();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].id, second.id);
}

#[test]
fn update_is_reflected_in_mirror() {
    let store = MemoryStore::new();
    let catalog = MovieCatalog::new(&store);
    let observer = Arc::new(CountingObserver::default());
    catalog
        .listen_for_updates(observer.clone())
        .expect("subscribe should succeed");

    let mut movie = Movie::new("Heat", "Crime", 1995);
    catalog.add_movie(&mut movie).expect("add should succeed");
    catalog
        .update_movie(&mut movie, "Heat", "Crime/Thriller", 1995)
        .expect("update should succeed");

    let movies = catalog.movies();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].genre, "Crime/Thriller");
}

#[test]
fn reader_snapshot_is_immutable() {
    let store = MemoryStore::new();
    let catalog = MovieCatalog::new(&store);
    let observer = Arc::new(CountingObserver::default());
    catalog
        .listen_for_updates(observer.clone())
        .expect("subscribe should succeed");

    let before = catalog.movies();
    let mut movie = Movie::new("Heat", "Crime", 1995);
    catalog.add_movie(&mut movie).expect("add should succeed");

    // The snapshot taken before the write does not mutate underneath the
    // reader; fresh data requires a fresh call.
    assert!(before.is_empty());
    assert_eq!(catalog.movies().len(), 1);
}

#[test]
fn removed_subscription_stops_mirror_updates() {
    let store = MemoryStore::new();
    let catalog = MovieCatalog::new(&store);
    let observer = Arc::new(CountingObserver::default());
    let registration = catalog
        .listen_for_updates(observer.clone())
        .expect("subscribe should succeed");

    let mut movie = Movie::new("Heat", "Crime", 1995);
    catalog.add_movie(&mut movie).expect("add should succeed");
    assert_eq!(observer.update_count(), 2);

    registration.remove();

    let mut another = Movie::new("Ronin", "Action", 1998);
    catalog.add_movie(&mut another).expect("add should succeed");
    assert_eq!(observer.update_count(), 2);
    // The mirror is frozen at the last delivered snapshot.
    assert_eq!(catalog.movies().len(), 1);
}

/// Feed that the test drives by hand, for error and decode paths the
/// in-memory backend never produces.
#[derive(Default)]
struct ScriptedFeedCollection {
    listeners: Mutex<Vec<Arc<dyn ChangeListener>>>,
}

impl ScriptedFeedCollection {
    fn emit(&self, event: CollectionEvent) {
        let listeners: Vec<Arc<dyn ChangeListener>> = self
            .listeners
            .lock()
            .expect("mock lock should not be poisoned")
            .clone();
        for listener in listeners {
            listener.on_event(event.clone());
        }
    }
}

impl DocumentCollection for ScriptedFeedCollection {
    fn new_document(&self) -> StoreResult<DocumentRef> {
        Ok(DocumentRef::new("unused"))
    }

    fn document(&self, id: &str) -> StoreResult<DocumentRef> {
        Ok(DocumentRef::new(id))
    }

    fn set_document(&self, _doc: &DocumentRef, _data: Value) -> StoreResult<()> {
        Ok(())
    }

    fn delete_document(&self, _doc: &DocumentRef) -> StoreResult<()> {
        Ok(())
    }

    fn query_equal(&self, _field: &str, _value: &Value) -> StoreResult<Vec<Document>> {
        Ok(Vec::new())
    }

    fn subscribe(&self, listener: Arc<dyn ChangeListener>) -> StoreResult<ListenerRegistration> {
        self.listeners
            .lock()
            .expect("mock lock should not be poisoned")
            .push(listener);
        Ok(ListenerRegistration::new(|| {}))
    }
}

struct ScriptedStore {
    collection: Arc<ScriptedFeedCollection>,
}

impl DocumentStore for ScriptedStore {
    fn collection(&self, _name: &str) -> Arc<dyn DocumentCollection> {
        self.collection.clone()
    }
}

fn movie_document(id: &str, title: &str, genre: &str, year: i32) -> Document {
    Document {
        id: id.to_string(),
        data: json!({"id": id, "title": title, "genre": genre, "year": year}),
    }
}

#[test]
fn feed_error_reaches_observer_and_keeps_mirror() {
    let collection = Arc::new(ScriptedFeedCollection::default());
    let catalog = MovieCatalog::new(&ScriptedStore {
        collection: Arc::clone(&collection),
    });
    let observer = Arc::new(CountingObserver::default());
    catalog
        .listen_for_updates(observer.clone())
        .expect("subscribe should succeed");

    collection.emit(CollectionEvent::Snapshot(vec![movie_document(
        "123",
        "Oppenheimer",
        "Thriller/Historical Drama",
        2023,
    )]));
    assert_eq!(catalog.movies().len(), 1);
    assert_eq!(observer.update_count(), 1);

    collection.emit(CollectionEvent::Error(StoreError::Backend(
        "listener failed".to_string(),
    )));

    let errors = observer.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("listener failed"));
    // The error delivery neither clears nor replaces the mirror.
    assert_eq!(catalog.movies().len(), 1);
    assert_eq!(observer.update_count(), 1);
}

#[test]
fn undecodable_snapshot_is_reported_and_mirror_kept() {
    let collection = Arc::new(ScriptedFeedCollection::default());
    let catalog = MovieCatalog::new(&ScriptedStore {
        collection: Arc::clone(&collection),
    });
    let observer = Arc::new(CountingObserver::default());
    catalog
        .listen_for_updates(observer.clone())
        .expect("subscribe should succeed");

    collection.emit(CollectionEvent::Snapshot(vec![movie_document(
        "123", "Heat", "Crime", 1995,
    )]));
    assert_eq!(catalog.movies().len(), 1);

    collection.emit(CollectionEvent::Snapshot(vec![Document {
        id: "456".to_string(),
        data: json!({"bogus": true}),
    }]));

    assert_eq!(observer.errors().len(), 1);
    assert_eq!(observer.update_count(), 1);
    let movies = catalog.movies();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].id, "123");
}
