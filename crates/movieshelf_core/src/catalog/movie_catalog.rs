//! Movie catalog over a remote document collection.
//!
//! # Responsibility
//! - Mirror the remote `movies` collection into process memory.
//! - Gate every write behind record validation.
//!
//! # Invariants
//! - The change-feed listener is the only writer of the mirror; readers get
//!   atomically swapped immutable snapshots.
//! - A rejected write leaves both the backend and the caller's record
//!   untouched.

use crate::model::movie::{Movie, MovieValidationError};
use crate::store::collection::{
    ChangeListener, CollectionEvent, Document, DocumentCollection, DocumentStore,
    ListenerRegistration,
};
use crate::store::StoreError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock, Weak};

/// Remote collection every catalog instance is bound to.
pub const MOVIE_COLLECTION: &str = "movies";

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog operation failure.
#[derive(Debug)]
pub enum CatalogError {
    /// The record failed validation; no write was issued.
    InvalidRecord(MovieValidationError),
    /// The document-store collaborator reported a failure.
    Store(StoreError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord(err) => write!(f, "invalid movie record: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<MovieValidationError> for CatalogError {
    fn from(value: MovieValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Callback surface notified by the live subscription.
///
/// Invoked on whatever thread the backend delivers from.
pub trait CatalogObserver: Send + Sync {
    /// The mirror was replaced with a fresh snapshot.
    fn on_data_updated(&self);
    /// The feed reported a failure; the mirror was left untouched.
    fn on_error(&self, message: &str);
}

/// Mirrors the remote movie collection and mediates every write to it.
pub struct MovieCatalog {
    collection: Arc<dyn DocumentCollection>,
    mirror: RwLock<Arc<Vec<Movie>>>,
}

impl MovieCatalog {
    /// Creates a catalog bound to the `movies` collection of `store`.
    ///
    /// Returned shared so the change-feed listener can hold a weak handle
    /// back to the mirror.
    pub fn new(store: &dyn DocumentStore) -> Arc<Self> {
        let collection = store.collection(MOVIE_COLLECTION);
        info!("event=catalog_init module=catalog status=ok collection={MOVIE_COLLECTION}");
        Arc::new(Self {
            collection,
            mirror: RwLock::new(Arc::new(Vec::new())),
        })
    }

    /// Returns the current mirror snapshot.
    ///
    /// The returned vector is immutable and will not change when the next
    /// notification arrives; call again for fresher data. A write issued by
    /// this process is visible here only after the backend notifies.
    pub fn movies(&self) -> Arc<Vec<Movie>> {
        // The listener only ever swaps the Arc, so even a poisoned lock
        // still holds a complete snapshot.
        Arc::clone(
            &self
                .mirror
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    /// Subscribes `observer` to live catalog updates.
    ///
    /// Every feed delivery either swaps the mirror wholesale and calls
    /// `on_data_updated`, or reports through `on_error` and keeps the
    /// previous mirror. Detach with [`ListenerRegistration::remove`];
    /// dropping the handle leaves the subscription active.
    pub fn listen_for_updates(
        self: &Arc<Self>,
        observer: Arc<dyn CatalogObserver>,
    ) -> CatalogResult<ListenerRegistration> {
        let listener = Arc::new(MirrorListener {
            catalog: Arc::downgrade(self),
            observer,
        });
        let registration = self.collection.subscribe(listener)?;
        info!("event=catalog_listen module=catalog status=ok collection={MOVIE_COLLECTION}");
        Ok(registration)
    }

    /// Creates `movie` remotely under a fresh backend-assigned id.
    ///
    /// The backend id is committed to `movie.id` before the write is
    /// issued. A record that fails validation is not written and the
    /// caller's record keeps its previous (empty) id.
    pub fn add_movie(&self, movie: &mut Movie) -> CatalogResult<()> {
        let doc = self.collection.new_document()?;
        let mut proposed = movie.clone();
        proposed.id = doc.id().to_string();
        if let Err(err) = proposed.validate_for_document(doc.id()) {
            warn!(
                "event=movie_add module=catalog status=error error_code=invalid_record error={err}"
            );
            return Err(CatalogError::InvalidRecord(err));
        }

        *movie = proposed;
        let data = serde_json::to_value(&*movie).map_err(StoreError::from)?;
        self.collection.set_document(&doc, data)?;
        info!(
            "event=movie_add module=catalog status=ok doc_id={}",
            doc.id()
        );
        Ok(())
    }

    /// Applies new fields to `movie` and overwrites its remote document.
    ///
    /// The new fields are validated against the resolved document reference
    /// before anything is applied: a rejected update issues no write and
    /// leaves `movie` exactly as it was.
    pub fn update_movie(
        &self,
        movie: &mut Movie,
        title: impl Into<String>,
        genre: impl Into<String>,
        year: i32,
    ) -> CatalogResult<()> {
        let doc = self.collection.document(&movie.id)?;
        let mut proposed = movie.clone();
        proposed.title = title.into();
        proposed.genre = genre.into();
        proposed.year = year;
        if let Err(err) = proposed.validate_for_document(doc.id()) {
            warn!(
                "event=movie_update module=catalog status=error error_code=invalid_record doc_id={} error={err}",
                doc.id()
            );
            return Err(CatalogError::InvalidRecord(err));
        }

        let data = serde_json::to_value(&proposed).map_err(StoreError::from)?;
        self.collection.set_document(&doc, data)?;
        *movie = proposed;
        info!(
            "event=movie_update module=catalog status=ok doc_id={}",
            doc.id()
        );
        Ok(())
    }

    /// Deletes the remote document keyed by `movie`'s current id.
    ///
    /// Unconditional: no validation, no existence check. Deleting an id the
    /// backend does not know is not an error.
    pub fn delete_movie(&self, movie: &Movie) -> CatalogResult<()> {
        let doc = self.collection.document(&movie.id)?;
        self.collection.delete_document(&doc)?;
        info!(
            "event=movie_delete module=catalog status=ok doc_id={}",
            doc.id()
        );
        Ok(())
    }

    /// Checks whether any remote document carries exactly `title`.
    ///
    /// All three outcomes are distinct: `Ok(true)` for at least one match,
    /// `Ok(false)` for an empty result set, `Err` when the query itself
    /// failed.
    pub fn movie_exists(&self, title: &str) -> CatalogResult<bool> {
        let matches = self
            .collection
            .query_equal("title", &serde_json::Value::String(title.to_string()))?;
        Ok(!matches.is_empty())
    }

    fn apply_snapshot(&self, movies: Vec<Movie>) {
        let mut mirror = self
            .mirror
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *mirror = Arc::new(movies);
    }
}

/// Change-feed listener owning the only write path into the mirror.
struct MirrorListener {
    catalog: Weak<MovieCatalog>,
    observer: Arc<dyn CatalogObserver>,
}

impl ChangeListener for MirrorListener {
    fn on_event(&self, event: CollectionEvent) {
        let Some(catalog) = self.catalog.upgrade() else {
            return;
        };
        match event {
            CollectionEvent::Error(err) => {
                error!("event=catalog_snapshot module=catalog status=error error={err}");
                self.observer.on_error(&err.to_string());
            }
            CollectionEvent::Snapshot(documents) => match decode_snapshot(&documents) {
                Ok(movies) => {
                    info!(
                        "event=catalog_snapshot module=catalog status=ok count={}",
                        movies.len()
                    );
                    catalog.apply_snapshot(movies);
                    self.observer.on_data_updated();
                }
                Err(err) => {
                    error!(
                        "event=catalog_snapshot module=catalog status=error error_code=decode_failed error={err}"
                    );
                    self.observer.on_error(&err.to_string());
                }
            },
        }
    }
}

fn decode_snapshot(documents: &[Document]) -> Result<Vec<Movie>, StoreError> {
    documents
        .iter()
        .map(|document| serde_json::from_value(document.data.clone()).map_err(StoreError::from))
        .collect()
}
