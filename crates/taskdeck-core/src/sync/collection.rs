//! Collection synchronizer
//!
//! Keeps a cached list of entities consistent with a remote collection.
//! Every mutation waits for the server before touching the cache: a failed
//! call leaves the cached items exactly as they were and records a fixed
//! message in the error slot.
//!
//! Operations on one synchronizer run one at a time. A refresh requested
//! while another refresh is in flight joins it instead of issuing a second
//! request.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use super::state::{CollectionState, InsertOrder};
use crate::api::{ApiError, CollectionApi, Resource};
use crate::models::{Todo, TodoId, TodoPatch};

/// A failed synchronizer operation
///
/// Displays as the fixed human-readable message stored in the view's error
/// slot; the transport error is kept as the source.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct SyncError {
    pub message: String,
    #[source]
    pub source: Arc<ApiError>,
}

/// Result type for synchronizer operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Cached view of one remote collection
pub struct Synchronizer<R: Resource> {
    api: Arc<dyn CollectionApi<R>>,
    order: InsertOrder,
    state: watch::Sender<CollectionState<R>>,
    /// Serializes operations on this collection
    ops: Mutex<()>,
    /// Held by the refresh in flight, with the outcome of the last refresh
    flight: Mutex<Option<SyncResult<()>>>,
}

impl<R: Resource> Synchronizer<R> {
    pub fn new(api: Arc<dyn CollectionApi<R>>, order: InsertOrder) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        Self {
            api,
            order,
            state,
            ops: Mutex::new(()),
            flight: Mutex::new(None),
        }
    }

    pub fn order(&self) -> InsertOrder {
        self.order
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CollectionState<R> {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<R>> {
        self.state.subscribe()
    }

    /// Clear the error slot (the user dismissed the banner)
    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Replace the cache with the server's current list
    ///
    /// On failure the previous items are kept and the error slot is set.
    /// The loading flag is cleared whatever the outcome.
    pub async fn refresh(&self) -> SyncResult<()> {
        let mut flight = match self.flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Joining refresh of {} already in flight", R::PLURAL);
                let joined = self.flight.lock().await;
                return joined.clone().unwrap_or(Ok(()));
            }
        };

        let _op = self.ops.lock().await;

        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = match self.api.list().await {
            Ok(items) => {
                debug!("Fetched {} {}", items.len(), R::PLURAL);
                self.state.send_modify(|state| {
                    state.items = items;
                    state.error = None;
                    state.loaded = true;
                });
                Ok(())
            }
            Err(e) => Err(self.fail(format!("Failed to fetch {}", R::PLURAL), e)),
        };

        self.state.send_modify(|state| state.is_loading = false);

        *flight = Some(result.clone());
        result
    }

    /// Create an entity and cache the server's copy
    ///
    /// Returns `Ok(None)` without calling the server when a required text
    /// field is blank.
    pub async fn create(&self, draft: R::Draft) -> SyncResult<Option<R>> {
        if !R::is_complete(&draft) {
            debug!("Ignoring {} with blank required fields", R::SINGULAR);
            return Ok(None);
        }

        let _op = self.ops.lock().await;

        match self.api.create(&draft).await {
            Ok(entity) => {
                debug!("Created {} {}", R::SINGULAR, entity.id());
                let order = self.order;
                self.state
                    .send_modify(|state| state.insert(entity.clone(), order));
                Ok(Some(entity))
            }
            Err(e) => Err(self.fail(format!("Failed to add {}", R::SINGULAR), e)),
        }
    }

    /// Apply a partial update and swap in the server's copy
    pub async fn update(&self, id: i64, patch: R::Patch) -> SyncResult<R> {
        let _op = self.ops.lock().await;

        match self.api.update(id, &patch).await {
            Ok(entity) => {
                debug!("Updated {} {}", R::SINGULAR, id);
                self.state.send_modify(|state| state.replace(entity.clone()));
                Ok(entity)
            }
            Err(e) => Err(self.fail(format!("Failed to update {}", R::SINGULAR), e)),
        }
    }

    /// Delete an entity, dropping it from the cache once the server confirms
    pub async fn delete(&self, id: i64) -> SyncResult<()> {
        let _op = self.ops.lock().await;

        match self.api.delete(id).await {
            Ok(()) => {
                debug!("Deleted {} {}", R::SINGULAR, id);
                self.state.send_modify(|state| state.remove(id));
                Ok(())
            }
            Err(e) => Err(self.fail(format!("Failed to delete {}", R::SINGULAR), e)),
        }
    }

    fn fail(&self, message: String, error: ApiError) -> SyncError {
        warn!("{}: {}", message, error);
        self.state
            .send_modify(|state| state.error = Some(message.clone()));
        SyncError {
            message,
            source: Arc::new(error),
        }
    }
}

impl Synchronizer<Todo> {
    /// Flip `completed` based on the cached value at call time
    ///
    /// Returns `Ok(None)` when the todo is not cached.
    pub async fn toggle(&self, id: TodoId) -> SyncResult<Option<Todo>> {
        let current = self.state.borrow().find(id).map(|todo| todo.completed);
        match current {
            Some(completed) => self.update(id, TodoPatch::completed(!completed)).await.map(Some),
            None => Ok(None),
        }
    }
}
