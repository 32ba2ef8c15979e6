//! View-state synchronization
//!
//! Keeps client-side caches of the backend's collections and tells the views
//! what to render: the items, whether a fetch is running, and the last
//! failure.
//!
//! ## Rules
//!
//! 1. The cache changes only after the server confirms an operation
//! 2. A failed operation sets a fixed message and keeps the cached items
//! 3. Operations on one collection run one at a time
//! 4. Concurrent refreshes share a single request
//!
//! ## Usage
//!
//! ```ignore
//! let cache = SharedCache::new(ApiClient::from_config(&config)?, &config);
//! cache.todos().refresh().await?;
//! cache.todos().create(NewTodo::new("Buy milk")).await?;
//! let state = cache.todos().snapshot();
//! ```

mod cache;
mod collection;
mod health;
#[cfg(test)]
mod mock;
mod state;
mod stats;

pub use cache::{Cached, SharedCache};
pub use collection::{SyncError, SyncResult, Synchronizer};
pub use health::{ApiStatus, HealthProbe};
pub use state::{CollectionState, InsertOrder};
pub use stats::{StatsState, StatsSync};
