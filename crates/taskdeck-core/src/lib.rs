//! Taskdeck Core Library
//!
//! This crate provides the core functionality for taskdeck, a terminal
//! client for a todo/user REST backend.
//!
//! # Architecture
//!
//! - **Resource client**: typed async HTTP access to `/todos`, `/users`,
//!   `/stats` and `/health`
//! - **Synchronizers**: cached, server-confirmed view state per collection
//!
//! The backend owns every entity; the client only mirrors it.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let cache = SharedCache::new(ApiClient::from_config(&config)?, &config);
//!
//! cache.todos().refresh().await?;
//! cache.todos().toggle(1).await?;
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP client and error classification
//! - `sync`: View-state synchronizers and the shared cache
//! - `models`: Wire types for todos, users and statistics
//! - `route`: Navigation targets
//! - `config`: Application configuration

pub mod api;
pub mod config;
pub mod models;
pub mod route;
pub mod sync;

pub use api::{ApiClient, ApiError, ApiResult};
pub use config::{Config, Mode};
pub use models::{NewTodo, NewUser, Role, Stats, Todo, TodoPatch, User, UserPatch};
pub use route::Route;
pub use sync::{ApiStatus, CollectionState, SharedCache, SyncError, SyncResult};
