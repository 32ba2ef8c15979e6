//! REST resource client
//!
//! Thin typed wrapper over the backend's collections:
//!
//! - `GET /health`, `GET /stats`
//! - `GET|POST /todos`, `PUT|DELETE /todos/:id`
//! - `GET|POST /users`, `GET|PUT|DELETE /users/:id`
//!
//! Every response body is an envelope `{ "data": <payload> }`. Requests
//! time out after 10 seconds and are never retried.

mod client;
mod error;
mod resource;

pub use client::{ApiClient, CollectionApi, ServerApi, REQUEST_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use resource::Resource;
