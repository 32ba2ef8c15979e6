//! HTTP client implementation
//!
//! A single `reqwest::Client` configured with the resolved base URL, a JSON
//! content type and the fixed request timeout. Requests and failures are
//! logged here, in one place, for every collection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use super::error::{ApiError, ApiResult};
use super::resource::Resource;
use crate::config::Config;
use crate::models::{Health, Stats, User, UserId};

/// Fixed timeout for every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// CRUD operations on one backend collection
#[async_trait]
pub trait CollectionApi<R: Resource>: Send + Sync {
    /// Fetch the whole collection in server order
    async fn list(&self) -> ApiResult<Vec<R>>;

    /// Create an entity; the server assigns id and timestamp
    async fn create(&self, draft: &R::Draft) -> ApiResult<R>;

    /// Apply a partial update and return the updated entity
    async fn update(&self, id: i64, patch: &R::Patch) -> ApiResult<R>;

    async fn delete(&self, id: i64) -> ApiResult<()>;
}

/// Whole-backend endpoints
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// Liveness probe; any 2xx counts as healthy
    async fn health(&self) -> ApiResult<Health>;

    /// Statistics snapshot, recomputed server-side on every call
    async fn stats(&self) -> ApiResult<Stats>;
}

/// Response envelope used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// HTTP client for the taskdeck backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client for an explicit API base URL
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(&base_url.into())?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .user_agent(concat!("taskdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { base_url, client })
    }

    /// Build a client from the base URL resolved by the configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(config.api_base_url())
    }

    /// Returns the base URL this client was configured with
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a single user
    pub async fn get_user(&self, id: UserId) -> ApiResult<User> {
        let path = format!("{}/{}", User::PATH, id);
        let (endpoint, request) = self.request(Method::GET, &path);
        let response = self.execute(&endpoint, request).await?;
        decode(&endpoint, response).await
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let endpoint = format!("{} {}", method, path);
        let request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        (endpoint, request)
    }

    /// Send a request, turning transport failures and non-2xx into errors
    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<Response> {
        info!("API Request: {}", endpoint);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = ApiError::from_transport(e, endpoint);
                warn!("API Error: {}", error);
                return Err(error);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ApiError::from_status(status, &body, endpoint);
            warn!("API Error: {}", error);
            return Err(error);
        }

        Ok(response)
    }
}

/// Read a response body and unwrap its envelope
async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> ApiResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_transport(e, endpoint))?;

    serde_json::from_str::<Envelope<T>>(&body)
        .map(|envelope| envelope.data)
        .map_err(|e| {
            let error = ApiError::Decode {
                endpoint: endpoint.to_string(),
                details: e.to_string(),
            };
            warn!("API Error: {}", error);
            error
        })
}

#[async_trait]
impl<R: Resource> CollectionApi<R> for ApiClient {
    async fn list(&self) -> ApiResult<Vec<R>> {
        let (endpoint, request) = self.request(Method::GET, R::PATH);
        let response = self.execute(&endpoint, request).await?;
        decode(&endpoint, response).await
    }

    async fn create(&self, draft: &R::Draft) -> ApiResult<R> {
        let (endpoint, request) = self.request(Method::POST, R::PATH);
        let response = self.execute(&endpoint, request.json(draft)).await?;
        decode(&endpoint, response).await
    }

    async fn update(&self, id: i64, patch: &R::Patch) -> ApiResult<R> {
        let path = format!("{}/{}", R::PATH, id);
        let (endpoint, request) = self.request(Method::PUT, &path);
        let response = self.execute(&endpoint, request.json(patch)).await?;
        decode(&endpoint, response).await
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        let path = format!("{}/{}", R::PATH, id);
        let (endpoint, request) = self.request(Method::DELETE, &path);
        self.execute(&endpoint, request).await?;
        Ok(())
    }
}

#[async_trait]
impl ServerApi for ApiClient {
    async fn health(&self) -> ApiResult<Health> {
        let (endpoint, request) = self.request(Method::GET, "/health");
        let response = self.execute(&endpoint, request).await?;
        let body = response.text().await.unwrap_or_default();

        // The probe only cares about the status code; the body is informational
        let health = serde_json::from_str::<Envelope<Health>>(&body)
            .map(|envelope| envelope.data)
            .or_else(|_| serde_json::from_str::<Health>(&body))
            .unwrap_or_default();
        Ok(health)
    }

    async fn stats(&self) -> ApiResult<Stats> {
        let (endpoint, request) = self.request(Method::GET, "/stats");
        let response = self.execute(&endpoint, request).await?;
        decode(&endpoint, response).await
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    let invalid = |reason: &str| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    if base.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(invalid("must include http:// or https://"));
    }
    Ok(base)
}
