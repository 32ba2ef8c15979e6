//! In-memory backend used by the synchronizer tests

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;

use crate::api::{ApiError, ApiResult, CollectionApi, Resource, ServerApi};
use crate::models::{Health, NewTodo, NewUser, Stats, Todo, TodoPatch, User, UserPatch};

/// Entities the mock knows how to build and patch
pub trait MockEntity: Resource {
    fn from_draft(id: i64, draft: &Self::Draft) -> Self;
    fn apply(&mut self, patch: &Self::Patch);
}

impl MockEntity for Todo {
    fn from_draft(id: i64, draft: &NewTodo) -> Self {
        Todo {
            id,
            title: draft.title.clone(),
            completed: false,
            created_at: fixed_time(),
            assigned_user_id: draft.user_id,
            assigned_user_name: None,
        }
    }

    fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(user_id) = patch.user_id {
            self.assigned_user_id = user_id;
        }
    }
}

impl MockEntity for User {
    fn from_draft(id: i64, draft: &NewUser) -> Self {
        User {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            role: draft.role,
            created_at: fixed_time(),
        }
    }

    fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

pub fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn todo(id: i64, title: &str, completed: bool) -> Todo {
    Todo {
        id,
        title: title.to_string(),
        completed,
        created_at: fixed_time(),
        assigned_user_id: None,
        assigned_user_name: None,
    }
}

pub fn network_error(endpoint: &str) -> ApiError {
    ApiError::Network {
        endpoint: endpoint.to_string(),
        details: "connection refused".to_string(),
    }
}

/// Scriptable in-memory collection that records every call
pub struct MockCollection<R> {
    items: Mutex<Vec<R>>,
    next_id: AtomicI64,
    failing: Mutex<bool>,
    list_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<&'static str>>,
}

impl<R: MockEntity> MockCollection<R> {
    pub fn new(items: Vec<R>) -> Self {
        let next_id = items.iter().map(|item| item.id()).max().unwrap_or(0) + 1;
        Self {
            items: Mutex::new(items),
            next_id: AtomicI64::new(next_id),
            failing: Mutex::new(false),
            list_delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every following call fail with a network error
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Delay list responses so concurrent calls overlap
    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    /// Replace the server-side contents
    pub fn set_items(&self, items: Vec<R>) {
        *self.items.lock().unwrap() = items;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: &'static str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        if *self.failing.lock().unwrap() {
            return Err(network_error(R::PATH));
        }
        Ok(())
    }

    fn not_found(id: i64) -> ApiError {
        ApiError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"message":"Not found"}"#,
            format!("{}/{}", R::PATH, id),
        )
    }
}

#[async_trait]
impl<R: MockEntity> CollectionApi<R> for MockCollection<R> {
    async fn list(&self) -> ApiResult<Vec<R>> {
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.record("list")?;
        Ok(self.items.lock().unwrap().clone())
    }

    async fn create(&self, draft: &R::Draft) -> ApiResult<R> {
        self.record("create")?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entity = R::from_draft(id, draft);
        self.items.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: i64, patch: &R::Patch) -> ApiResult<R> {
        self.record("update")?;
        let mut items = self.items.lock().unwrap();
        let entity = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        entity.apply(patch);
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        self.record("delete")?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

/// Scriptable health/stats endpoints
pub struct MockServer {
    pub stats: Mutex<Option<Stats>>,
    pub healthy: Mutex<bool>,
    pub calls: AtomicUsize,
}

impl MockServer {
    pub fn new(stats: Option<Stats>, healthy: bool) -> Self {
        Self {
            stats: Mutex::new(stats),
            healthy: Mutex::new(healthy),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock().unwrap() = healthy;
    }

    pub fn set_stats(&self, stats: Option<Stats>) {
        *self.stats.lock().unwrap() = stats;
    }
}

pub fn stats(total: u64, completed: u64) -> Stats {
    Stats {
        total_todos: total,
        completed_todos: completed,
        pending_todos: total - completed,
        total_users: 2,
        server_uptime: 42.7,
        timestamp: fixed_time(),
    }
}

#[async_trait]
impl ServerApi for MockServer {
    async fn health(&self) -> ApiResult<Health> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.healthy.lock().unwrap() {
            Ok(Health::default())
        } else {
            Err(network_error("/health"))
        }
    }

    async fn stats(&self) -> ApiResult<Stats> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stats = self.stats.lock().unwrap().clone();
        stats.ok_or_else(|| network_error("/stats"))
    }
}
