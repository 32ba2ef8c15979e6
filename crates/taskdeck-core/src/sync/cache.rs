//! Shared client-side cache
//!
//! One synchronizer per collection, shared by every view. The todo view's
//! assignee selector and the user view read the same cached users.

use std::sync::Arc;

use tracing::warn;

use super::collection::Synchronizer;
use super::health::HealthProbe;
use super::state::{CollectionState, InsertOrder};
use super::stats::StatsSync;
use crate::api::{ApiClient, CollectionApi, Resource, ServerApi};
use crate::config::Config;
use crate::models::{Todo, User};

/// Synchronizers for every collection, cheap to clone
#[derive(Clone)]
pub struct SharedCache {
    todos: Arc<Synchronizer<Todo>>,
    users: Arc<Synchronizer<User>>,
    stats: Arc<StatsSync>,
    health: Arc<HealthProbe>,
}

/// Resources with a synchronizer in the shared cache
pub trait Cached: Resource {
    fn synchronizer(cache: &SharedCache) -> &Arc<Synchronizer<Self>>;
}

impl Cached for Todo {
    fn synchronizer(cache: &SharedCache) -> &Arc<Synchronizer<Self>> {
        &cache.todos
    }
}

impl Cached for User {
    fn synchronizer(cache: &SharedCache) -> &Arc<Synchronizer<Self>> {
        &cache.users
    }
}

impl SharedCache {
    /// Build the cache over one HTTP client
    pub fn new(client: ApiClient, config: &Config) -> Self {
        let client = Arc::new(client);
        let todo_order = if config.new_todos_first {
            InsertOrder::Prepend
        } else {
            InsertOrder::Append
        };
        Self::from_parts(client.clone(), client.clone(), client, todo_order)
    }

    pub fn from_parts(
        todos: Arc<dyn CollectionApi<Todo>>,
        users: Arc<dyn CollectionApi<User>>,
        server: Arc<dyn ServerApi>,
        todo_order: InsertOrder,
    ) -> Self {
        Self {
            todos: Arc::new(Synchronizer::new(todos, todo_order)),
            users: Arc::new(Synchronizer::new(users, InsertOrder::Prepend)),
            stats: Arc::new(StatsSync::new(server.clone())),
            health: Arc::new(HealthProbe::new(server)),
        }
    }

    /// Synchronizer for a collection, looked up by entity type
    pub fn collection<R: Cached>(&self) -> &Arc<Synchronizer<R>> {
        R::synchronizer(self)
    }

    pub fn todos(&self) -> &Arc<Synchronizer<Todo>> {
        &self.todos
    }

    pub fn users(&self) -> &Arc<Synchronizer<User>> {
        &self.users
    }

    pub fn stats(&self) -> &Arc<StatsSync> {
        &self.stats
    }

    pub fn health(&self) -> &Arc<HealthProbe> {
        &self.health
    }

    /// Refresh the users offered by the todo assignment selector
    ///
    /// A failure is only logged; the todo collection's error slot is never
    /// touched and the selector falls back to whatever users are cached.
    pub async fn refresh_assignees(&self) -> CollectionState<User> {
        if let Err(e) = self.users.refresh().await {
            warn!("Could not load users for assignment: {}", e);
        }
        self.users.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};
    use crate::sync::mock::{stats, todo, MockCollection, MockServer};

    fn cache_with(
        todos: Arc<MockCollection<Todo>>,
        users: Arc<MockCollection<User>>,
    ) -> SharedCache {
        SharedCache::from_parts(
            todos,
            users,
            Arc::new(MockServer::new(Some(stats(1, 0)), true)),
            InsertOrder::Append,
        )
    }

    #[tokio::test]
    async fn test_views_share_users() {
        let users = Arc::new(MockCollection::<User>::new(vec![]));
        let cache = cache_with(Arc::new(MockCollection::new(vec![])), users.clone());

        cache
            .users()
            .create(NewUser::new("Ada", "ada@example.com", Role::Admin))
            .await
            .unwrap();

        // The todo view's selector sees the user created in the user view
        let selector = cache.collection::<User>().snapshot();
        assert_eq!(selector.items.len(), 1);
        assert_eq!(selector.items[0].name, "Ada");
        assert!(Arc::ptr_eq(cache.collection::<User>(), cache.users()));

        cache.refresh_assignees().await;
        assert_eq!(users.calls(), vec!["create", "list"]);
    }

    #[tokio::test]
    async fn test_assignee_failure_leaves_todo_error_alone() {
        let todos = Arc::new(MockCollection::new(vec![todo(1, "A", false)]));
        let users = Arc::new(MockCollection::<User>::new(vec![]));
        let cache = cache_with(todos, users.clone());
        cache.todos().refresh().await.unwrap();

        users.set_failing(true);
        let assignees = cache.refresh_assignees().await;

        assert!(assignees.items.is_empty());
        let todo_state = cache.collection::<Todo>().snapshot();
        assert!(todo_state.error.is_none());
        assert_eq!(todo_state.items.len(), 1);
    }

    #[tokio::test]
    async fn test_new_todos_first_prepends() {
        let config = Config {
            new_todos_first: true,
            ..Config::default()
        };
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        let cache = SharedCache::new(client, &config);

        assert_eq!(cache.todos().order(), InsertOrder::Prepend);
        assert_eq!(cache.users().order(), InsertOrder::Prepend);
    }
}
