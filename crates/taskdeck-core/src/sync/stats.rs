//! Dashboard statistics

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use super::collection::{SyncError, SyncResult};
use crate::api::ServerApi;
use crate::models::Stats;

const FETCH_FAILED: &str = "Failed to fetch statistics";

/// Snapshot of the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsState {
    pub stats: Option<Stats>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub loaded: bool,
}

/// Read-only synchronizer for `GET /stats`
pub struct StatsSync {
    api: Arc<dyn ServerApi>,
    state: watch::Sender<StatsState>,
    ops: Mutex<()>,
}

impl StatsSync {
    pub fn new(api: Arc<dyn ServerApi>) -> Self {
        let (state, _) = watch::channel(StatsState::default());
        Self {
            api,
            state,
            ops: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> StatsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatsState> {
        self.state.subscribe()
    }

    /// Fetch a fresh snapshot, keeping the previous one on failure
    pub async fn refresh(&self) -> SyncResult<Stats> {
        let _op = self.ops.lock().await;

        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = match self.api.stats().await {
            Ok(stats) => {
                debug!("Fetched statistics ({} todos)", stats.total_todos);
                self.state.send_modify(|state| {
                    state.stats = Some(stats.clone());
                    state.loaded = true;
                });
                Ok(stats)
            }
            Err(e) => {
                warn!("{}: {}", FETCH_FAILED, e);
                self.state
                    .send_modify(|state| state.error = Some(FETCH_FAILED.to_string()));
                Err(SyncError {
                    message: FETCH_FAILED.to_string(),
                    source: Arc::new(e),
                })
            }
        };

        self.state.send_modify(|state| state.is_loading = false);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::mock::{stats, MockServer};

    #[tokio::test]
    async fn test_refresh_success() {
        let server = Arc::new(MockServer::new(Some(stats(5, 2)), true));
        let sync = StatsSync::new(server);

        let fetched = sync.refresh().await.unwrap();

        let state = sync.snapshot();
        assert_eq!(fetched.pending_todos, 3);
        assert_eq!(state.stats, Some(stats(5, 2)));
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_snapshot() {
        let server = Arc::new(MockServer::new(Some(stats(5, 2)), true));
        let sync = StatsSync::new(server.clone());
        sync.refresh().await.unwrap();

        server.set_stats(None);
        let err = sync.refresh().await.unwrap_err();

        let state = sync.snapshot();
        assert_eq!(err.to_string(), "Failed to fetch statistics");
        assert_eq!(state.error.as_deref(), Some("Failed to fetch statistics"));
        assert_eq!(state.stats, Some(stats(5, 2)));
        assert!(!state.is_loading);
    }
}
