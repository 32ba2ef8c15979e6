//! Backend health probe

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ServerApi;

/// Connection indicator shown in the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiStatus {
    /// No probe has finished yet
    #[default]
    Checking,
    Connected,
    Error,
}

impl ApiStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApiStatus::Checking => "checking",
            ApiStatus::Connected => "connected",
            ApiStatus::Error => "error",
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API: {}", self.label())
    }
}

/// Probes `GET /health` on request; there is no polling
///
/// The status only moves when a probe completes, so a repeated probe keeps
/// showing the previous outcome until it finishes.
pub struct HealthProbe {
    api: Arc<dyn ServerApi>,
    status: watch::Sender<ApiStatus>,
}

impl HealthProbe {
    pub fn new(api: Arc<dyn ServerApi>) -> Self {
        let (status, _) = watch::channel(ApiStatus::Checking);
        Self { api, status }
    }

    pub fn status(&self) -> ApiStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApiStatus> {
        self.status.subscribe()
    }

    /// Probe once and publish the outcome
    pub async fn check(&self) -> ApiStatus {
        let status = match self.api.health().await {
            Ok(health) => {
                info!(
                    "API health check passed (status: {})",
                    health.status.as_deref().unwrap_or("ok")
                );
                ApiStatus::Connected
            }
            Err(e) => {
                warn!("API health check failed: {}", e);
                ApiStatus::Error
            }
        };
        self.status.send_replace(status);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::mock::MockServer;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_starts_checking_then_connects() {
        let server = Arc::new(MockServer::new(None, true));
        let probe = HealthProbe::new(server.clone());
        assert_eq!(probe.status(), ApiStatus::Checking);

        assert_eq!(probe.check().await, ApiStatus::Connected);
        assert_eq!(probe.status(), ApiStatus::Connected);
        assert_eq!(server.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_and_recovery() {
        let server = Arc::new(MockServer::new(None, false));
        let probe = HealthProbe::new(server.clone());
        let mut rx = probe.subscribe();

        assert_eq!(probe.check().await, ApiStatus::Error);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ApiStatus::Error);

        server.set_healthy(true);
        assert_eq!(probe.check().await, ApiStatus::Connected);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ApiStatus::Checking.to_string(), "API: checking");
        assert_eq!(ApiStatus::Connected.to_string(), "API: connected");
        assert_eq!(ApiStatus::Error.label(), "error");
    }
}
