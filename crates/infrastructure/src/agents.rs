// In-memory cluster agent
// Records every call it receives; failure behavior is scriptable so tests can
// exercise the commissioner's retry and failure paths.

use corvus_domain::{AgentError, ClusterAgent};
use corvus_shared::UniverseId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// One recorded agent invocation
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCall {
    pub operation: &'static str,
    pub universe_id: UniverseId,
}

/// Cluster agent that applies every mutation to an in-process call log
#[derive(Clone, Default)]
pub struct InMemoryClusterAgent {
    calls: Arc<RwLock<Vec<AgentCall>>>,
    transient_failures: Arc<AtomicUsize>,
}

impl InMemoryClusterAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls fail with a transient error
    pub fn fail_next_transient(&self, count: usize) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<AgentCall> {
        self.calls.read().await.clone()
    }

    async fn record(&self, operation: &'static str, universe_id: &UniverseId) -> Result<(), AgentError> {
        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(AgentError::Transient(format!(
                "{} temporarily unavailable",
                operation
            )));
        }
        info!(operation, universe = %universe_id, "applying cluster mutation");
        self.calls.write().await.push(AgentCall {
            operation,
            universe_id: universe_id.clone(),
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClusterAgent for InMemoryClusterAgent {
    async fn provision_nodes(&self, universe_id: &UniverseId) -> Result<(), AgentError> {
        self.record("provision_nodes", universe_id).await
    }

    async fn await_servers_ready(&self, universe_id: &UniverseId) -> Result<(), AgentError> {
        self.record("await_servers_ready", universe_id).await
    }

    async fn apply_universe_config(&self, universe_id: &UniverseId) -> Result<(), AgentError> {
        self.record("apply_universe_config", universe_id).await
    }

    async fn decommission_nodes(&self, universe_id: &UniverseId) -> Result<(), AgentError> {
        self.record("decommission_nodes", universe_id).await
    }
}
