use corvus_shared::UniverseId;

/// Failures reported by a cluster agent call
///
/// `Transient` failures are worth retrying; `Permanent` failures are not.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("transient agent failure: {0}")]
    Transient(String),

    #[error("permanent agent failure: {0}")]
    Permanent(String),
}

/// Port for the external system that mutates cluster infrastructure
///
/// Every call is idempotent on the agent side: re-issuing a request for the
/// same universe converges to the same state.
#[async_trait::async_trait]
pub trait ClusterAgent: Send + Sync {
    /// Provision the universe's declared nodes
    async fn provision_nodes(&self, universe_id: &UniverseId) -> Result<(), AgentError>;

    /// Block until every provisioned server reports liveness
    async fn await_servers_ready(&self, universe_id: &UniverseId) -> Result<(), AgentError>;

    /// Apply the universe-level configuration to the running cluster
    async fn apply_universe_config(&self, universe_id: &UniverseId) -> Result<(), AgentError>;

    /// Tear down the universe's nodes
    async fn decommission_nodes(&self, universe_id: &UniverseId) -> Result<(), AgentError>;
}
