use corvus_domain::{AgentError, ClusterAgent, Subtask, SubtaskContext, SubtaskOutcome};
use corvus_shared::UniverseId;
use std::sync::Arc;
use tracing::info;

fn outcome_from_agent(result: Result<(), AgentError>) -> SubtaskOutcome {
    match result {
        Ok(()) => SubtaskOutcome::Success,
        Err(AgentError::Transient(cause)) => SubtaskOutcome::Retryable(cause),
        Err(AgentError::Permanent(cause)) => SubtaskOutcome::Fatal(cause),
    }
}

fn require_universe(ctx: &SubtaskContext) -> Result<&UniverseId, SubtaskOutcome> {
    ctx.universe_id
        .as_ref()
        .ok_or_else(|| SubtaskOutcome::Fatal("cluster operation requires a universe".to_string()))
}

/// Provisions the universe's declared nodes through the cluster agent
pub struct ProvisionNodes {
    agent: Arc<dyn ClusterAgent>,
}

impl ProvisionNodes {
    pub fn new(agent: Arc<dyn ClusterAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait::async_trait]
impl Subtask for ProvisionNodes {
    fn name(&self) -> &str {
        "ProvisionNodes"
    }

    async fn execute(&self, ctx: &SubtaskContext) -> SubtaskOutcome {
        let universe_id = match require_universe(ctx) {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        info!(universe = %universe_id, "provisioning nodes");
        outcome_from_agent(self.agent.provision_nodes(universe_id).await)
    }
}

/// Waits until every provisioned server reports liveness
pub struct AwaitServersReady {
    agent: Arc<dyn ClusterAgent>,
}

impl AwaitServersReady {
    pub fn new(agent: Arc<dyn ClusterAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait::async_trait]
impl Subtask for AwaitServersReady {
    fn name(&self) -> &str {
        "AwaitServersReady"
    }

    async fn execute(&self, ctx: &SubtaskContext) -> SubtaskOutcome {
        let universe_id = match require_universe(ctx) {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        outcome_from_agent(self.agent.await_servers_ready(universe_id).await)
    }
}

/// Applies the universe-level configuration to the running cluster
pub struct ApplyUniverseConfig {
    agent: Arc<dyn ClusterAgent>,
}

impl ApplyUniverseConfig {
    pub fn new(agent: Arc<dyn ClusterAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait::async_trait]
impl Subtask for ApplyUniverseConfig {
    fn name(&self) -> &str {
        "ApplyUniverseConfig"
    }

    async fn execute(&self, ctx: &SubtaskContext) -> SubtaskOutcome {
        let universe_id = match require_universe(ctx) {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        outcome_from_agent(self.agent.apply_universe_config(universe_id).await)
    }
}

/// Tears down the universe's nodes
pub struct DecommissionNodes {
    agent: Arc<dyn ClusterAgent>,
}

impl DecommissionNodes {
    pub fn new(agent: Arc<dyn ClusterAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait::async_trait]
impl Subtask for DecommissionNodes {
    fn name(&self) -> &str {
        "DecommissionNodes"
    }

    async fn execute(&self, ctx: &SubtaskContext) -> SubtaskOutcome {
        let universe_id = match require_universe(ctx) {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        info!(universe = %universe_id, "decommissioning nodes");
        outcome_from_agent(self.agent.decommission_nodes(universe_id).await)
    }
}
