//! Hand-rolled in-memory test doubles shared by the application-layer tests

use crate::commissioner::{SubtaskDeps, TaskCommissioner};
use corvus_domain::{
    AgentError, AlertDefinition, AlertDefinitionRepository, AlertingConfig, AlertingConfigStore,
    CloudProvider, ClusterAgent, ClusterIntent, ClusterRole, ClusterSpec, DeviceInfo,
    ProgressSnapshot, Result, TaskRecord, TaskRecordRepository, UniverseDirectory,
    UniverseTopology,
};
use corvus_shared::config::TaskEngineConfig;
use corvus_shared::{CustomerId, TaskId, UniverseId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MockTaskRecordRepository {
    records: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl MockTaskRecordRepository {
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait::async_trait]
impl TaskRecordRepository for MockTaskRecordRepository {
    async fn save(&self, record: &TaskRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, task_id: &TaskId) -> Result<Option<TaskRecord>> {
        Ok(self.records.read().await.get(task_id).cloned())
    }

    async fn find_recent(
        &self,
        customer_id: &CustomerId,
        universe_id: Option<&UniverseId>,
        limit: usize,
    ) -> Result<Vec<TaskRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<TaskRecord> = records
            .values()
            .filter(|r| &r.customer_id == customer_id)
            .filter(|r| universe_id.is_none() || r.universe_id.as_ref() == universe_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn mark_completed(&self, task_id: &TaskId) -> Result<()> {
        if let Some(record) = self.records.write().await.get_mut(task_id) {
            record.mark_completed();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockAlertDefinitionRepository {
    rows: RwLock<Vec<AlertDefinition>>,
}

#[async_trait::async_trait]
impl AlertDefinitionRepository for MockAlertDefinitionRepository {
    async fn insert(&self, definition: AlertDefinition) -> Result<()> {
        self.rows.write().await.push(definition);
        Ok(())
    }

    async fn list_active(&self, universe_id: &UniverseId) -> Result<Vec<AlertDefinition>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|d| d.active && &d.universe_id == universe_id)
            .cloned()
            .collect())
    }
}

pub struct StaticUniverseDirectory {
    topology: UniverseTopology,
}

#[async_trait::async_trait]
impl UniverseDirectory for StaticUniverseDirectory {
    async fn get(&self, universe_id: &UniverseId) -> Result<Option<UniverseTopology>> {
        Ok((universe_id == &self.topology.universe_id).then(|| self.topology.clone()))
    }
}

pub struct StaticAlertingConfigStore {
    config: Option<AlertingConfig>,
}

#[async_trait::async_trait]
impl AlertingConfigStore for StaticAlertingConfigStore {
    async fn for_customer(&self, _customer_id: &CustomerId) -> Result<Option<AlertingConfig>> {
        Ok(self.config.clone())
    }
}

/// Cluster agent whose provisioning behavior is scripted per test
pub struct ScriptedClusterAgent {
    transient_provision_failures: AtomicUsize,
    permanent_provision_failure: Option<String>,
    provision_delay: Duration,
}

impl ScriptedClusterAgent {
    pub fn ok() -> Self {
        Self {
            transient_provision_failures: AtomicUsize::new(0),
            permanent_provision_failure: None,
            provision_delay: Duration::ZERO,
        }
    }

    /// Provisioning reports a transient failure `times` times, then succeeds
    pub fn failing_provision_times(times: usize) -> Self {
        Self {
            transient_provision_failures: AtomicUsize::new(times),
            ..Self::ok()
        }
    }

    pub fn permanent_provision_failure(cause: &str) -> Self {
        Self {
            permanent_provision_failure: Some(cause.to_string()),
            ..Self::ok()
        }
    }

    pub fn slow_provision(delay: Duration) -> Self {
        Self {
            provision_delay: delay,
            ..Self::ok()
        }
    }
}

#[async_trait::async_trait]
impl ClusterAgent for ScriptedClusterAgent {
    async fn provision_nodes(&self, _universe_id: &UniverseId) -> std::result::Result<(), AgentError> {
        if !self.provision_delay.is_zero() {
            tokio::time::sleep(self.provision_delay).await;
        }
        if let Some(cause) = &self.permanent_provision_failure {
            return Err(AgentError::Permanent(cause.clone()));
        }
        let remaining = self.transient_provision_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_provision_failures
                .store(remaining.saturating_sub(1), Ordering::SeqCst);
            return Err(AgentError::Transient("agent timeout".to_string()));
        }
        Ok(())
    }

    async fn await_servers_ready(&self, _universe_id: &UniverseId) -> std::result::Result<(), AgentError> {
        Ok(())
    }

    async fn apply_universe_config(&self, _universe_id: &UniverseId) -> std::result::Result<(), AgentError> {
        Ok(())
    }

    async fn decommission_nodes(&self, _universe_id: &UniverseId) -> std::result::Result<(), AgentError> {
        Ok(())
    }
}

/// Fully wired set of in-memory ports for commissioner tests
pub struct TestDeps {
    pub records: Arc<MockTaskRecordRepository>,
    pub alert_definitions: Arc<MockAlertDefinitionRepository>,
    pub cluster_agent: Arc<ScriptedClusterAgent>,
    pub universes: Arc<StaticUniverseDirectory>,
    pub alerting_configs: Arc<StaticAlertingConfigStore>,
    pub customer_id: CustomerId,
    pub universe_id: UniverseId,
}

impl TestDeps {
    pub fn new() -> Self {
        Self::with_agent(ScriptedClusterAgent::ok())
    }

    pub fn with_agent(agent: ScriptedClusterAgent) -> Self {
        let customer_id = CustomerId::new();
        let universe_id = UniverseId::new();
        Self {
            records: Arc::new(MockTaskRecordRepository::default()),
            alert_definitions: Arc::new(MockAlertDefinitionRepository::default()),
            cluster_agent: Arc::new(agent),
            universes: Arc::new(StaticUniverseDirectory {
                topology: test_topology(universe_id.clone()),
            }),
            alerting_configs: Arc::new(StaticAlertingConfigStore { config: None }),
            customer_id,
            universe_id,
        }
    }

    pub fn subtask_deps(&self) -> SubtaskDeps {
        SubtaskDeps {
            cluster_agent: self.cluster_agent.clone(),
            universes: self.universes.clone(),
            alerting_configs: self.alerting_configs.clone(),
            alert_definitions: self.alert_definitions.clone(),
        }
    }
}

pub fn test_topology(universe_id: UniverseId) -> UniverseTopology {
    UniverseTopology {
        universe_id,
        name: "prod-universe".to_string(),
        node_prefix: "yb-prod-universe".to_string(),
        clusters: vec![ClusterSpec {
            uuid: Uuid::new_v4(),
            role: ClusterRole::Primary,
            intent: ClusterIntent {
                provider: CloudProvider::Aws,
                instance_type: "c5.large".to_string(),
                num_nodes: 3,
                spot_price: 0.0,
                device_info: DeviceInfo {
                    num_volumes: 1,
                    volume_size_gb: 100,
                    disk_iops: None,
                    storage_tier: None,
                },
            },
        }],
        nodes: vec![],
    }
}

/// Install a test subscriber so failures print the engine's log output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Fast-retry configuration for tests
pub fn test_config() -> TaskEngineConfig {
    TaskEngineConfig {
        task_history_limit: 6,
        subtask_max_retries: 2,
        retry_base_delay_ms: 1,
    }
}

/// Poll the ledger until a record's completion timestamp is set
pub async fn await_completed(records: &MockTaskRecordRepository, task_id: &TaskId) -> TaskRecord {
    for _ in 0..500 {
        if let Some(record) = records.find_by_id(task_id).await.unwrap() {
            if !record.is_pending() {
                return record;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {} was never marked completed", task_id);
}

/// Poll a task's status until it reaches a terminal state
pub async fn await_terminal(commissioner: &TaskCommissioner, task_id: &TaskId) -> ProgressSnapshot {
    for _ in 0..500 {
        let snapshot = commissioner
            .get_status(task_id)
            .await
            .expect("task should be known to the commissioner");
        if snapshot.state.is_terminal() {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {} did not reach a terminal state", task_id);
}
