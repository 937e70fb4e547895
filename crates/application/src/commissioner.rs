use crate::operations::{OperationSpec, SubmittedTask};
use crate::progress::ProgressAggregator;
use crate::subtasks::{
    ApplyUniverseConfig, AwaitServersReady, CreateAlertDefinitions, DecommissionNodes,
    ProvisionNodes,
};
use corvus_domain::{
    AlertDefinitionRepository, AlertingConfigStore, ClusterAgent, DomainError, OperationKind,
    ProgressSnapshot, Result, Subtask, SubtaskContext, SubtaskGraph, SubtaskOutcome, TaskRecord,
    TaskRecordRepository, UniverseDirectory,
};
use corvus_shared::config::TaskEngineConfig;
use corvus_shared::TaskId;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Retry budget for subtask units reporting retryable failures
///
/// Policy is owned by the commissioner, not by the units.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &TaskEngineConfig) -> Self {
        Self {
            max_attempts: config.subtask_max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Exponential backoff: base * 2^attempt
    pub fn delay_for(&self, attempt: u8) -> Duration {
        self.base_delay * 2u32.pow(u32::from(attempt))
    }
}

/// Ports consumed by the subtask units a graph can contain
#[derive(Clone)]
pub struct SubtaskDeps {
    pub cluster_agent: Arc<dyn ClusterAgent>,
    pub universes: Arc<dyn UniverseDirectory>,
    pub alerting_configs: Arc<dyn AlertingConfigStore>,
    pub alert_definitions: Arc<dyn AlertDefinitionRepository>,
}

/// In-memory execution state of one running task
///
/// Owns the task-local completion counter; completion counting is safe under
/// concurrent unit completions within one stage.
pub struct TaskExecution {
    context: SubtaskContext,
    total: usize,
    completed: AtomicUsize,
    started: AtomicBool,
    failure: RwLock<Option<String>>,
}

impl TaskExecution {
    fn new(context: SubtaskContext, total: usize) -> Self {
        Self {
            context,
            total,
            completed: AtomicUsize::new(0),
            started: AtomicBool::new(false),
            failure: RwLock::new(None),
        }
    }

    fn start(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    fn record_completion(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// First failure wins; later causes are dropped
    async fn record_failure(&self, cause: String) {
        let mut failure = self.failure.write().await;
        if failure.is_none() {
            *failure = Some(cause);
        }
    }

    async fn has_failure(&self) -> bool {
        self.failure.read().await.is_some()
    }

    fn request_abort(&self) {
        self.context.request_abort();
    }

    pub async fn snapshot(&self) -> ProgressSnapshot {
        let failure = self.failure.read().await;
        ProgressSnapshot::derive(
            self.total,
            self.completed.load(Ordering::SeqCst),
            self.started.load(Ordering::SeqCst),
            failure.as_deref(),
            self.context.is_aborted(),
        )
    }
}

/// Owns the authoritative state machine for submitted operations
///
/// Submission returns immediately with a task identifier; execution happens on
/// its own tokio task and all progress is observed by polling `get_status`.
pub struct TaskCommissioner {
    records: Arc<dyn TaskRecordRepository>,
    aggregator: Arc<ProgressAggregator>,
    deps: SubtaskDeps,
    retry: RetryPolicy,
    executions: RwLock<HashMap<TaskId, Arc<TaskExecution>>>,
}

impl TaskCommissioner {
    pub fn new(
        records: Arc<dyn TaskRecordRepository>,
        aggregator: Arc<ProgressAggregator>,
        deps: SubtaskDeps,
        config: &TaskEngineConfig,
    ) -> Self {
        Self {
            records,
            aggregator,
            deps,
            retry: RetryPolicy::from_config(config),
            executions: RwLock::new(HashMap::new()),
        }
    }

    /// Submit an operation for asynchronous execution
    pub async fn submit(&self, spec: OperationSpec) -> Result<SubmittedTask> {
        spec.validate()?;

        let record = TaskRecord::new(
            TaskId::new(),
            spec.customer_id.clone(),
            spec.universe_id.clone(),
            spec.kind.clone(),
            spec.description(),
        );
        let task_id = record.id.clone();
        self.records.save(&record).await?;

        let graph = self.build_graph(&spec.kind);
        let context = SubtaskContext::new(
            task_id.clone(),
            spec.customer_id.clone(),
            spec.universe_id.clone(),
        );
        let execution = Arc::new(TaskExecution::new(context.clone(), graph.total_units()));
        self.executions
            .write()
            .await
            .insert(task_id.clone(), execution.clone());

        info!(task_id = %task_id, kind = %spec.kind, "task submitted");

        execution.start();
        let retry = self.retry.clone();
        let aggregator = self.aggregator.clone();
        tokio::spawn(async move {
            run_graph(execution, graph, context, retry, aggregator).await;
        });

        Ok(SubmittedTask {
            task_id,
            resource_id: spec.universe_id,
        })
    }

    /// Current derived snapshot for a task
    ///
    /// A completed record whose execution is no longer live reports a
    /// completed snapshot; anything else unknown is `TaskNotFound`.
    pub async fn get_status(&self, task_id: &TaskId) -> Result<ProgressSnapshot> {
        if let Some(execution) = self.executions.read().await.get(task_id).cloned() {
            return Ok(execution.snapshot().await);
        }

        match self.records.find_by_id(task_id).await? {
            Some(record) if !record.is_pending() => Ok(ProgressSnapshot::completed()),
            _ => Err(DomainError::TaskNotFound {
                task_id: task_id.clone(),
            }),
        }
    }

    /// Request cancellation of an in-flight task
    ///
    /// In-flight units observe the flag at their next checkpoint; pending
    /// stages are skipped. Side effects already committed are not rolled back.
    pub async fn abort(&self, task_id: &TaskId) -> Result<()> {
        let executions = self.executions.read().await;
        let execution = executions.get(task_id).ok_or_else(|| DomainError::TaskNotFound {
            task_id: task_id.clone(),
        })?;
        execution.request_abort();
        info!(task_id = %task_id, "abort requested");
        Ok(())
    }

    /// Build the subtask graph for an operation kind
    fn build_graph(&self, kind: &OperationKind) -> SubtaskGraph {
        let agent = self.deps.cluster_agent.clone();
        let alerts: Arc<dyn Subtask> = Arc::new(CreateAlertDefinitions::new(
            self.deps.universes.clone(),
            self.deps.alerting_configs.clone(),
            self.deps.alert_definitions.clone(),
        ));

        match kind {
            OperationKind::CreateUniverse => SubtaskGraph::new()
                .add_unit(Arc::new(ProvisionNodes::new(agent.clone())))
                .add_unit(Arc::new(AwaitServersReady::new(agent.clone())))
                // Configuration and alert bootstrap are independent
                .add_stage(vec![Arc::new(ApplyUniverseConfig::new(agent)), alerts]),
            OperationKind::EditUniverse => SubtaskGraph::new()
                .add_unit(Arc::new(ProvisionNodes::new(agent.clone())))
                .add_unit(Arc::new(AwaitServersReady::new(agent.clone())))
                .add_unit(Arc::new(ApplyUniverseConfig::new(agent))),
            OperationKind::DestroyUniverse => {
                SubtaskGraph::new().add_unit(Arc::new(DecommissionNodes::new(agent)))
            }
            OperationKind::ConfigureAlerts => SubtaskGraph::new().add_unit(alerts),
        }
    }
}

/// Drive a task's staged graph to a terminal state
async fn run_graph(
    execution: Arc<TaskExecution>,
    graph: SubtaskGraph,
    context: SubtaskContext,
    retry: RetryPolicy,
    aggregator: Arc<ProgressAggregator>,
) {
    for stage in graph.stages() {
        if context.is_aborted() {
            warn!(task_id = %context.task_id, "task aborted, skipping remaining stages");
            break;
        }
        if execution.has_failure().await {
            break;
        }

        join_all(
            stage
                .iter()
                .map(|unit| run_unit(unit.clone(), &context, &retry, &execution)),
        )
        .await;
    }

    let snapshot = execution.snapshot().await;
    info!(
        task_id = %context.task_id,
        state = %snapshot.state,
        percent = snapshot.percent,
        "task finished"
    );
    if let Err(e) = aggregator.observe(&context.task_id, &snapshot).await {
        error!(task_id = %context.task_id, error = %e, "failed to record task completion");
    }
}

/// Execute one unit, re-running retryable failures up to the budget
async fn run_unit(
    unit: Arc<dyn Subtask>,
    context: &SubtaskContext,
    retry: &RetryPolicy,
    execution: &Arc<TaskExecution>,
) {
    let mut attempt: u8 = 0;
    loop {
        if context.is_aborted() {
            return;
        }

        match unit.execute(context).await {
            SubtaskOutcome::Success => {
                execution.record_completion();
                return;
            }
            SubtaskOutcome::Retryable(cause) => {
                if attempt >= retry.max_attempts {
                    error!(
                        task_id = %context.task_id,
                        unit = unit.name(),
                        cause = %cause,
                        "retry budget exhausted"
                    );
                    execution
                        .record_failure(format!("{}: retries exhausted: {}", unit.name(), cause))
                        .await;
                    return;
                }
                warn!(
                    task_id = %context.task_id,
                    unit = unit.name(),
                    attempt,
                    cause = %cause,
                    "retryable subtask failure"
                );
                tokio::time::sleep(retry.delay_for(attempt)).await;
                attempt += 1;
            }
            SubtaskOutcome::Fatal(cause) => {
                error!(
                    task_id = %context.task_id,
                    unit = unit.name(),
                    cause = %cause,
                    "fatal subtask failure"
                );
                execution
                    .record_failure(format!("{} failed: {}", unit.name(), cause))
                    .await;
                return;
            }
        }
    }
}
