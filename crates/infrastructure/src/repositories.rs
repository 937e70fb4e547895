// In-memory repositories
// MVP persistence for the task ledger and alert-definition store

use corvus_domain::{
    AlertDefinition, AlertDefinitionRepository, Result, TaskRecord, TaskRecordRepository,
};
use corvus_shared::{CustomerId, TaskId, UniverseId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory task ledger
#[derive(Clone, Default)]
pub struct InMemoryTaskRecordRepository {
    records: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl InMemoryTaskRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TaskRecordRepository for InMemoryTaskRecordRepository {
    async fn save(&self, record: &TaskRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, task_id: &TaskId) -> Result<Option<TaskRecord>> {
        let records = self.records.read().await;
        Ok(records.get(task_id).cloned())
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
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(task_id) {
            record.mark_completed();
            debug!(task_id = %task_id, "task record marked completed");
        }
        Ok(())
    }
}

/// In-memory alert-definition store
#[derive(Clone, Default)]
pub struct InMemoryAlertDefinitionRepository {
    rows: Arc<RwLock<Vec<AlertDefinition>>>,
}

impl InMemoryAlertDefinitionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait::async_trait]
impl AlertDefinitionRepository for InMemoryAlertDefinitionRepository {
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
