// In-memory universe directory

use corvus_domain::{Result, UniverseDirectory, UniverseTopology};
use corvus_shared::UniverseId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Universe directory backed by a map of topology snapshots
#[derive(Clone, Default)]
pub struct InMemoryUniverseDirectory {
    universes: Arc<RwLock<HashMap<UniverseId, UniverseTopology>>>,
}

impl InMemoryUniverseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, topology: UniverseTopology) {
        self.universes
            .write()
            .await
            .insert(topology.universe_id.clone(), topology);
    }

    pub async fn remove(&self, universe_id: &UniverseId) {
        self.universes.write().await.remove(universe_id);
    }
}

#[async_trait::async_trait]
impl UniverseDirectory for InMemoryUniverseDirectory {
    async fn get(&self, universe_id: &UniverseId) -> Result<Option<UniverseTopology>> {
        Ok(self.universes.read().await.get(universe_id).cloned())
    }
}
