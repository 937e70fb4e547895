use crate::error::Result;
use corvus_shared::UniverseId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cloud provider family of a cluster
///
/// The provider's `code` doubles as the pricing-catalog provider code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
    Onprem,
}

impl CloudProvider {
    pub fn code(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Azure => "azu",
            CloudProvider::Onprem => "onprem",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tiered disk types with catalog-priced storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageTier {
    /// Provisioned-IOPS volumes, priced per IOPS and per GB
    Io1,
    /// General-purpose volumes, priced per GB
    Gp2,
}

/// Storage device declaration of a cluster intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub num_volumes: u32,
    pub volume_size_gb: u32,
    pub disk_iops: Option<u32>,
    /// Absent for providers without tiered disk pricing
    pub storage_tier: Option<StorageTier>,
}

/// Role of a sub-cluster within a universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterRole {
    Primary,
    ReadReplica,
}

/// Declared intent of one sub-cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterIntent {
    pub provider: CloudProvider,
    pub instance_type: String,
    /// Intended node count, independent of which nodes are currently active
    pub num_nodes: u32,
    /// Per-hour spot price; 0.0 means on-demand pricing
    pub spot_price: f64,
    pub device_info: DeviceInfo,
}

/// One sub-cluster of a universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub uuid: Uuid,
    pub role: ClusterRole,
    pub intent: ClusterIntent,
}

/// Lifecycle state of a node in a universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    ToBeProvisioned,
    Provisioned,
    Live,
    Stopped,
    Decommissioned,
}

impl NodeState {
    /// Active nodes participate in steady-state cost and resource totals
    pub fn is_active(&self) -> bool {
        matches!(self, NodeState::Live)
    }
}

/// One node of a universe topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetails {
    pub node_name: String,
    pub cluster_uuid: Uuid,
    pub az: String,
    pub region: String,
    pub instance_type: String,
    pub state: NodeState,
}

/// Snapshot of a universe's deployed topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseTopology {
    pub universe_id: UniverseId,
    pub name: String,
    /// Prefix identifying this universe's nodes in metric queries
    pub node_prefix: String,
    pub clusters: Vec<ClusterSpec>,
    pub nodes: Vec<NodeDetails>,
}

impl UniverseTopology {
    pub fn cluster_by_uuid(&self, cluster_uuid: &Uuid) -> Option<&ClusterSpec> {
        self.clusters.iter().find(|c| &c.uuid == cluster_uuid)
    }

    pub fn primary_cluster(&self) -> Option<&ClusterSpec> {
        self.clusters.iter().find(|c| c.role == ClusterRole::Primary)
    }

    pub fn active_nodes(&self) -> impl Iterator<Item = &NodeDetails> + '_ {
        self.nodes.iter().filter(|n| n.state.is_active())
    }
}

/// Port for resolving a universe's current topology
#[async_trait::async_trait]
pub trait UniverseDirectory: Send + Sync {
    async fn get(&self, universe_id: &UniverseId) -> Result<Option<UniverseTopology>>;
}
