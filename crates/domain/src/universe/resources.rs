use crate::universe::topology::{
    CloudProvider, NodeDetails, StorageTier, UniverseTopology,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{error, warn};

/// Pricing-catalog SKUs for tiered storage components
pub const IO1_PIOPS_SKU: &str = "io1.piops";
pub const IO1_SIZE_SKU: &str = "io1.size";
pub const GP2_SIZE_SKU: &str = "gp2.size";

/// Hardware shape of an instance type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceTypeSpec {
    pub num_cores: u32,
    pub mem_size_gb: f64,
}

/// Read-only lookup of instance-type hardware shapes
pub trait InstanceTypeCatalog: Send + Sync {
    fn lookup(&self, provider: &CloudProvider, instance_type: &str) -> Option<InstanceTypeSpec>;
}

/// Read-only lookup of per-region unit prices
pub trait PricingCatalog: Send + Sync {
    fn price_per_hour(&self, provider_code: &str, region_code: &str, sku: &str) -> Option<f64>;
}

/// Aggregated resource and steady-state cost summary of one universe
///
/// Derived, transient, and safe to compute concurrently for different
/// topologies; the computation touches no shared mutable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseResources {
    /// Total hourly price, compute plus storage, rounded to 4 decimals
    pub price_per_hour: f64,
    /// Hourly price of tiered storage alone, rounded to 4 decimals
    pub storage_price_per_hour: f64,
    pub num_cores: u32,
    pub mem_size_gb: f64,
    pub volume_count: u32,
    pub volume_size_gb: u64,
    pub num_nodes: u32,
    /// Distinct availability zones spanned by active nodes
    pub az_list: HashSet<String>,
}

impl UniverseResources {
    /// Aggregate a universe's nodes and storage into a resource summary.
    ///
    /// Node counts come from each cluster's declared intent; every other
    /// aggregate comes only from active nodes. A missing instance-type or
    /// pricing entry contributes zero to its aggregate and is logged; it never
    /// aborts the computation.
    pub fn compute(
        topology: &UniverseTopology,
        instance_types: &dyn InstanceTypeCatalog,
        pricing: &dyn PricingCatalog,
    ) -> Self {
        let mut details = Self::default();

        for cluster in &topology.clusters {
            details.num_nodes += cluster.intent.num_nodes;
        }

        for node in topology.active_nodes() {
            let Some(cluster) = topology.cluster_by_uuid(&node.cluster_uuid) else {
                warn!(
                    node = %node.node_name,
                    cluster_uuid = %node.cluster_uuid,
                    "node references an undefined cluster, skipping"
                );
                continue;
            };
            let intent = &cluster.intent;

            details.volume_count += intent.device_info.num_volumes;
            details.volume_size_gb +=
                u64::from(intent.device_info.volume_size_gb) * u64::from(intent.device_info.num_volumes);
            details.az_list.insert(node.az.clone());

            match instance_types.lookup(&intent.provider, &node.instance_type) {
                Some(spec) => {
                    details.mem_size_gb += spec.mem_size_gb;
                    details.num_cores += spec.num_cores;
                }
                None => {
                    error!(
                        instance_type = %node.instance_type,
                        provider = %intent.provider,
                        "couldn't find instance type"
                    );
                }
            }
        }

        details.add_price(topology, pricing);
        details
    }

    /// Accumulate the hourly compute and storage price over active nodes.
    ///
    /// Rounding to 4 decimal places is applied once, at the end, to the total
    /// and to the storage subtotal.
    fn add_price(&mut self, topology: &UniverseTopology, pricing: &dyn PricingCatalog) {
        let mut hourly_price = 0.0;
        let mut hourly_storage_price = 0.0;

        let primary_is_aws = topology
            .primary_cluster()
            .map(|c| c.intent.provider == CloudProvider::Aws)
            .unwrap_or(false);

        for node in topology.active_nodes() {
            let Some(cluster) = topology.cluster_by_uuid(&node.cluster_uuid) else {
                continue;
            };
            let intent = &cluster.intent;

            // Instance price, using the spot price for spot-based universes
            if intent.provider == CloudProvider::Aws && intent.spot_price > 0.0 {
                hourly_price += intent.spot_price;
            } else {
                match pricing.price_per_hour(intent.provider.code(), &node.region, &node.instance_type) {
                    Some(price) => hourly_price += price,
                    None => {
                        warn!(
                            provider = intent.provider.code(),
                            region = %node.region,
                            instance_type = %node.instance_type,
                            "no on-demand price entry, node contributes zero"
                        );
                        continue;
                    }
                }
            }

            hourly_storage_price +=
                storage_price_for_node(node, intent, primary_is_aws, pricing);
        }

        hourly_price += hourly_storage_price;

        self.price_per_hour += round4(hourly_price);
        self.storage_price_per_hour += round4(hourly_storage_price);
    }
}

fn storage_price_for_node(
    node: &NodeDetails,
    intent: &crate::universe::topology::ClusterIntent,
    primary_is_aws: bool,
    pricing: &dyn PricingCatalog,
) -> f64 {
    let Some(tier) = intent.device_info.storage_tier else {
        return 0.0;
    };
    if !primary_is_aws {
        return 0.0;
    }

    let provider_code = intent.provider.code();
    let num_volumes = f64::from(intent.device_info.num_volumes);
    let volume_size = f64::from(intent.device_info.volume_size_gb);

    match tier {
        StorageTier::Io1 => {
            let piops_price = pricing.price_per_hour(provider_code, &node.region, IO1_PIOPS_SKU);
            let size_price = pricing.price_per_hour(provider_code, &node.region, IO1_SIZE_SKU);
            match (piops_price, size_price, intent.device_info.disk_iops) {
                (Some(piops), Some(size), Some(iops)) => {
                    num_volumes * (f64::from(iops) * piops) + num_volumes * (volume_size * size)
                }
                _ => {
                    warn!(
                        region = %node.region,
                        "missing io1 price component, storage contributes zero"
                    );
                    0.0
                }
            }
        }
        StorageTier::Gp2 => match pricing.price_per_hour(provider_code, &node.region, GP2_SIZE_SKU) {
            Some(size) => num_volumes * volume_size * size,
            None => {
                warn!(
                    region = %node.region,
                    "missing gp2 price entry, storage contributes zero"
                );
                0.0
            }
        },
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::topology::{
        ClusterIntent, ClusterRole, ClusterSpec, DeviceInfo, NodeState, UniverseTopology,
    };
    use corvus_shared::UniverseId;
    use std::collections::HashMap;
    use uuid::Uuid;

    struct MapInstanceTypes(HashMap<(&'static str, &'static str), InstanceTypeSpec>);

    impl InstanceTypeCatalog for MapInstanceTypes {
        fn lookup(&self, provider: &CloudProvider, instance_type: &str) -> Option<InstanceTypeSpec> {
            self.0
                .iter()
                .find(|((p, t), _)| *p == provider.code() && *t == instance_type)
                .map(|(_, spec)| *spec)
        }
    }

    struct MapPricing(HashMap<(&'static str, &'static str, &'static str), f64>);

    impl PricingCatalog for MapPricing {
        fn price_per_hour(&self, provider_code: &str, region_code: &str, sku: &str) -> Option<f64> {
            self.0
                .iter()
                .find(|((p, r, s), _)| {
                    *p == provider_code && *r == region_code && *s == sku
                })
                .map(|(_, price)| *price)
        }
    }

    fn device(tier: Option<StorageTier>, num_volumes: u32, size: u32, iops: Option<u32>) -> DeviceInfo {
        DeviceInfo {
            num_volumes,
            volume_size_gb: size,
            disk_iops: iops,
            storage_tier: tier,
        }
    }

    fn topology(intent: ClusterIntent, num_live_nodes: usize) -> UniverseTopology {
        let cluster_uuid = Uuid::new_v4();
        let nodes = (0..num_live_nodes)
            .map(|i| NodeDetails {
                node_name: format!("yb-n{}", i + 1),
                cluster_uuid,
                az: format!("az-{}", i + 1),
                region: "us-west-2".to_string(),
                instance_type: intent.instance_type.clone(),
                state: NodeState::Live,
            })
            .collect();
        UniverseTopology {
            universe_id: UniverseId::new(),
            name: "test".to_string(),
            node_prefix: "yb-test".to_string(),
            clusters: vec![ClusterSpec {
                uuid: cluster_uuid,
                role: ClusterRole::Primary,
                intent,
            }],
            nodes,
        }
    }

    fn aws_intent(instance_type: &str, num_nodes: u32, device_info: DeviceInfo) -> ClusterIntent {
        ClusterIntent {
            provider: CloudProvider::Aws,
            instance_type: instance_type.to_string(),
            num_nodes,
            spot_price: 0.0,
            device_info,
        }
    }

    #[test]
    fn test_three_on_demand_nodes_no_storage_tier() {
        let topology = topology(
            aws_intent("c5.large", 3, device(None, 1, 250, None)),
            3,
        );
        let instance_types = MapInstanceTypes(HashMap::from([(
            ("aws", "c5.large"),
            InstanceTypeSpec {
                num_cores: 2,
                mem_size_gb: 4.0,
            },
        )]));
        let pricing = MapPricing(HashMap::from([(("aws", "us-west-2", "c5.large"), 0.50)]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        assert_eq!(details.price_per_hour, 1.5000);
        assert_eq!(details.storage_price_per_hour, 0.0000);
        assert_eq!(details.num_nodes, 3);
        assert_eq!(details.num_cores, 6);
        assert_eq!(details.mem_size_gb, 12.0);
        assert_eq!(details.volume_count, 3);
        assert_eq!(details.volume_size_gb, 750);
        assert_eq!(details.az_list.len(), 3);
    }

    #[test]
    fn test_io1_two_component_storage_pricing() {
        let topology = topology(
            aws_intent(
                "i3.xlarge",
                1,
                device(Some(StorageTier::Io1), 2, 100, Some(1000)),
            ),
            1,
        );
        let instance_types = MapInstanceTypes(HashMap::from([(
            ("aws", "i3.xlarge"),
            InstanceTypeSpec {
                num_cores: 4,
                mem_size_gb: 30.5,
            },
        )]));
        let pricing = MapPricing(HashMap::from([
            (("aws", "us-west-2", "i3.xlarge"), 0.0),
            (("aws", "us-west-2", IO1_PIOPS_SKU), 0.001),
            (("aws", "us-west-2", IO1_SIZE_SKU), 0.01),
        ]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        // 2 x (1000 x 0.001) + 2 x (100 x 0.01) = 2.0 + 2.0
        assert_eq!(details.storage_price_per_hour, 4.0000);
        assert_eq!(details.price_per_hour, 4.0000);
    }

    #[test]
    fn test_gp2_single_component_storage_pricing() {
        let topology = topology(
            aws_intent("c5.large", 1, device(Some(StorageTier::Gp2), 2, 100, None)),
            1,
        );
        let instance_types = MapInstanceTypes(HashMap::new());
        let pricing = MapPricing(HashMap::from([
            (("aws", "us-west-2", "c5.large"), 0.1),
            (("aws", "us-west-2", GP2_SIZE_SKU), 0.0002),
        ]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        // 2 x 100 x 0.0002 = 0.04, plus 0.1 compute
        assert_eq!(details.storage_price_per_hour, 0.0400);
        assert_eq!(details.price_per_hour, 0.1400);
    }

    #[test]
    fn test_missing_instance_type_skips_cores_but_not_the_rest() {
        let cluster_uuid = Uuid::new_v4();
        let mut topology = topology(
            aws_intent("c5.large", 2, device(None, 1, 100, None)),
            0,
        );
        topology.clusters[0].uuid = cluster_uuid;
        topology.nodes = vec![
            NodeDetails {
                node_name: "yb-n1".to_string(),
                cluster_uuid,
                az: "az-1".to_string(),
                region: "us-west-2".to_string(),
                instance_type: "unknown.type".to_string(),
                state: NodeState::Live,
            },
            NodeDetails {
                node_name: "yb-n2".to_string(),
                cluster_uuid,
                az: "az-2".to_string(),
                region: "us-west-2".to_string(),
                instance_type: "c5.large".to_string(),
                state: NodeState::Live,
            },
        ];
        let instance_types = MapInstanceTypes(HashMap::from([(
            ("aws", "c5.large"),
            InstanceTypeSpec {
                num_cores: 2,
                mem_size_gb: 4.0,
            },
        )]));
        let pricing = MapPricing(HashMap::from([(("aws", "us-west-2", "c5.large"), 0.5)]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        // Unknown type contributes no cores/memory but still counts volumes and AZs
        assert_eq!(details.num_cores, 2);
        assert_eq!(details.mem_size_gb, 4.0);
        assert_eq!(details.volume_count, 2);
        assert_eq!(details.az_list.len(), 2);
        // Its price lookup also misses, contributing zero
        assert_eq!(details.price_per_hour, 0.5000);
    }

    #[test]
    fn test_spot_price_overrides_on_demand_for_aws() {
        let mut intent = aws_intent("c5.large", 2, device(None, 1, 100, None));
        intent.spot_price = 0.17;
        let topology = topology(intent, 2);
        let instance_types = MapInstanceTypes(HashMap::new());
        // On-demand entry present but must not be used
        let pricing = MapPricing(HashMap::from([(("aws", "us-west-2", "c5.large"), 0.5)]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        assert_eq!(details.price_per_hour, 0.3400);
    }

    #[test]
    fn test_inactive_nodes_are_excluded() {
        let mut topology = topology(
            aws_intent("c5.large", 3, device(None, 1, 100, None)),
            3,
        );
        topology.nodes[2].state = NodeState::Stopped;
        let instance_types = MapInstanceTypes(HashMap::from([(
            ("aws", "c5.large"),
            InstanceTypeSpec {
                num_cores: 2,
                mem_size_gb: 4.0,
            },
        )]));
        let pricing = MapPricing(HashMap::from([(("aws", "us-west-2", "c5.large"), 0.5)]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        // Declared node count still reflects the intent
        assert_eq!(details.num_nodes, 3);
        // Everything else only counts the two live nodes
        assert_eq!(details.num_cores, 4);
        assert_eq!(details.volume_count, 2);
        assert_eq!(details.price_per_hour, 1.0000);
        assert_eq!(details.az_list.len(), 2);
    }

    #[test]
    fn test_non_aws_primary_gets_no_storage_price() {
        let intent = ClusterIntent {
            provider: CloudProvider::Gcp,
            instance_type: "n1-standard-4".to_string(),
            num_nodes: 1,
            spot_price: 0.0,
            device_info: device(Some(StorageTier::Gp2), 2, 100, None),
        };
        let mut topology = topology(intent, 1);
        topology.nodes[0].region = "us-central1".to_string();
        let instance_types = MapInstanceTypes(HashMap::new());
        let pricing = MapPricing(HashMap::from([
            (("gcp", "us-central1", "n1-standard-4"), 0.2),
            (("gcp", "us-central1", GP2_SIZE_SKU), 0.5),
        ]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        assert_eq!(details.storage_price_per_hour, 0.0000);
        assert_eq!(details.price_per_hour, 0.2000);
    }

    #[test]
    fn test_on_demand_miss_skips_node_storage_too() {
        let topology = topology(
            aws_intent("c5.large", 1, device(Some(StorageTier::Gp2), 2, 100, None)),
            1,
        );
        let instance_types = MapInstanceTypes(HashMap::new());
        // Only the storage SKU is priced; the instance lookup misses and the
        // node is skipped entirely, storage included.
        let pricing = MapPricing(HashMap::from([(("aws", "us-west-2", GP2_SIZE_SKU), 0.0002)]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        assert_eq!(details.price_per_hour, 0.0000);
        assert_eq!(details.storage_price_per_hour, 0.0000);
    }

    #[test]
    fn test_rounding_applied_once_at_the_end() {
        let topology = topology(
            aws_intent("c5.large", 3, device(None, 1, 100, None)),
            3,
        );
        let instance_types = MapInstanceTypes(HashMap::new());
        let pricing = MapPricing(HashMap::from([(
            ("aws", "us-west-2", "c5.large"),
            0.000033,
        )]));

        let details = UniverseResources::compute(&topology, &instance_types, &pricing);

        // 3 x 0.000033 = 0.000099 -> 0.0001 after one final rounding; rounding
        // each node separately would have produced 0.0
        assert_eq!(details.price_per_hour, 0.0001);
    }
}
