use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder tokens substituted into a template's query text
pub const NODE_PREFIX_PLACEHOLDER: &str = "__nodePrefix__";
pub const THRESHOLD_PLACEHOLDER: &str = "__value__";

/// Fixed catalog of alert templates
///
/// Each variant is a descriptor: name, eligibility for new universes, an
/// optional per-template suppression switch, and a query template. Keeping the
/// catalog enumerable makes reconciliation a pure function over
/// {catalog, configuration, current state}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertTemplate {
    ReplicationLag,
    ClockSkew,
    MemoryConsumption,
}

impl AlertTemplate {
    pub fn all() -> &'static [AlertTemplate] {
        &[
            AlertTemplate::ReplicationLag,
            AlertTemplate::ClockSkew,
            AlertTemplate::MemoryConsumption,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlertTemplate::ReplicationLag => "Replication Lag",
            AlertTemplate::ClockSkew => "Clock Skew",
            AlertTemplate::MemoryConsumption => "Memory Consumption",
        }
    }

    /// Whether a definition is created for every newly provisioned universe
    pub fn create_for_new_universe(&self) -> bool {
        match self {
            AlertTemplate::ReplicationLag => true,
            AlertTemplate::ClockSkew => true,
            AlertTemplate::MemoryConsumption => true,
        }
    }

    /// Name of the alerting-configuration switch that suppresses this
    /// template when disabled, if it has one
    pub fn suppression_switch(&self) -> Option<&'static str> {
        match self {
            AlertTemplate::ClockSkew => Some("enable_clock_skew"),
            _ => None,
        }
    }

    /// Default alerting threshold substituted for the value placeholder
    pub fn default_threshold(&self) -> f64 {
        match self {
            AlertTemplate::ReplicationLag => 180000.0,
            AlertTemplate::ClockSkew => 500.0,
            AlertTemplate::MemoryConsumption => 90.0,
        }
    }

    /// Query text with unresolved placeholder tokens
    pub fn query_template(&self) -> &'static str {
        match self {
            AlertTemplate::ReplicationLag => {
                "max by (node_prefix) (avg_over_time(async_replication_committed_lag_micros\
                 {node_prefix=\"__nodePrefix__\"}[10m])) / 1000 > __value__"
            }
            AlertTemplate::ClockSkew => {
                "max by (node_prefix) (max_over_time(hybrid_clock_skew\
                 {node_prefix=\"__nodePrefix__\"}[10m])) / 1000 > __value__"
            }
            AlertTemplate::MemoryConsumption => {
                "max by (node_prefix) (avg_over_time(node_memory_used_pct\
                 {node_prefix=\"__nodePrefix__\"}[10m])) > __value__"
            }
        }
    }

    /// Substitute the node prefix and threshold into the query template
    pub fn build_query(&self, node_prefix: &str, threshold: f64) -> String {
        self.query_template()
            .replace(NODE_PREFIX_PLACEHOLDER, node_prefix)
            .replace(THRESHOLD_PLACEHOLDER, &format_threshold(threshold))
    }
}

impl fmt::Display for AlertTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn format_threshold(threshold: f64) -> String {
    if threshold.fract() == 0.0 {
        format!("{}", threshold as i64)
    } else {
        format!("{}", threshold)
    }
}
