use crate::alerts::templates::AlertTemplate;
use crate::error::Result;
use chrono::{DateTime, Utc};
use corvus_shared::{CustomerId, UniverseId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer alerting configuration
///
/// Per-template suppression switches plus the notification settings the
/// console exposes. A customer without stored configuration gets the defaults,
/// under which every eligible template is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingConfig {
    pub send_alerts_to_vendor: bool,
    pub alerting_email: String,
    pub report_only_errors: bool,
    pub enable_clock_skew: bool,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            send_alerts_to_vendor: false,
            alerting_email: String::new(),
            report_only_errors: false,
            enable_clock_skew: true,
        }
    }
}

impl AlertingConfig {
    /// Whether this configuration suppresses the given template
    pub fn suppresses(&self, template: &AlertTemplate) -> bool {
        match template.suppression_switch() {
            Some("enable_clock_skew") => !self.enable_clock_skew,
            _ => false,
        }
    }
}

/// One active alert rule instantiated from a template for a universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDefinition {
    pub id: Uuid,
    pub customer_id: CustomerId,
    pub universe_id: UniverseId,
    pub name: String,
    /// Rule text with every placeholder token resolved
    pub query: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl AlertDefinition {
    pub fn from_template(
        template: &AlertTemplate,
        customer_id: CustomerId,
        universe_id: UniverseId,
        node_prefix: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            universe_id,
            name: template.name().to_string(),
            query: template.build_query(node_prefix, template.default_threshold()),
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Port for the alert-definition store
#[async_trait::async_trait]
pub trait AlertDefinitionRepository: Send + Sync {
    async fn insert(&self, definition: AlertDefinition) -> Result<()>;
    async fn list_active(&self, universe_id: &UniverseId) -> Result<Vec<AlertDefinition>>;
}

/// Port for reading a customer's alerting configuration
#[async_trait::async_trait]
pub trait AlertingConfigStore: Send + Sync {
    /// Returns `None` when the customer has never stored alerting settings
    async fn for_customer(&self, customer_id: &CustomerId) -> Result<Option<AlertingConfig>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_suppresses_nothing() {
        let config = AlertingConfig::default();
        for template in AlertTemplate::all() {
            assert!(!config.suppresses(template));
        }
    }

    #[test]
    fn test_disabled_clock_skew_suppresses_only_clock_skew() {
        let config = AlertingConfig {
            enable_clock_skew: false,
            ..AlertingConfig::default()
        };
        assert!(config.suppresses(&AlertTemplate::ClockSkew));
        assert!(!config.suppresses(&AlertTemplate::ReplicationLag));
        assert!(!config.suppresses(&AlertTemplate::MemoryConsumption));
    }

    #[test]
    fn test_definition_from_template_is_active_and_resolved() {
        let definition = AlertDefinition::from_template(
            &AlertTemplate::ReplicationLag,
            CustomerId::new(),
            UniverseId::new(),
            "yb-test-u1",
        );
        assert!(definition.active);
        assert_eq!(definition.name, "Replication Lag");
        assert!(definition.query.contains("yb-test-u1"));
        assert!(!definition.query.contains("__nodePrefix__"));
        assert!(!definition.query.contains("__value__"));
    }
}
