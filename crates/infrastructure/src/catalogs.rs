// Static catalogs and the alerting-config store
// Catalog adapters are plain maps seeded at startup; misses are part of the
// catalog contract and contribute zero to aggregation.

use corvus_domain::{
    AlertingConfig, AlertingConfigStore, CloudProvider, DomainError, InstanceTypeCatalog,
    InstanceTypeSpec, PricingCatalog, Result,
};
use corvus_shared::CustomerId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Instance-type catalog backed by a static map
#[derive(Clone, Default)]
pub struct StaticInstanceTypeCatalog {
    entries: HashMap<(String, String), InstanceTypeSpec>,
}

impl StaticInstanceTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(
        mut self,
        provider: CloudProvider,
        instance_type: &str,
        num_cores: u32,
        mem_size_gb: f64,
    ) -> Self {
        self.entries.insert(
            (provider.code().to_string(), instance_type.to_string()),
            InstanceTypeSpec {
                num_cores,
                mem_size_gb,
            },
        );
        self
    }
}

impl InstanceTypeCatalog for StaticInstanceTypeCatalog {
    fn lookup(&self, provider: &CloudProvider, instance_type: &str) -> Option<InstanceTypeSpec> {
        self.entries
            .get(&(provider.code().to_string(), instance_type.to_string()))
            .copied()
    }
}

/// Pricing catalog backed by a static map keyed by (provider, region, sku)
#[derive(Clone, Default)]
pub struct StaticPricingCatalog {
    prices: HashMap<(String, String, String), f64>,
}

impl StaticPricingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, provider_code: &str, region_code: &str, sku: &str, price: f64) -> Self {
        self.prices.insert(
            (
                provider_code.to_string(),
                region_code.to_string(),
                sku.to_string(),
            ),
            price,
        );
        self
    }
}

impl PricingCatalog for StaticPricingCatalog {
    fn price_per_hour(&self, provider_code: &str, region_code: &str, sku: &str) -> Option<f64> {
        self.prices
            .get(&(
                provider_code.to_string(),
                region_code.to_string(),
                sku.to_string(),
            ))
            .copied()
    }
}

/// Alerting-config store keeping each customer's settings as raw JSON,
/// deserialized on read
#[derive(Clone, Default)]
pub struct InMemoryAlertingConfigStore {
    configs: Arc<RwLock<HashMap<CustomerId, serde_json::Value>>>,
}

impl InMemoryAlertingConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, customer_id: CustomerId, config: &AlertingConfig) -> Result<()> {
        let json = serde_json::to_value(config)
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        debug!(customer = %customer_id, "storing alerting configuration");
        self.configs.write().await.insert(customer_id, json);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AlertingConfigStore for InMemoryAlertingConfigStore {
    async fn for_customer(&self, customer_id: &CustomerId) -> Result<Option<AlertingConfig>> {
        let configs = self.configs.read().await;
        configs
            .get(customer_id)
            .map(|json| {
                serde_json::from_value(json.clone())
                    .map_err(|e| DomainError::Repository(e.to_string()))
            })
            .transpose()
    }
}
