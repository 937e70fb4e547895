use crate::{
    InMemoryAlertDefinitionRepository, InMemoryAlertingConfigStore, InMemoryClusterAgent,
    InMemoryTaskRecordRepository, InMemoryUniverseDirectory, StaticInstanceTypeCatalog,
    StaticPricingCatalog,
};
use corvus_domain::{
    AgentError, AlertDefinition, AlertDefinitionRepository, AlertTemplate, AlertingConfig,
    AlertingConfigStore, CloudProvider, ClusterAgent, ClusterIntent, ClusterRole, ClusterSpec,
    DeviceInfo, InstanceTypeCatalog, OperationKind, PricingCatalog, TaskRecord,
    TaskRecordRepository, UniverseDirectory, UniverseTopology,
};
use corvus_shared::{CustomerId, TaskId, UniverseId};
use uuid::Uuid;

fn record_for(customer_id: &CustomerId, age_seconds: i64) -> TaskRecord {
    let mut record = TaskRecord::new(
        TaskId::new(),
        customer_id.clone(),
        Some(UniverseId::new()),
        OperationKind::CreateUniverse,
        "Creating prod-universe".to_string(),
    );
    record.created_at = record.created_at - chrono::Duration::seconds(age_seconds);
    record
}

#[tokio::test]
async fn test_find_recent_orders_newest_first_and_caps() {
    let repo = InMemoryTaskRecordRepository::new();
    let customer_id = CustomerId::new();

    for age in 0..10 {
        repo.save(&record_for(&customer_id, age)).await.unwrap();
    }

    let recent = repo.find_recent(&customer_id, None, 6).await.unwrap();
    assert_eq!(recent.len(), 6);
    for pair in recent.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_find_recent_filters_by_universe() {
    let repo = InMemoryTaskRecordRepository::new();
    let customer_id = CustomerId::new();
    let universe_id = UniverseId::new();

    let mut targeted = record_for(&customer_id, 0);
    targeted.universe_id = Some(universe_id.clone());
    repo.save(&targeted).await.unwrap();
    repo.save(&record_for(&customer_id, 1)).await.unwrap();

    let recent = repo
        .find_recent(&customer_id, Some(&universe_id), 6)
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, targeted.id);
}

#[tokio::test]
async fn test_mark_completed_is_idempotent() {
    let repo = InMemoryTaskRecordRepository::new();
    let record = record_for(&CustomerId::new(), 0);
    repo.save(&record).await.unwrap();

    repo.mark_completed(&record.id).await.unwrap();
    let first = repo
        .find_by_id(&record.id)
        .await
        .unwrap()
        .unwrap()
        .completed_at;
    assert!(first.is_some());

    repo.mark_completed(&record.id).await.unwrap();
    let second = repo
        .find_by_id(&record.id)
        .await
        .unwrap()
        .unwrap()
        .completed_at;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_mark_completed_of_unknown_task_is_a_noop() {
    let repo = InMemoryTaskRecordRepository::new();
    assert!(repo.mark_completed(&TaskId::new()).await.is_ok());
}

#[tokio::test]
async fn test_alert_repository_lists_only_active_rows_of_universe() {
    let repo = InMemoryAlertDefinitionRepository::new();
    let customer_id = CustomerId::new();
    let universe_id = UniverseId::new();

    let active = AlertDefinition::from_template(
        &AlertTemplate::ReplicationLag,
        customer_id.clone(),
        universe_id.clone(),
        "yb-prod",
    );
    let mut inactive = AlertDefinition::from_template(
        &AlertTemplate::ClockSkew,
        customer_id.clone(),
        universe_id.clone(),
        "yb-prod",
    );
    inactive.active = false;
    let elsewhere = AlertDefinition::from_template(
        &AlertTemplate::MemoryConsumption,
        customer_id,
        UniverseId::new(),
        "yb-other",
    );

    repo.insert(active.clone()).await.unwrap();
    repo.insert(inactive).await.unwrap();
    repo.insert(elsewhere).await.unwrap();

    let listed = repo.list_active(&universe_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, active.id);
}

#[test]
fn test_instance_type_catalog_hit_and_miss() {
    let catalog = StaticInstanceTypeCatalog::new()
        .with_instance(CloudProvider::Aws, "c5.large", 2, 4.0);

    let spec = catalog.lookup(&CloudProvider::Aws, "c5.large").unwrap();
    assert_eq!(spec.num_cores, 2);
    assert_eq!(spec.mem_size_gb, 4.0);

    assert!(catalog.lookup(&CloudProvider::Aws, "m5.large").is_none());
    assert!(catalog.lookup(&CloudProvider::Gcp, "c5.large").is_none());
}

#[test]
fn test_pricing_catalog_hit_and_miss() {
    let catalog = StaticPricingCatalog::new().with_price("aws", "us-west-2", "c5.large", 0.5);

    assert_eq!(catalog.price_per_hour("aws", "us-west-2", "c5.large"), Some(0.5));
    assert_eq!(catalog.price_per_hour("aws", "us-east-1", "c5.large"), None);
}

#[tokio::test]
async fn test_alerting_config_store_round_trips_json() {
    let store = InMemoryAlertingConfigStore::new();
    let customer_id = CustomerId::new();
    let config = AlertingConfig {
        enable_clock_skew: false,
        alerting_email: "ops@example.com".to_string(),
        ..AlertingConfig::default()
    };

    store.put(customer_id.clone(), &config).await.unwrap();

    let loaded = store.for_customer(&customer_id).await.unwrap().unwrap();
    assert_eq!(loaded, config);

    assert!(store.for_customer(&CustomerId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cluster_agent_records_calls_in_order() {
    let agent = InMemoryClusterAgent::new();
    let universe_id = UniverseId::new();

    agent.provision_nodes(&universe_id).await.unwrap();
    agent.await_servers_ready(&universe_id).await.unwrap();
    agent.apply_universe_config(&universe_id).await.unwrap();

    let calls = agent.calls().await;
    let operations: Vec<&str> = calls.iter().map(|c| c.operation).collect();
    assert_eq!(
        operations,
        vec!["provision_nodes", "await_servers_ready", "apply_universe_config"]
    );
}

#[tokio::test]
async fn test_cluster_agent_scripted_transient_failures() {
    let agent = InMemoryClusterAgent::new();
    let universe_id = UniverseId::new();
    agent.fail_next_transient(1);

    let first = agent.provision_nodes(&universe_id).await;
    assert!(matches!(first, Err(AgentError::Transient(_))));

    agent.provision_nodes(&universe_id).await.unwrap();
    assert_eq!(agent.calls().await.len(), 1);
}

#[tokio::test]
async fn test_universe_directory_put_get_remove() {
    let directory = InMemoryUniverseDirectory::new();
    let universe_id = UniverseId::new();
    let topology = UniverseTopology {
        universe_id: universe_id.clone(),
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
    };

    directory.put(topology.clone()).await;
    assert_eq!(directory.get(&universe_id).await.unwrap(), Some(topology));

    directory.remove(&universe_id).await;
    assert!(directory.get(&universe_id).await.unwrap().is_none());
}
