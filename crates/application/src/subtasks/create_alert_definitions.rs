use corvus_domain::{
    AlertDefinition, AlertDefinitionRepository, AlertTemplate, AlertingConfig, AlertingConfigStore,
    Subtask, SubtaskContext, SubtaskOutcome, UniverseDirectory,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Reconciles a universe's active alert definitions against the template
/// catalog and the customer's alerting configuration.
///
/// Desired set = templates eligible for new universes minus templates
/// suppressed by configuration. Definitions missing from the current set are
/// created; definitions present in both are left untouched. Re-running with
/// unchanged configuration creates no new rows.
pub struct CreateAlertDefinitions {
    universes: Arc<dyn UniverseDirectory>,
    alerting_configs: Arc<dyn AlertingConfigStore>,
    definitions: Arc<dyn AlertDefinitionRepository>,
}

impl CreateAlertDefinitions {
    pub fn new(
        universes: Arc<dyn UniverseDirectory>,
        alerting_configs: Arc<dyn AlertingConfigStore>,
        definitions: Arc<dyn AlertDefinitionRepository>,
    ) -> Self {
        Self {
            universes,
            alerting_configs,
            definitions,
        }
    }
}

#[async_trait::async_trait]
impl Subtask for CreateAlertDefinitions {
    fn name(&self) -> &str {
        "CreateAlertDefinitions"
    }

    async fn execute(&self, ctx: &SubtaskContext) -> SubtaskOutcome {
        let Some(universe_id) = &ctx.universe_id else {
            return SubtaskOutcome::Fatal("alert reconciliation requires a universe".to_string());
        };

        let topology = match self.universes.get(universe_id).await {
            Ok(Some(topology)) => topology,
            Ok(None) => {
                return SubtaskOutcome::Fatal(format!("universe {} not found", universe_id));
            }
            Err(e) => return SubtaskOutcome::Retryable(e.to_string()),
        };

        // A customer without stored alerting settings gets the defaults
        let config = match self.alerting_configs.for_customer(&ctx.customer_id).await {
            Ok(config) => config.unwrap_or_else(AlertingConfig::default),
            Err(e) => return SubtaskOutcome::Retryable(e.to_string()),
        };

        let desired: Vec<AlertTemplate> = AlertTemplate::all()
            .iter()
            .copied()
            .filter(|t| t.create_for_new_universe() && !config.suppresses(t))
            .collect();

        let current = match self.definitions.list_active(universe_id).await {
            Ok(current) => current,
            Err(e) => return SubtaskOutcome::Retryable(e.to_string()),
        };
        let current_names: HashSet<&str> = current.iter().map(|d| d.name.as_str()).collect();

        let mut created = 0usize;
        for template in &desired {
            if current_names.contains(template.name()) {
                debug!(template = template.name(), "definition already active");
                continue;
            }
            let definition = AlertDefinition::from_template(
                template,
                ctx.customer_id.clone(),
                universe_id.clone(),
                &topology.node_prefix,
            );
            if let Err(e) = self.definitions.insert(definition).await {
                return SubtaskOutcome::Retryable(e.to_string());
            }
            created += 1;
        }

        // Definitions that are active but no longer desired are left in place.
        // Extension point: deactivation-on-suppression would diff
        // `current_names` against `desired` here.

        info!(
            universe = %universe_id,
            created,
            desired = desired.len(),
            "alert definitions reconciled"
        );
        SubtaskOutcome::Success
    }
}
