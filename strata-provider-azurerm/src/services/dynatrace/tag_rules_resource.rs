//! azurerm_dynatrace_tag_rules

use std::collections::HashMap;

use async_trait::async_trait;
use log::info;
use strata_core::provider::{Importer, ProviderError, ProviderResult, ResourceType};
use strata_core::resource::{Resource, ResourceId, State, Value};
use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::helper::{expand_log_rules, expand_metric_rules, flatten_log_rules, flatten_metric_rules};
use super::models::{LogRule, MetricRule, from_blocks, to_blocks};
use super::sdk::API_VERSION;
use super::sdk::tagrules::{MonitoringTagRulesProperties, SendLogsStatus, TagAction, TagRule};
use crate::client::ArmClient;
use crate::error::{AzureError, AzureResult};
use crate::handler::{ResourceHandler, validate_import_id};
use crate::ids::{ArmId, MonitorId, TagRuleId};
use crate::value::require_str;

pub const RESOURCE_TYPE: &str = "azurerm_dynatrace_tag_rules";

pub struct TagRulesResource;

fn monitor_id_type() -> AttributeType {
    AttributeType::Custom {
        name: "MonitorId".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => MonitorId::parse(s).map(|_| ()).map_err(|e| e.to_string()),
            _ => Err("Expected string".to_string()),
        },
    }
}

fn filtering_tag_block() -> AttributeSchema {
    AttributeSchema::new(
        "filtering_tag",
        AttributeType::blocks(
            "filtering_tag",
            vec![
                AttributeSchema::new("name", AttributeType::String).required(),
                AttributeSchema::new("value", AttributeType::String).required(),
                AttributeSchema::new("action", AttributeType::one_of(TagAction::VARIANTS))
                    .required(),
            ],
        ),
    )
    .max_items(1)
    .with_provider_name("filteringTags")
}

fn send_logs(name: &str, provider_name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::one_of(SendLogsStatus::VARIANTS))
        .with_provider_name(provider_name)
}

impl ResourceType for TagRulesResource {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description("Rules deciding which tagged resources send logs and metrics to Dynatrace")
            .attribute(
                AttributeSchema::new("name", types::non_empty_string())
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("monitor_id", monitor_id_type())
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new(
                    "log_rule",
                    AttributeType::blocks(
                        "log_rule",
                        vec![
                            filtering_tag_block(),
                            send_logs("send_aad_logs", "sendAadLogs"),
                            send_logs("send_activity_logs", "sendActivityLogs"),
                            send_logs("send_subscription_logs", "sendSubscriptionLogs"),
                        ],
                    ),
                )
                .max_items(1)
                .with_provider_name("logRules"),
            )
            .attribute(
                AttributeSchema::new(
                    "metric_rule",
                    AttributeType::blocks("metric_rule", vec![filtering_tag_block()]),
                )
                .max_items(1)
                .with_provider_name("metricRules"),
            )
    }

    fn importer(&self) -> Importer {
        validate_import_id::<TagRuleId>
    }
}

fn tag_rule_id(attrs: &HashMap<String, Value>) -> AzureResult<TagRuleId> {
    let monitor_id = MonitorId::parse(require_str(attrs, "monitor_id")?)?;
    Ok(TagRuleId::new(&monitor_id, require_str(attrs, "name")?))
}

fn expand_tag_rule(attrs: &HashMap<String, Value>) -> AzureResult<TagRule> {
    let log_rules = from_blocks(attrs, "log_rule", LogRule::from_attributes);
    let metric_rules = from_blocks(attrs, "metric_rule", MetricRule::from_attributes);

    Ok(TagRule {
        id: None,
        name: None,
        properties: MonitoringTagRulesProperties {
            log_rules: expand_log_rules(&log_rules)?,
            metric_rules: expand_metric_rules(&metric_rules)?,
            provisioning_state: None,
        },
    })
}

fn flatten_tag_rule(id: &TagRuleId, rule: &TagRule) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), Value::string(&id.tag_rule_name));
    attributes.insert(
        "monitor_id".to_string(),
        Value::string(id.monitor_id().to_string()),
    );
    attributes.insert(
        "log_rule".to_string(),
        to_blocks(
            &flatten_log_rules(rule.properties.log_rules.as_ref()),
            LogRule::to_value,
        ),
    );
    attributes.insert(
        "metric_rule".to_string(),
        to_blocks(
            &flatten_metric_rules(rule.properties.metric_rules.as_ref()),
            MetricRule::to_value,
        ),
    );
    attributes
}

#[async_trait]
impl ResourceHandler for TagRulesResource {
    async fn read(
        &self,
        client: &ArmClient,
        id: &ResourceId,
        identifier: &str,
        _prior: Option<&State>,
    ) -> ProviderResult<State> {
        let rule_id = TagRuleId::parse(identifier).map_err(AzureError::from)?;

        let rule = client
            .get_optional::<TagRule>(&rule_id.to_string(), API_VERSION)
            .await
            .map_err(|e| e.into_provider_error(format!("retrieving {}", rule_id)))?;
        let Some(rule) = rule else {
            return Ok(State::not_found(id.clone()));
        };

        Ok(State::existing(id.clone(), flatten_tag_rule(&rule_id, &rule))
            .with_identifier(rule_id.to_string()))
    }

    async fn create(&self, client: &ArmClient, resource: &Resource) -> ProviderResult<State> {
        let rule_id = tag_rule_id(&resource.attributes)?;
        let path = rule_id.to_string();

        let existing = client
            .get_optional::<TagRule>(&path, API_VERSION)
            .await
            .map_err(|e| {
                e.into_provider_error(format!("checking for presence of existing {}", rule_id))
            })?;
        if existing.is_some() {
            return Err(ProviderError::already_exists(RESOURCE_TYPE, path));
        }

        let body = expand_tag_rule(&resource.attributes)?;
        client
            .put(&path, API_VERSION, &body)
            .await
            .map_err(|e| e.into_provider_error(format!("creating {}", rule_id)))?;
        info!("created {}", rule_id);

        self.read(client, &resource.id, &path, None).await
    }

    async fn update(
        &self,
        client: &ArmClient,
        identifier: &str,
        _from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let rule_id = TagRuleId::parse(identifier).map_err(AzureError::from)?;
        let body = expand_tag_rule(&to.attributes)?;
        client
            .put(&rule_id.to_string(), API_VERSION, &body)
            .await
            .map_err(|e| e.into_provider_error(format!("updating {}", rule_id)))?;

        self.read(client, &to.id, identifier, None).await
    }

    async fn delete(
        &self,
        client: &ArmClient,
        _id: &ResourceId,
        identifier: &str,
        _prior: Option<&State>,
    ) -> ProviderResult<()> {
        let rule_id = TagRuleId::parse(identifier).map_err(AzureError::from)?;
        client
            .delete(&rule_id.to_string(), API_VERSION)
            .await
            .map_err(|e| e.into_provider_error(format!("deleting {}", rule_id)))?;
        info!("deleted {}", rule_id);
        Ok(())
    }
}
