//! azurerm_dynatrace_monitor

use std::collections::HashMap;

use async_trait::async_trait;
use log::info;
use strata_core::provider::{Importer, ProviderError, ProviderResult, ResourceType};
use strata_core::resource::{Resource, ResourceId, State, Value};
use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::helper::{expand_plan_data, expand_user_info, flatten_plan_data, flatten_user_info};
use super::models::{IdentityProperties, PlanData, UserInfo, from_blocks, to_blocks};
use super::sdk::{API_VERSION, UnknownVariant};
use super::sdk::monitors::{
    self, ManagedIdentityType, MarketplaceSubscriptionStatus, MonitorResource,
    MonitorResourceUpdate, MonitoringStatus,
};
use crate::client::ArmClient;
use crate::error::{AzureError, AzureResult};
use crate::handler::{ResourceHandler, validate_import_id};
use crate::ids::{ArmId, MonitorId};
use crate::value::{require_str, string_map, string_map_value};

pub const RESOURCE_TYPE: &str = "azurerm_dynatrace_monitor";

pub struct MonitorsResource;

impl ResourceType for MonitorsResource {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description("Dynatrace monitor linking an Azure subscription to a Dynatrace environment")
            .attribute(
                AttributeSchema::new("name", types::non_empty_string())
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("resource_group_name", types::non_empty_string())
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("location", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("monitoring_enabled", AttributeType::Bool)
                    .with_default(Value::Bool(true))
                    .force_new()
                    .with_provider_name("monitoringStatus"),
            )
            .attribute(
                AttributeSchema::new(
                    "marketplace_subscription",
                    AttributeType::one_of(MarketplaceSubscriptionStatus::VARIANTS),
                )
                .required()
                .force_new()
                .with_provider_name("marketplaceSubscriptionStatus"),
            )
            .attribute(
                AttributeSchema::new(
                    "identity",
                    AttributeType::blocks(
                        "identity",
                        vec![
                            AttributeSchema::new("type", AttributeType::one_of(&["SystemAssigned"]))
                                .required(),
                        ],
                    ),
                )
                .required()
                .force_new()
                .max_items(1),
            )
            .attribute(
                AttributeSchema::new(
                    "plan",
                    AttributeType::blocks(
                        "plan",
                        vec![
                            AttributeSchema::new("usage_type", AttributeType::String)
                                .with_default(Value::string("COMMITTED"))
                                .with_provider_name("usageType"),
                            AttributeSchema::new("billing_cycle", AttributeType::String)
                                .with_default(Value::string("MONTHLY"))
                                .with_provider_name("billingCycle"),
                            AttributeSchema::new("plan", AttributeType::String)
                                .required()
                                .with_provider_name("planDetails"),
                            AttributeSchema::new("effective_date", AttributeType::String)
                                .computed()
                                .with_provider_name("effectiveDate"),
                        ],
                    ),
                )
                .required()
                .force_new()
                .max_items(1)
                .with_provider_name("planData"),
            )
            .attribute(
                AttributeSchema::new(
                    "user",
                    AttributeType::blocks(
                        "user",
                        vec![
                            AttributeSchema::new("first_name", AttributeType::String).required(),
                            AttributeSchema::new("last_name", AttributeType::String).required(),
                            AttributeSchema::new("email", AttributeType::String)
                                .required()
                                .with_provider_name("emailAddress"),
                            AttributeSchema::new("phone_number", AttributeType::String).required(),
                            AttributeSchema::new("country", AttributeType::String).required(),
                        ],
                    ),
                )
                .required()
                .force_new()
                .sensitive()
                .max_items(1)
                .with_description("Written on create only; the service never returns it")
                .with_provider_name("userInfo"),
            )
            .attribute(AttributeSchema::new("tags", types::tags()))
    }

    fn importer(&self) -> Importer {
        validate_import_id::<MonitorId>
    }
}

/// Build the PUT body from configuration attributes
fn expand_monitor(attrs: &HashMap<String, Value>) -> AzureResult<MonitorResource> {
    let marketplace = require_str(attrs, "marketplace_subscription")?;
    let marketplace: MarketplaceSubscriptionStatus = marketplace
        .parse()
        .map_err(|e: UnknownVariant| {
            AzureError::invalid_attribute("marketplace_subscription", e.to_string())
        })?;

    let monitoring_status = match attrs.get("monitoring_enabled").and_then(Value::as_bool) {
        Some(false) => MonitoringStatus::Disabled,
        _ => MonitoringStatus::Enabled,
    };

    let identity = from_blocks(attrs, "identity", IdentityProperties::from_attributes)
        .into_iter()
        .next()
        .map(|i| {
            i.identity_type
                .parse::<ManagedIdentityType>()
                .map(|identity_type| monitors::IdentityProperties {
                    identity_type,
                    principal_id: None,
                    tenant_id: None,
                })
                .map_err(|e| AzureError::invalid_attribute("identity", e.to_string()))
        })
        .transpose()?;

    let tags = string_map(attrs, "tags");

    Ok(MonitorResource {
        id: None,
        name: None,
        location: require_str(attrs, "location")?.to_string(),
        tags: (!tags.is_empty()).then_some(tags),
        identity,
        properties: monitors::MonitorProperties {
            monitoring_status: Some(monitoring_status),
            marketplace_subscription_status: Some(marketplace),
            plan_data: expand_plan_data(&from_blocks(attrs, "plan", PlanData::from_attributes)),
            user_info: expand_user_info(&from_blocks(attrs, "user", UserInfo::from_attributes)),
            provisioning_state: None,
        },
    })
}

/// Build configuration attributes from a GET response
fn flatten_monitor(
    id: &MonitorId,
    monitor: &MonitorResource,
    prior: Option<&State>,
) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), Value::string(&id.monitor_name));
    attributes.insert(
        "resource_group_name".to_string(),
        Value::string(&id.resource_group_name),
    );
    attributes.insert("location".to_string(), Value::string(&monitor.location));

    let props = &monitor.properties;
    attributes.insert(
        "monitoring_enabled".to_string(),
        Value::Bool(props.monitoring_status == Some(MonitoringStatus::Enabled)),
    );
    if let Some(status) = props.marketplace_subscription_status {
        attributes.insert(
            "marketplace_subscription".to_string(),
            Value::string(status.as_str()),
        );
    }

    if let Some(identity) = &monitor.identity {
        let identity = IdentityProperties {
            identity_type: identity.identity_type.as_str().to_string(),
        };
        attributes.insert(
            "identity".to_string(),
            to_blocks(&[identity], IdentityProperties::to_value),
        );
    }

    attributes.insert(
        "plan".to_string(),
        to_blocks(
            &flatten_plan_data(props.plan_data.as_ref()),
            PlanData::to_value,
        ),
    );

    let prior_user = prior
        .and_then(|p| p.attributes.get("user"))
        .and_then(Value::as_list)
        .unwrap_or_default();
    attributes.insert(
        "user".to_string(),
        to_blocks(&flatten_user_info(prior_user), UserInfo::to_value),
    );

    if let Some(tags) = &monitor.tags
        && !tags.is_empty()
    {
        attributes.insert("tags".to_string(), string_map_value(tags));
    }

    attributes
}

fn monitor_id_from(client: &ArmClient, attrs: &HashMap<String, Value>) -> AzureResult<MonitorId> {
    Ok(MonitorId::new(
        client.subscription_id(),
        require_str(attrs, "resource_group_name")?,
        require_str(attrs, "name")?,
    ))
}

#[async_trait]
impl ResourceHandler for MonitorsResource {
    async fn read(
        &self,
        client: &ArmClient,
        id: &ResourceId,
        identifier: &str,
        prior: Option<&State>,
    ) -> ProviderResult<State> {
        let monitor_id = MonitorId::parse(identifier).map_err(AzureError::from)?;

        let monitor = client
            .get_optional::<MonitorResource>(&monitor_id.to_string(), API_VERSION)
            .await
            .map_err(|e| e.into_provider_error(format!("retrieving {}", monitor_id)))?;
        let Some(monitor) = monitor else {
            return Ok(State::not_found(id.clone()));
        };

        let attributes = flatten_monitor(&monitor_id, &monitor, prior);
        Ok(State::existing(id.clone(), attributes).with_identifier(monitor_id.to_string()))
    }

    async fn create(&self, client: &ArmClient, resource: &Resource) -> ProviderResult<State> {
        let attrs = &resource.attributes;
        let monitor_id = monitor_id_from(client, attrs)?;
        let path = monitor_id.to_string();

        let existing = client
            .get_optional::<MonitorResource>(&path, API_VERSION)
            .await
            .map_err(|e| {
                e.into_provider_error(format!("checking for presence of existing {}", monitor_id))
            })?;
        if existing.is_some() {
            return Err(ProviderError::already_exists(RESOURCE_TYPE, path));
        }

        let body = expand_monitor(attrs)?;
        client
            .put(&path, API_VERSION, &body)
            .await
            .map_err(|e| e.into_provider_error(format!("creating {}", monitor_id)))?;
        info!("created {}", monitor_id);

        let desired = State::existing(resource.id.clone(), attrs.clone());
        self.read(client, &resource.id, &path, Some(&desired)).await
    }

    /// Only tags can change in place
    async fn update(
        &self,
        client: &ArmClient,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let monitor_id = MonitorId::parse(identifier).map_err(AzureError::from)?;

        let update = MonitorResourceUpdate {
            tags: string_map(&to.attributes, "tags"),
        };
        client
            .patch(&monitor_id.to_string(), API_VERSION, &update)
            .await
            .map_err(|e| e.into_provider_error(format!("updating {}", monitor_id)))?;

        let mut prior = from.clone();
        if let Some(user) = to.attributes.get("user") {
            prior.attributes.insert("user".to_string(), user.clone());
        }
        self.read(client, &to.id, identifier, Some(&prior)).await
    }

    async fn delete(
        &self,
        client: &ArmClient,
        _id: &ResourceId,
        identifier: &str,
        _prior: Option<&State>,
    ) -> ProviderResult<()> {
        let monitor_id = MonitorId::parse(identifier).map_err(AzureError::from)?;
        client
            .delete(&monitor_id.to_string(), API_VERSION)
            .await
            .map_err(|e| e.into_provider_error(format!("deleting {}", monitor_id)))?;
        info!("deleted {}", monitor_id);
        Ok(())
    }
}
