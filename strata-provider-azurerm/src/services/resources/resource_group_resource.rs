//! azurerm_resource_group

use std::collections::HashMap;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use strata_core::provider::{Importer, ProviderError, ProviderResult, ResourceType};
use strata_core::resource::{Resource, ResourceId, State, Value};
use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use crate::client::ArmClient;
use crate::error::AzureError;
use crate::handler::{ResourceHandler, validate_import_id};
use crate::ids::{ArmId, ResourceGroupId};
use crate::value::{require_str, string_map, string_map_value};

pub const RESOURCE_TYPE: &str = "azurerm_resource_group";

const API_VERSION: &str = "2021-04-01";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ResourceGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    location: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
struct ResourceGroupPatch {
    tags: HashMap<String, String>,
}

pub struct ResourceGroupResource;

impl ResourceType for ResourceGroupResource {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .attribute(
                AttributeSchema::new("name", types::non_empty_string())
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("location", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("tags", types::tags()))
    }

    fn importer(&self) -> Importer {
        validate_import_id::<ResourceGroupId>
    }
}

#[async_trait]
impl ResourceHandler for ResourceGroupResource {
    async fn read(
        &self,
        client: &ArmClient,
        id: &ResourceId,
        identifier: &str,
        _prior: Option<&State>,
    ) -> ProviderResult<State> {
        let group_id = ResourceGroupId::parse(identifier).map_err(AzureError::from)?;
        let group = client
            .get_optional::<ResourceGroup>(&group_id.to_string(), API_VERSION)
            .await
            .map_err(|e| e.into_provider_error(format!("retrieving {}", group_id)))?;
        let Some(group) = group else {
            return Ok(State::not_found(id.clone()));
        };

        let mut attributes = HashMap::new();
        attributes.insert(
            "name".to_string(),
            Value::string(&group_id.resource_group_name),
        );
        attributes.insert("location".to_string(), Value::string(group.location));
        if !group.tags.is_empty() {
            attributes.insert("tags".to_string(), string_map_value(&group.tags));
        }

        Ok(State::existing(id.clone(), attributes).with_identifier(group_id.to_string()))
    }

    async fn create(&self, client: &ArmClient, resource: &Resource) -> ProviderResult<State> {
        let attrs = &resource.attributes;
        let group_id = ResourceGroupId::new(client.subscription_id(), require_str(attrs, "name")?);
        let path = group_id.to_string();

        let existing = client
            .get_optional::<ResourceGroup>(&path, API_VERSION)
            .await
            .map_err(|e| {
                e.into_provider_error(format!("checking for presence of existing {}", group_id))
            })?;
        if existing.is_some() {
            return Err(ProviderError::already_exists(RESOURCE_TYPE, path));
        }

        let body = ResourceGroup {
            location: require_str(attrs, "location")?.to_string(),
            tags: string_map(attrs, "tags"),
            ..Default::default()
        };
        client
            .put(&path, API_VERSION, &body)
            .await
            .map_err(|e| e.into_provider_error(format!("creating {}", group_id)))?;
        info!("created {}", group_id);

        self.read(client, &resource.id, &path, None).await
    }

    async fn update(
        &self,
        client: &ArmClient,
        identifier: &str,
        _from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let group_id = ResourceGroupId::parse(identifier).map_err(AzureError::from)?;
        let patch = ResourceGroupPatch {
            tags: string_map(&to.attributes, "tags"),
        };
        client
            .patch(&group_id.to_string(), API_VERSION, &patch)
            .await
            .map_err(|e| e.into_provider_error(format!("updating {}", group_id)))?;

        self.read(client, &to.id, identifier, None).await
    }

    async fn delete(
        &self,
        client: &ArmClient,
        _id: &ResourceId,
        identifier: &str,
        _prior: Option<&State>,
    ) -> ProviderResult<()> {
        let group_id = ResourceGroupId::parse(identifier).map_err(AzureError::from)?;
        client
            .delete(&group_id.to_string(), API_VERSION)
            .await
            .map_err(|e| e.into_provider_error(format!("deleting {}", group_id)))?;
        info!("deleted {}", group_id);
        Ok(())
    }
}
