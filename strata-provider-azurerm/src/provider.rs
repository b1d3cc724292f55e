//! Azure Resource Manager provider implementation
//!
//! Validates desired attributes against each resource type's schema, then
//! dispatches to the registered handler.

use log::debug;
use strata_core::differ::{changed_declared_attributes, requires_replacement};
use strata_core::provider::{ProviderError, ProviderResult, ResourceType};
use strata_core::registration::ServiceRegistration;
use strata_core::resource::{Resource, ResourceId, State};

use crate::client::ArmClient;
use crate::config::AzureConfig;
use crate::error::AzureResult;
use crate::handler::ResourceHandler;
use crate::registry::Registry;

/// Azure Resource Manager provider
pub struct AzureProvider {
    client: ArmClient,
    registry: Registry,
}

impl AzureProvider {
    pub fn new(config: AzureConfig) -> AzureResult<Self> {
        Ok(Self {
            client: ArmClient::new(config)?,
            registry: Registry::new(),
        })
    }

    /// Create a provider configured from `ARM_*` environment variables
    pub fn from_env() -> AzureResult<Self> {
        Self::new(AzureConfig::from_env()?)
    }

    pub fn client(&self) -> &ArmClient {
        &self.client
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn handler(&self, id: &ResourceId) -> ProviderResult<&dyn ResourceHandler> {
        self.registry.handler(&id.resource_type).ok_or_else(|| {
            ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                .for_resource(id.clone())
        })
    }

    /// Apply schema defaults and validate the result
    pub fn prepare(&self, resource: &Resource) -> ProviderResult<Resource> {
        let schema = self.handler(&resource.id)?.schema();
        let mut prepared = resource.clone();
        schema.apply_defaults(&mut prepared.attributes);
        schema.validate(&prepared.attributes).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ProviderError::new(format!("Invalid attributes: {}", messages.join("; ")))
                .for_resource(resource.id.clone())
        })?;
        Ok(prepared)
    }

    /// Attributes whose desired value differs from state, after defaults
    pub fn diff(&self, to: &Resource, from: &State) -> ProviderResult<Vec<String>> {
        let prepared = self.prepare(to)?;
        let schema = self.handler(&to.id)?.schema();
        Ok(changed_declared_attributes(
            &schema,
            &prepared.attributes,
            &from.attributes,
            &[],
        ))
    }

    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        prior: Option<&State>,
    ) -> ProviderResult<State> {
        let handler = self.handler(id)?;
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id.clone()));
        };
        debug!("reading {} ({})", id, identifier);
        handler
            .read(&self.client, id, identifier, prior)
            .await
            .map_err(|e| e.for_resource(id.clone()))
    }

    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let prepared = self.prepare(resource)?;
        self.handler(&resource.id)?
            .create(&self.client, &prepared)
            .await
            .map_err(|e| e.for_resource(resource.id.clone()))
    }

    /// Update in place; changes to force-new attributes are refused
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let prepared = self.prepare(to)?;
        let handler = self.handler(id)?;

        let changed = self.diff(to, from)?;
        let replace = requires_replacement(&handler.schema(), &changed);
        if !replace.is_empty() {
            return Err(ProviderError::new(format!(
                "Changing {} requires replacing the resource",
                replace.join(", ")
            ))
            .for_resource(id.clone()));
        }

        handler
            .update(&self.client, identifier, from, &prepared)
            .await
            .map_err(|e| e.for_resource(id.clone()))
    }

    pub async fn delete_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        prior: Option<&State>,
    ) -> ProviderResult<()> {
        self.handler(id)?
            .delete(&self.client, id, identifier, prior)
            .await
            .map_err(|e| e.for_resource(id.clone()))
    }

    /// Run the resource type's importer, then read every state it returns
    pub async fn import_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
    ) -> ProviderResult<Vec<State>> {
        let handler = self.handler(id)?;
        let seeded = State::existing(id.clone(), Default::default()).with_identifier(identifier);

        let mut imported = Vec::new();
        for state in (handler.importer())(seeded)? {
            let identifier = state.identifier.clone().ok_or_else(|| {
                ProviderError::new("importer returned a state without identifier")
                    .for_resource(state.id.clone())
            })?;
            let current = self
                .read_resource(&state.id, Some(&identifier), Some(&state))
                .await?;
            if !current.exists {
                return Err(ProviderError::new(format!(
                    "Cannot import non-existent remote object {}",
                    identifier
                ))
                .for_resource(state.id));
            }
            imported.push(current);
        }
        Ok(imported)
    }
}

impl strata_core::provider::Provider for AzureProvider {
    fn name(&self) -> &'static str {
        "azurerm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        self.registry
            .registrations()
            .iter()
            .flat_map(|r| r.resources())
            .collect()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        prior: Option<&State>,
    ) -> strata_core::provider::BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        let prior = prior.cloned();
        Box::pin(async move {
            self.read_resource(&id, identifier.as_deref(), prior.as_ref())
                .await
        })
    }

    fn create(
        &self,
        resource: &Resource,
    ) -> strata_core::provider::BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> strata_core::provider::BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        prior: Option<&State>,
    ) -> strata_core::provider::BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let prior = prior.cloned();
        Box::pin(async move { self.delete_resource(&id, &identifier, prior.as_ref()).await })
    }

    fn import(
        &self,
        id: &ResourceId,
        identifier: &str,
    ) -> strata_core::provider::BoxFuture<'_, ProviderResult<Vec<State>>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.import_resource(&id, &identifier).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::matchers::request;
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};
    use serde_json::json;
    use strata_core::provider::Provider;
    use strata_core::resource::Value;

    const RG: &str = "/subscriptions/sub/resourceGroups/rg1";

    fn provider(server: &Server) -> AzureProvider {
        AzureProvider::new(
            AzureConfig::default()
                .with_subscription("sub")
                .with_endpoint(server.url_str("")),
        )
        .unwrap()
    }

    fn group() -> Resource {
        Resource::new("azurerm_resource_group", "test")
            .with_attribute("name", Value::string("rg1"))
            .with_attribute("location", Value::string("westeurope"))
    }

    #[test]
    fn prepare_applies_defaults_and_validates() {
        let server = Server::run();
        let provider = provider(&server);

        let tag_rule = Resource::new("azurerm_dynatrace_tag_rules", "test")
            .with_attribute("name", Value::string("default"));
        let err = provider.prepare(&tag_rule).unwrap_err();
        assert!(err.to_string().contains("'monitor_id' is missing"));

        let unknown = Resource::new("azurerm_dynatrace_monitors", "test");
        assert!(provider.prepare(&unknown).unwrap_err().to_string().contains("Unknown resource type"));
    }

    #[test]
    fn lists_all_resource_types() {
        let server = Server::run();
        let names: Vec<_> = provider(&server)
            .resource_types()
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "azurerm_resource_group",
                "azurerm_dynatrace_monitor",
                "azurerm_dynatrace_tag_rules",
                "azurerm_cdn_frontdoor_custom_domain_association",
            ]
        );
    }

    #[tokio::test]
    async fn read_without_identifier_is_not_found() {
        let server = Server::run();
        let state = provider(&server)
            .read(&ResourceId::new("azurerm_resource_group", "test"), None, None)
            .await
            .unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn update_refuses_force_new_changes() {
        let server = Server::run();
        let from = State::existing(group().id, group().attributes).with_identifier(RG);
        let to = group().with_attribute("location", Value::string("eastus"));

        let err = provider(&server)
            .update(&to.id, RG, &from, &to)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Changing location requires replacing"));
    }

    const MONITOR: &str =
        "/subscriptions/sub/resourceGroups/rg1/providers/Dynatrace.Observability/monitors/monitor1";

    fn block(entries: &[(&str, &str)]) -> Value {
        Value::block(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), Value::string(*v)))
                .collect(),
        )
    }

    /// Monitor relying on schema defaults for `monitoring_enabled` and the plan cycle
    fn monitor() -> Resource {
        Resource::new("azurerm_dynatrace_monitor", "test")
            .with_attribute("name", Value::string("monitor1"))
            .with_attribute("resource_group_name", Value::string("rg1"))
            .with_attribute("location", Value::string("westeurope"))
            .with_attribute("marketplace_subscription", Value::string("Active"))
            .with_attribute("identity", block(&[("type", "SystemAssigned")]))
            .with_attribute("plan", block(&[("plan", "payg")]))
            .with_attribute(
                "user",
                block(&[
                    ("first_name", "Alice"),
                    ("last_name", "Bobab"),
                    ("email", "alice@example.com"),
                    ("phone_number", "123456"),
                    ("country", "westus"),
                ]),
            )
    }

    fn monitor_response(tags: serde_json::Value) -> serde_json::Value {
        json!({
            "id": MONITOR,
            "name": "monitor1",
            "location": "westeurope",
            "tags": tags,
            "identity": {"type": "SystemAssigned"},
            "properties": {
                "monitoringStatus": "Enabled",
                "marketplaceSubscriptionStatus": "Active",
                "planData": {
                    "usageType": "COMMITTED",
                    "billingCycle": "MONTHLY",
                    "planDetails": "payg",
                    "effectiveDate": "2023-05-01T00:00:00Z"
                }
            }
        })
    }

    fn env_tag() -> Value {
        let mut tags = std::collections::HashMap::new();
        tags.insert("env".to_string(), Value::string("test"));
        Value::Map(tags)
    }

    #[tokio::test]
    async fn monitor_tags_update_in_place() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", MONITOR))
                .times(3)
                .respond_with(httptest::cycle![
                    status_code(404),
                    json_encoded(monitor_response(json!({}))),
                    json_encoded(monitor_response(json!({"env": "test"}))),
                ]),
        );
        server.expect(
            Expectation::matching(request::method_path("PUT", MONITOR))
                .respond_with(status_code(200).body("{}")),
        );
        server.expect(
            Expectation::matching(request::method_path("PATCH", MONITOR))
                .respond_with(status_code(200).body("{}")),
        );

        let provider = provider(&server);
        let created = provider.create(&monitor()).await.unwrap();
        assert!(
            provider.diff(&monitor(), &created).unwrap().is_empty(),
            "computed plan fields and defaults must not count as changes"
        );

        let tagged = monitor().with_attribute("tags", env_tag());
        assert_eq!(provider.diff(&tagged, &created).unwrap(), vec!["tags"]);

        let updated = provider
            .update(&tagged.id, MONITOR, &created, &tagged)
            .await
            .unwrap();
        assert_eq!(updated.attributes["tags"], env_tag());
        assert_eq!(updated.attributes["user"], created.attributes["user"]);
    }

    #[tokio::test]
    async fn monitor_plan_change_is_refused() {
        let server = Server::run();
        let provider = provider(&server);
        let from = State::existing(
            monitor().id,
            monitor()
                .with_attribute(
                    "plan",
                    block(&[
                        ("usage_type", "COMMITTED"),
                        ("billing_cycle", "MONTHLY"),
                        ("plan", "payg"),
                        ("effective_date", "2023-05-01T00:00:00Z"),
                    ]),
                )
                .with_attribute("monitoring_enabled", Value::Bool(true))
                .attributes,
        )
        .with_identifier(MONITOR);
        let to = monitor().with_attribute("plan", block(&[("plan", "commit")]));

        let err = provider
            .update(&to.id, MONITOR, &from, &to)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Changing plan requires replacing"));
    }

    #[tokio::test]
    async fn import_reads_the_remote_object() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", RG))
                .respond_with(json_encoded(json!({"id": RG, "name": "rg1", "location": "westeurope"}))),
        );

        let states = provider(&server)
            .import(&ResourceId::new("azurerm_resource_group", "test"), RG)
            .await
            .unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].attributes, group().attributes);
    }

    #[tokio::test]
    async fn import_of_missing_object_fails() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", RG)).respond_with(status_code(404)),
        );

        let err = provider(&server)
            .import(&ResourceId::new("azurerm_resource_group", "test"), RG)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("non-existent"));
    }

    #[tokio::test]
    async fn import_rejects_malformed_identifier() {
        let server = Server::run();
        let err = provider(&server)
            .import(&ResourceId::new("azurerm_dynatrace_tag_rules", "test"), RG)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("importing Tag Rule"));
    }
}
