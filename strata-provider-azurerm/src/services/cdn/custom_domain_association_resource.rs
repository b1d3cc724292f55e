//! azurerm_cdn_frontdoor_custom_domain_association
//!
//! Links a Front Door custom domain into the `customDomains` of each listed
//! route. The association has no ARM object of its own; its ID is derived
//! from the custom domain.

use std::collections::HashMap;

use async_trait::async_trait;
use log::{info, warn};
use strata_core::provider::{Importer, ProviderError, ProviderResult, ResourceType};
use strata_core::resource::{Resource, ResourceId, State, Value};
use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::custom_domain_association_import::import_custom_domain_association;
use super::sdk::{API_VERSION, CustomDomain, ResourceReference, Route, RouteUpdate};
use crate::client::ArmClient;
use crate::error::{AzureError, AzureResult};
use crate::handler::ResourceHandler;
use crate::ids::{ArmId, CustomDomainAssociationId, CustomDomainId, RouteId};
use crate::value::{require_str, string_list};

pub const RESOURCE_TYPE: &str = "azurerm_cdn_frontdoor_custom_domain_association";

pub struct CustomDomainAssociationResource;

fn id_type<T: ArmId>(name: &str) -> AttributeType {
    AttributeType::Custom {
        name: name.to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => T::parse(s).map(|_| ()).map_err(|e| e.to_string()),
            _ => Err("Expected string".to_string()),
        },
    }
}

impl ResourceType for CustomDomainAssociationResource {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description("Routes serving a Front Door custom domain")
            .attribute(
                AttributeSchema::new(
                    "cdn_frontdoor_custom_domain_id",
                    id_type::<CustomDomainId>("CustomDomainId"),
                )
                .required()
                .force_new(),
            )
            .attribute(
                AttributeSchema::new(
                    "cdn_frontdoor_route_ids",
                    AttributeType::List(Box::new(id_type::<RouteId>("RouteId"))),
                )
                .required(),
            )
    }

    fn importer(&self) -> Importer {
        import_custom_domain_association()
    }
}

fn same_id(a: &str, b: &str) -> bool {
    a.trim_end_matches('/').eq_ignore_ascii_case(b.trim_end_matches('/'))
}

fn route_ids(attrs: &HashMap<String, Value>) -> AzureResult<Vec<RouteId>> {
    string_list(attrs, "cdn_frontdoor_route_ids")
        .iter()
        .map(|id| RouteId::parse(id).map_err(AzureError::from))
        .collect()
}

/// Whether `route` currently serves `domain`; `None` when the route is gone
async fn route_links(
    client: &ArmClient,
    route: &RouteId,
    domain: &CustomDomainId,
) -> AzureResult<Option<bool>> {
    let route = client
        .get_optional::<Route>(&route.to_string(), API_VERSION)
        .await?;
    let domain = domain.to_string();
    Ok(route.map(|r| {
        r.properties
            .custom_domains
            .iter()
            .any(|d| same_id(&d.id, &domain))
    }))
}

/// Add or remove `domain` from the domains a route serves
async fn set_link(
    client: &ArmClient,
    route: &RouteId,
    domain: &CustomDomainId,
    linked: bool,
) -> AzureResult<()> {
    let path = route.to_string();
    let Some(current) = client.get_optional::<Route>(&path, API_VERSION).await? else {
        if linked {
            return Err(AzureError::invalid_attribute(
                "cdn_frontdoor_route_ids",
                format!("{} was not found", route),
            ));
        }
        return Ok(());
    };

    let domain_id = domain.to_string();
    let mut domains: Vec<ResourceReference> = current
        .properties
        .custom_domains
        .into_iter()
        .filter(|d| !same_id(&d.id, &domain_id))
        .collect();
    if linked {
        domains.push(ResourceReference { id: domain_id });
    }

    client
        .patch(&path, API_VERSION, &RouteUpdate::custom_domains(domains))
        .await
}

impl CustomDomainAssociationResource {
    async fn link_all(
        &self,
        client: &ArmClient,
        domain: &CustomDomainId,
        routes: &[RouteId],
        linked: bool,
    ) -> ProviderResult<()> {
        let action = if linked { "linking" } else { "unlinking" };
        for route in routes {
            set_link(client, route, domain, linked)
                .await
                .map_err(|e| e.into_provider_error(format!("{} {} to {}", action, domain, route)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for CustomDomainAssociationResource {
    async fn read(
        &self,
        client: &ArmClient,
        id: &ResourceId,
        identifier: &str,
        prior: Option<&State>,
    ) -> ProviderResult<State> {
        let association = CustomDomainAssociationId::parse(identifier).map_err(AzureError::from)?;
        let domain = association.custom_domain_id();

        let existing = client
            .get_optional::<CustomDomain>(&domain.to_string(), API_VERSION)
            .await
            .map_err(|e| e.into_provider_error(format!("retrieving {}", domain)))?;
        if existing.is_none() {
            return Ok(State::not_found(id.clone()));
        }

        // Routes cannot be looked up from the domain, so only the known ones are checked
        let known = match prior {
            Some(prior) => route_ids(&prior.attributes)?,
            None => Vec::new(),
        };
        let mut linked = Vec::new();
        for route in &known {
            let links = route_links(client, route, &domain)
                .await
                .map_err(|e| e.into_provider_error(format!("retrieving {}", route)))?;
            if links == Some(true) {
                linked.push(Value::string(route.to_string()));
            }
        }

        let mut attributes = HashMap::new();
        attributes.insert(
            "cdn_frontdoor_custom_domain_id".to_string(),
            Value::string(domain.to_string()),
        );
        attributes.insert("cdn_frontdoor_route_ids".to_string(), Value::List(linked));

        Ok(State::existing(id.clone(), attributes).with_identifier(association.to_string()))
    }

    async fn create(&self, client: &ArmClient, resource: &Resource) -> ProviderResult<State> {
        let attrs = &resource.attributes;
        let domain = CustomDomainId::parse(require_str(attrs, "cdn_frontdoor_custom_domain_id")?)
            .map_err(AzureError::from)?;
        let routes = route_ids(attrs)?;
        let association = CustomDomainAssociationId::from_custom_domain(&domain);

        for route in &routes {
            let links = route_links(client, route, &domain)
                .await
                .map_err(|e| e.into_provider_error(format!("retrieving {}", route)))?;
            if links == Some(true) {
                return Err(ProviderError::already_exists(
                    RESOURCE_TYPE,
                    association.to_string(),
                ));
            }
        }

        self.link_all(client, &domain, &routes, true).await?;
        info!("created {}", association);

        let desired = State::existing(resource.id.clone(), attrs.clone());
        self.read(client, &resource.id, &association.to_string(), Some(&desired))
            .await
    }

    async fn update(
        &self,
        client: &ArmClient,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let association = CustomDomainAssociationId::parse(identifier).map_err(AzureError::from)?;
        let domain = association.custom_domain_id();

        let current = route_ids(&from.attributes)?;
        let desired = route_ids(&to.attributes)?;
        let removed: Vec<RouteId> = current
            .iter()
            .filter(|r| !desired.contains(r))
            .cloned()
            .collect();

        self.link_all(client, &domain, &removed, false).await?;
        self.link_all(client, &domain, &desired, true).await?;

        let desired_state = State::existing(to.id.clone(), to.attributes.clone());
        self.read(client, &to.id, identifier, Some(&desired_state))
            .await
    }

    async fn delete(
        &self,
        client: &ArmClient,
        id: &ResourceId,
        identifier: &str,
        prior: Option<&State>,
    ) -> ProviderResult<()> {
        let association = CustomDomainAssociationId::parse(identifier).map_err(AzureError::from)?;
        let domain = association.custom_domain_id();

        let Some(prior) = prior else {
            warn!("{}: no routes known for {}, nothing to unlink", id, association);
            return Ok(());
        };
        let routes = route_ids(&prior.attributes)?;
        self.link_all(client, &domain, &routes, false).await?;
        info!("deleted {}", association);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AzureConfig;
    use httptest::matchers::{json_decoded, request};
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};
    use serde_json::json;

    const DOMAIN: &str =
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p1/customDomains/www";
    const ROUTE: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p1/afdEndpoints/e1/routes/r1";
    const OLD_ROUTE: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p1/afdEndpoints/e1/routes/r2";
    const ASSOCIATION: &str =
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p1/associations/www";

    fn client(server: &Server) -> ArmClient {
        ArmClient::new(
            AzureConfig::default()
                .with_subscription("sub")
                .with_endpoint(server.url_str("")),
        )
        .unwrap()
    }

    fn desired() -> Resource {
        Resource::new(RESOURCE_TYPE, "test")
            .with_attribute("cdn_frontdoor_custom_domain_id", Value::string(DOMAIN))
            .with_attribute(
                "cdn_frontdoor_route_ids",
                Value::List(vec![Value::string(ROUTE)]),
            )
    }

    fn route(domains: &[&str]) -> serde_json::Value {
        let domains: Vec<_> = domains.iter().map(|d| json!({"id": d})).collect();
        json!({"id": ROUTE, "properties": {"customDomains": domains}})
    }

    #[test]
    fn schema_validates_ids() {
        let schema = CustomDomainAssociationResource.schema();
        assert!(schema.validate(&desired().attributes).is_ok());

        let attrs = desired()
            .with_attribute(
                "cdn_frontdoor_route_ids",
                Value::List(vec![Value::string(DOMAIN)]),
            )
            .attributes;
        assert!(schema.validate(&attrs).is_err());
    }

    #[test]
    fn ids_compare_case_insensitively() {
        assert!(same_id(DOMAIN, &DOMAIN.to_lowercase()));
        assert!(!same_id(DOMAIN, ROUTE));
    }

    #[tokio::test]
    async fn create_links_domain_into_route() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", ROUTE))
                .times(3)
                .respond_with(httptest::cycle![
                    json_encoded(route(&["/other"])),
                    json_encoded(route(&["/other"])),
                    json_encoded(route(&["/other", DOMAIN])),
                ]),
        );
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("PATCH", ROUTE),
                request::body(json_decoded(|body: &serde_json::Value| {
                    body == &json!({"properties": {"customDomains": [{"id": "/other"}, {"id": DOMAIN}]}})
                })),
            ])
            .respond_with(status_code(200).body("{}")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", DOMAIN))
                .respond_with(json_encoded(json!({"id": DOMAIN, "name": "www"}))),
        );

        let state = CustomDomainAssociationResource
            .create(&client(&server), &desired())
            .await
            .unwrap();
        assert_eq!(state.identifier.as_deref(), Some(ASSOCIATION));
        assert_eq!(
            state.attributes["cdn_frontdoor_route_ids"],
            Value::List(vec![Value::string(ROUTE)])
        );
    }

    #[tokio::test]
    async fn create_rejects_existing_link() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", ROUTE))
                .respond_with(json_encoded(route(&[DOMAIN]))),
        );

        let err = CustomDomainAssociationResource
            .create(&client(&server), &desired())
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(err.existing_identifier.as_deref(), Some(ASSOCIATION));
    }

    #[tokio::test]
    async fn read_without_domain_is_not_found() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", DOMAIN)).respond_with(status_code(404)),
        );

        let id = ResourceId::new(RESOURCE_TYPE, "test");
        let state = CustomDomainAssociationResource
            .read(&client(&server), &id, ASSOCIATION, None)
            .await
            .unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn delete_unlinks_known_routes() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", ROUTE))
                .respond_with(json_encoded(route(&[DOMAIN]))),
        );
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("PATCH", ROUTE),
                request::body(json_decoded(|body: &serde_json::Value| {
                    body == &json!({"properties": {"customDomains": []}})
                })),
            ])
            .respond_with(status_code(200).body("{}")),
        );

        let id = ResourceId::new(RESOURCE_TYPE, "test");
        let prior = State::existing(id.clone(), desired().attributes).with_identifier(ASSOCIATION);
        CustomDomainAssociationResource
            .delete(&client(&server), &id, ASSOCIATION, Some(&prior))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_moves_domain_between_routes() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", OLD_ROUTE))
                .respond_with(json_encoded(json!({
                    "id": OLD_ROUTE,
                    "properties": {"customDomains": [{"id": DOMAIN}, {"id": "/kept"}]}
                }))),
        );
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("PATCH", OLD_ROUTE),
                request::body(json_decoded(|body: &serde_json::Value| {
                    body == &json!({"properties": {"customDomains": [{"id": "/kept"}]}})
                })),
            ])
            .respond_with(status_code(200).body("{}")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", ROUTE))
                .times(2)
                .respond_with(httptest::cycle![
                    json_encoded(route(&["/other"])),
                    json_encoded(route(&["/other", DOMAIN])),
                ]),
        );
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("PATCH", ROUTE),
                request::body(json_decoded(|body: &serde_json::Value| {
                    body == &json!({"properties": {"customDomains": [{"id": "/other"}, {"id": DOMAIN}]}})
                })),
            ])
            .respond_with(status_code(200).body("{}")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", DOMAIN))
                .respond_with(json_encoded(json!({"id": DOMAIN, "name": "www"}))),
        );

        let id = ResourceId::new(RESOURCE_TYPE, "test");
        let mut prior_attrs = desired().attributes;
        prior_attrs.insert(
            "cdn_frontdoor_route_ids".to_string(),
            Value::List(vec![Value::string(OLD_ROUTE)]),
        );
        let prior = State::existing(id, prior_attrs).with_identifier(ASSOCIATION);

        let state = CustomDomainAssociationResource
            .update(&client(&server), ASSOCIATION, &prior, &desired())
            .await
            .unwrap();
        assert_eq!(
            state.attributes["cdn_frontdoor_route_ids"],
            Value::List(vec![Value::string(ROUTE)])
        );
    }
}
