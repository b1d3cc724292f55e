//! Configuration documents for acceptance tests
//!
//! A document is Terraform-style JSON:
//!
//! ```json
//! {"resource": {"azurerm_dynatrace_tag_rules": {"test": {
//!     "name": "default",
//!     "monitor_id": "${azurerm_dynatrace_monitor.test.id}",
//!     "log_rule": [{"send_aad_logs": "Enabled"}]
//! }}}}
//! ```
//!
//! Nested blocks are written as arrays of objects; plain objects are maps
//! (e.g., `tags`). Several top-level objects may follow each other in one
//! text, so a fixture can embed another fixture's output verbatim.

use std::collections::{HashMap, HashSet};

use strata_core::resource::{Resource, State, Value};
use thiserror::Error;

use crate::value::json_to_value;

#[derive(Debug, Error)]
pub enum ConfigDocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    Shape(String),

    #[error("resource {0} is declared more than once")]
    Duplicate(String),

    #[error("{resource} references undeclared resource {address}")]
    UnknownReference { resource: String, address: String },

    #[error("dependency cycle through {0}")]
    Cycle(String),

    #[error("{resource}: cannot resolve ${{{address}.{attribute}}}")]
    Unresolved {
        resource: String,
        address: String,
        attribute: String,
    },
}

/// Parsed configuration, resources in dependency order
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    resources: Vec<Resource>,
}

impl ConfigDocument {
    pub fn parse(text: &str) -> Result<Self, ConfigDocumentError> {
        let mut declared = Vec::new();
        let mut seen = HashSet::new();

        for part in serde_json::Deserializer::from_str(text).into_iter::<serde_json::Value>() {
            for resource in parse_part(&part?)? {
                let address = resource.id.address();
                if !seen.insert(address.clone()) {
                    return Err(ConfigDocumentError::Duplicate(address));
                }
                declared.push(resource);
            }
        }

        Ok(Self {
            resources: sort_by_dependencies(&declared)?,
        })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, address: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id.address() == address)
    }
}

fn parse_part(part: &serde_json::Value) -> Result<Vec<Resource>, ConfigDocumentError> {
    let shape = |message: &str| ConfigDocumentError::Shape(message.to_string());

    let root = part.as_object().ok_or_else(|| shape("expected a JSON object"))?;
    let Some(types) = root.get("resource") else {
        return Ok(Vec::new());
    };
    let types = types
        .as_object()
        .ok_or_else(|| shape("\"resource\" must be an object keyed by resource type"))?;

    let mut resources = Vec::new();
    for (resource_type, labels) in types {
        let labels = labels
            .as_object()
            .ok_or_else(|| shape("resources must be objects keyed by label"))?;
        for (label, body) in labels {
            let converted = json_to_value(body).map_err(|e| {
                ConfigDocumentError::Shape(format!("{}.{}: {}", resource_type, label, e))
            })?;
            let Some(Value::Map(attributes)) = converted else {
                return Err(ConfigDocumentError::Shape(format!(
                    "{}.{} must be an object",
                    resource_type, label
                )));
            };
            resources.push(Resource {
                id: strata_core::resource::ResourceId::new(resource_type, label),
                attributes,
            });
        }
    }
    Ok(resources)
}

/// Order resources so that every resource follows the ones it references
fn sort_by_dependencies(resources: &[Resource]) -> Result<Vec<Resource>, ConfigDocumentError> {
    let by_address: HashMap<String, &Resource> =
        resources.iter().map(|r| (r.id.address(), r)).collect();

    let mut sorted = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut visiting: HashSet<String> = HashSet::new();

    fn visit(
        resource: &Resource,
        by_address: &HashMap<String, &Resource>,
        visited: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
        sorted: &mut Vec<Resource>,
    ) -> Result<(), ConfigDocumentError> {
        let address = resource.id.address();
        if visited.contains(&address) {
            return Ok(());
        }
        if !visiting.insert(address.clone()) {
            return Err(ConfigDocumentError::Cycle(address));
        }

        for dep in resource.dependencies() {
            let dep_resource =
                by_address
                    .get(&dep)
                    .ok_or_else(|| ConfigDocumentError::UnknownReference {
                        resource: address.clone(),
                        address: dep.clone(),
                    })?;
            visit(dep_resource, by_address, visited, visiting, sorted)?;
        }

        visiting.remove(&address);
        visited.insert(address);
        sorted.push(resource.clone());
        Ok(())
    }

    for resource in resources {
        visit(resource, &by_address, &mut visited, &mut visiting, &mut sorted)?;
    }
    Ok(sorted)
}

/// Replace references with attributes of already applied resources
///
/// `states` is keyed by address; `id` resolves to the remote identifier.
pub fn resolve_references(
    resource: &Resource,
    states: &HashMap<String, State>,
) -> Result<Resource, ConfigDocumentError> {
    let address = resource.id.address();
    let mut resolved = resource.clone();
    for value in resolved.attributes.values_mut() {
        resolve_value(value, &address, states)?;
    }
    Ok(resolved)
}

fn resolve_value(
    value: &mut Value,
    resource: &str,
    states: &HashMap<String, State>,
) -> Result<(), ConfigDocumentError> {
    match value {
        Value::ResourceRef(address, attribute) => {
            let resolved = states
                .get(address.as_str())
                .and_then(|state| state.attribute(attribute))
                .ok_or_else(|| ConfigDocumentError::Unresolved {
                    resource: resource.to_string(),
                    address: address.clone(),
                    attribute: attribute.clone(),
                })?;
            *value = resolved;
        }
        Value::List(items) => {
            for item in items {
                resolve_value(item, resource, states)?;
            }
        }
        Value::Map(map) => {
            for item in map.values_mut() {
                resolve_value(item, resource, states)?;
            }
        }
        _ => {}
    }
    Ok(())
}
