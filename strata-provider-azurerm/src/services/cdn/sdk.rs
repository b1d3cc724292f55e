//! Wire types for the Microsoft.Cdn Front Door API (2021-06-01)

use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "2021-06-01";

/// Reference to another ARM resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Route {
    pub id: Option<String>,
    #[serde(default)]
    pub properties: RouteProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProperties {
    #[serde(default)]
    pub custom_domains: Vec<ResourceReference>,
}

/// PATCH body replacing the domains served by a route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteUpdate {
    pub properties: RouteUpdateProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUpdateProperties {
    pub custom_domains: Vec<ResourceReference>,
}

impl RouteUpdate {
    pub fn custom_domains(custom_domains: Vec<ResourceReference>) -> Self {
        Self {
            properties: RouteUpdateProperties { custom_domains },
        }
    }
}

/// Only presence matters for the custom domain itself
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomDomain {
    pub id: Option<String>,
    pub name: Option<String>,
}
