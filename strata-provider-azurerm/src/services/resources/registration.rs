use strata_core::provider::ResourceType;
use strata_core::registration::ServiceRegistration;

use super::resource_group_resource::ResourceGroupResource;
use crate::handler::ResourceHandler;
use crate::registry::HandlerRegistration;

pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "Resources"
    }

    fn associated_github_label(&self) -> Option<&'static str> {
        Some("service/resources")
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Base"]
    }

    fn data_sources(&self) -> Vec<Box<dyn ResourceType>> {
        vec![]
    }

    fn resources(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(ResourceGroupResource)]
    }
}

impl HandlerRegistration for Registration {
    fn handlers(&self) -> Vec<Box<dyn ResourceHandler>> {
        vec![Box::new(ResourceGroupResource)]
    }
}
