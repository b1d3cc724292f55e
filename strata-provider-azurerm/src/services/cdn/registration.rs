use strata_core::provider::ResourceType;
use strata_core::registration::ServiceRegistration;

use super::custom_domain_association_resource::CustomDomainAssociationResource;
use crate::handler::ResourceHandler;
use crate::registry::HandlerRegistration;

pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "CDN"
    }

    fn associated_github_label(&self) -> Option<&'static str> {
        Some("service/cdn")
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["CDN"]
    }

    fn data_sources(&self) -> Vec<Box<dyn ResourceType>> {
        vec![]
    }

    fn resources(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(CustomDomainAssociationResource)]
    }
}

impl HandlerRegistration for Registration {
    fn handlers(&self) -> Vec<Box<dyn ResourceHandler>> {
        vec![Box::new(CustomDomainAssociationResource)]
    }
}
