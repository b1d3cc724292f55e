use strata_core::provider::ResourceType;
use strata_core::registration::ServiceRegistration;

use super::monitor_resource::MonitorsResource;
use super::tag_rules_resource::TagRulesResource;
use crate::handler::ResourceHandler;
use crate::registry::HandlerRegistration;

pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "Dynatrace"
    }

    fn associated_github_label(&self) -> Option<&'static str> {
        Some("service/dynatrace")
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Dynatrace"]
    }

    fn data_sources(&self) -> Vec<Box<dyn ResourceType>> {
        vec![]
    }

    fn resources(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(MonitorsResource), Box::new(TagRulesResource)]
    }
}

impl HandlerRegistration for Registration {
    fn handlers(&self) -> Vec<Box<dyn ResourceHandler>> {
        vec![Box::new(MonitorsResource), Box::new(TagRulesResource)]
    }
}
