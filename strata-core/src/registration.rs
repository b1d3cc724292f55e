//! Registration - Service-level tables of resource types
//!
//! A plugin host loads every registration a provider exposes and builds its
//! resource table from them.

use crate::provider::ResourceType;

/// A group of resource types belonging to one vendor service
pub trait ServiceRegistration: Send + Sync {
    /// Display name of the service (e.g., "Dynatrace")
    fn name(&self) -> &'static str;

    /// Issue-tracker label for the service, if one exists
    fn associated_github_label(&self) -> Option<&'static str> {
        None
    }

    /// Documentation categories the service is listed under
    fn website_categories(&self) -> Vec<&'static str>;

    /// Read-only data sources
    fn data_sources(&self) -> Vec<Box<dyn ResourceType>>;

    /// Managed resources
    fn resources(&self) -> Vec<Box<dyn ResourceType>>;
}

/// Names of all resource types across registrations, in registration order
pub fn resource_type_names(registrations: &[Box<dyn ServiceRegistration>]) -> Vec<&'static str> {
    registrations
        .iter()
        .flat_map(|r| r.resources())
        .map(|t| t.name())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    impl ResourceType for Widget {
        fn name(&self) -> &'static str {
            "widget"
        }
    }

    struct WidgetService;

    impl ServiceRegistration for WidgetService {
        fn name(&self) -> &'static str {
            "Widgets"
        }

        fn website_categories(&self) -> Vec<&'static str> {
            vec!["Widgets"]
        }

        fn data_sources(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn resources(&self) -> Vec<Box<dyn ResourceType>> {
            vec![Box::new(Widget)]
        }
    }

    #[test]
    fn label_defaults_to_none() {
        assert_eq!(WidgetService.associated_github_label(), None);
    }

    #[test]
    fn collects_resource_names() {
        let registrations: Vec<Box<dyn ServiceRegistration>> = vec![Box::new(WidgetService)];
        assert_eq!(resource_type_names(&registrations), vec!["widget"]);
    }
}
