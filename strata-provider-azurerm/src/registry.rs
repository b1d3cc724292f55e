//! Provider registry
//!
//! Collects every service registration and indexes their handlers by
//! resource type name.

use strata_core::provider::ResourceType;
use strata_core::registration::ServiceRegistration;

use crate::handler::ResourceHandler;
use crate::services::{cdn, dynatrace, resources};

/// A service registration that also supplies the CRUD handlers for its resources
pub trait HandlerRegistration: ServiceRegistration {
    fn handlers(&self) -> Vec<Box<dyn ResourceHandler>>;
}

/// All services, in registration order
pub fn registrations() -> Vec<Box<dyn HandlerRegistration>> {
    vec![
        Box::new(resources::Registration),
        Box::new(dynatrace::Registration),
        Box::new(cdn::Registration),
    ]
}

pub struct Registry {
    registrations: Vec<Box<dyn HandlerRegistration>>,
    handlers: Vec<Box<dyn ResourceHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        let registrations = registrations();
        let handlers = registrations.iter().flat_map(|r| r.handlers()).collect();
        Self {
            registrations,
            handlers,
        }
    }

    pub fn registrations(&self) -> &[Box<dyn HandlerRegistration>] {
        &self.registrations
    }

    /// Handler for a resource type name
    pub fn handler(&self, resource_type: &str) -> Option<&dyn ResourceHandler> {
        self.handlers
            .iter()
            .find(|h| h.name() == resource_type)
            .map(|h| &**h)
    }

    pub fn handlers(&self) -> &[Box<dyn ResourceHandler>] {
        &self.handlers
    }

    /// Resource type names, in registration order
    pub fn resource_type_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
