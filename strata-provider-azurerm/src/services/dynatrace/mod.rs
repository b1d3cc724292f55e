//! Dynatrace.Observability service: monitors and their tag rules

pub mod helper;
pub mod models;
pub mod monitor_resource;
pub mod registration;
pub mod sdk;
pub mod tag_rules_resource;

pub use monitor_resource::MonitorsResource;
pub use registration::Registration;
pub use tag_rules_resource::TagRulesResource;
