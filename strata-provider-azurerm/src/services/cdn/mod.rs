//! Microsoft.Cdn Front Door service

pub mod custom_domain_association_import;
pub mod custom_domain_association_resource;
pub mod registration;
pub mod sdk;

pub use custom_domain_association_import::import_custom_domain_association;
pub use custom_domain_association_resource::CustomDomainAssociationResource;
pub use registration::Registration;
