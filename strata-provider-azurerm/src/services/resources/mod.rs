//! Microsoft.Resources service

pub mod registration;
pub mod resource_group_resource;

pub use registration::Registration;
pub use resource_group_resource::ResourceGroupResource;
