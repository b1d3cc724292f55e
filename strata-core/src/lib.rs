//! Strata Core
//!
//! Resource model, attribute schemas and the traits providers implement to
//! plug resource types into a provisioning host.

pub mod differ;
pub mod provider;
pub mod registration;
pub mod resource;
pub mod schema;
