//! Strata Azure Resource Manager provider
//!
//! Resource adapters that translate Strata resources to Azure Resource
//! Manager requests.
//!
//! ## Module Structure
//!
//! - `services` - Resource types grouped by Azure service, each with its registration
//! - `registry` - Table of service registrations and handler lookup
//! - `provider` - AzureProvider implementation
//! - `handler` - Per-resource CRUD trait
//! - `client` - Resource Manager HTTP client
//! - `ids` - Typed Azure resource IDs
//! - `acceptance` - Fixtures and step runner for acceptance tests

pub mod acceptance;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod ids;
pub mod provider;
pub mod registry;
pub mod services;
pub mod value;

pub use config::AzureConfig;
pub use error::{AzureError, AzureResult};
pub use provider::AzureProvider;
pub use registry::Registry;
