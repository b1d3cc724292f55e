//! Per-resource-type CRUD callbacks
//!
//! Each managed resource type implements `ResourceHandler`. The provider
//! validates attributes against the schema and applies defaults before a
//! handler is invoked; handlers only translate and call the API.

use async_trait::async_trait;
use strata_core::provider::{ProviderError, ProviderResult, ResourceType};
use strata_core::resource::{Resource, ResourceId, State};

use crate::client::ArmClient;
use crate::ids::ArmId;

#[async_trait]
pub trait ResourceHandler: ResourceType {
    /// Read the remote object; `State::not_found` when it is gone
    async fn read(
        &self,
        client: &ArmClient,
        id: &ResourceId,
        identifier: &str,
        prior: Option<&State>,
    ) -> ProviderResult<State>;

    /// Create the remote object, failing with an already-exists error when present
    async fn create(&self, client: &ArmClient, resource: &Resource) -> ProviderResult<State>;

    async fn update(
        &self,
        client: &ArmClient,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State>;

    async fn delete(
        &self,
        client: &ArmClient,
        id: &ResourceId,
        identifier: &str,
        prior: Option<&State>,
    ) -> ProviderResult<()>;
}

/// Importer that only accepts identifiers parsing as `T`
pub fn validate_import_id<T: ArmId>(state: State) -> ProviderResult<Vec<State>> {
    let identifier = state.identifier.as_deref().ok_or_else(|| {
        ProviderError::new("an identifier is required to import").for_resource(state.id.clone())
    })?;
    T::parse(identifier).map_err(|e| {
        ProviderError::new(format!("importing {}", T::KIND))
            .for_resource(state.id.clone())
            .with_cause(e)
    })?;
    Ok(vec![state])
}
