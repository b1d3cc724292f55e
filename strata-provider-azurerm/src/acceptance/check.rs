//! Post-apply checks

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use strata_core::resource::{State, Value};

use crate::client::ArmClient;
use crate::ids::ArmId;

/// Asks the remote API whether the object behind a state still exists
#[async_trait]
pub trait ExistenceChecker: Send + Sync {
    async fn exists(&self, client: &ArmClient, state: &State) -> anyhow::Result<bool>;
}

/// Parse the state identifier as `T` and GET it
///
/// 404 means the object is gone; any other failure is an error.
pub async fn exists_by_id<T, B>(
    client: &ArmClient,
    state: &State,
    api_version: &str,
) -> anyhow::Result<bool>
where
    T: ArmId,
    B: DeserializeOwned,
{
    let identifier = state
        .identifier
        .as_deref()
        .ok_or_else(|| anyhow!("{} has no identifier", state.id))?;
    let id = T::parse(identifier)?;

    match client.get::<B>(&id.to_string(), api_version).await {
        Ok(_) => Ok(true),
        Err(e) if e.was_not_found() => Ok(false),
        Err(e) => Err(e).with_context(|| format!("retrieving {}", id)),
    }
}

/// A single assertion run after a configuration step
pub enum Check {
    /// The resource under test exists remotely
    ExistsInAzure,
    /// An attribute of the resource under test equals the value
    Attribute { name: String, expected: Value },
    /// An attribute of the resource under test is set
    AttributeSet { name: String },
}

impl Check {
    pub fn attr(name: impl Into<String>, expected: Value) -> Self {
        Check::Attribute {
            name: name.into(),
            expected,
        }
    }

    pub fn attr_set(name: impl Into<String>) -> Self {
        Check::AttributeSet { name: name.into() }
    }

    pub(crate) async fn run(
        &self,
        client: &ArmClient,
        checker: &dyn ExistenceChecker,
        state: &State,
    ) -> anyhow::Result<()> {
        match self {
            Check::ExistsInAzure => {
                if !checker.exists(client, state).await? {
                    anyhow::bail!("{} does not exist", state.id);
                }
            }
            Check::Attribute { name, expected } => {
                let actual = state.attribute(name);
                if actual.as_ref() != Some(expected) {
                    anyhow::bail!(
                        "{}: attribute {} is {:?}, expected {:?}",
                        state.id,
                        name,
                        actual,
                        expected
                    );
                }
            }
            Check::AttributeSet { name } => {
                if state.attribute(name).is_none() {
                    anyhow::bail!("{}: attribute {} is not set", state.id, name);
                }
            }
        }
        Ok(())
    }
}
