//! Step runner for acceptance tests
//!
//! Applies each configuration step through `AzureProvider`, runs its checks,
//! and destroys everything it created in reverse order once the steps are
//! done, whether they passed or not. Runs only when `TF_ACC` is set.

use std::collections::HashMap;

use anyhow::{Context, anyhow, bail};
use log::{info, warn};
use strata_core::differ::changed_attributes;
use strata_core::provider::Provider;
use strata_core::resource::{ResourceId, State};

use super::check::{Check, ExistenceChecker};
use super::data::TestData;
use super::document::{ConfigDocument, resolve_references};
use crate::provider::AzureProvider;

/// Environment variable that enables acceptance tests
pub const ACCEPTANCE_ENV: &str = "TF_ACC";

pub fn acceptance_enabled() -> bool {
    std::env::var(ACCEPTANCE_ENV).is_ok_and(|v| !v.is_empty())
}

pub enum TestStep {
    /// Apply the configuration, then run the checks against the resource under test
    Config { config: String, checks: Vec<Check> },
    /// Import the resource under test by identifier and compare with its state
    Import { ignore: Vec<String> },
    /// Applying the configuration must fail because a resource already exists
    RequiresImportError { config: String },
}

impl TestData {
    pub fn import_step(&self) -> TestStep {
        TestStep::Import { ignore: Vec::new() }
    }

    /// Import step that skips attributes the API never returns
    pub fn import_step_ignoring(&self, ignore: &[&str]) -> TestStep {
        TestStep::Import {
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn requires_import_error_step(&self, config: impl Fn(&TestData) -> String) -> TestStep {
        TestStep::RequiresImportError {
            config: config(self),
        }
    }

    /// Run the steps against a provider configured from the environment
    pub async fn resource_test(
        &self,
        checker: &dyn ExistenceChecker,
        steps: Vec<TestStep>,
    ) -> anyhow::Result<()> {
        if !acceptance_enabled() {
            warn!(
                "skipping acceptance test for {}: set {} to run it",
                self.resource_name, ACCEPTANCE_ENV
            );
            return Ok(());
        }

        let provider = AzureProvider::from_env().context("configuring the provider")?;
        ResourceTest::new(self, &provider, checker).run(steps).await
    }
}

/// Tracks what a test has applied so far
pub struct ResourceTest<'a> {
    data: &'a TestData,
    provider: &'a AzureProvider,
    checker: &'a dyn ExistenceChecker,
    /// Applied resources in creation order
    applied: Vec<(ResourceId, State)>,
}

impl<'a> ResourceTest<'a> {
    pub fn new(
        data: &'a TestData,
        provider: &'a AzureProvider,
        checker: &'a dyn ExistenceChecker,
    ) -> Self {
        Self {
            data,
            provider,
            checker,
            applied: Vec::new(),
        }
    }

    /// Run every step, then destroy; the first failure wins
    pub async fn run(mut self, steps: Vec<TestStep>) -> anyhow::Result<()> {
        let mut result = Ok(());
        for (i, step) in steps.iter().enumerate() {
            result = self.run_step(step).await.with_context(|| format!("step {}", i + 1));
            if result.is_err() {
                break;
            }
        }

        let destroyed = self.destroy().await;
        result.and(destroyed)
    }

    fn states(&self) -> HashMap<String, State> {
        self.applied
            .iter()
            .map(|(id, state)| (id.address(), state.clone()))
            .collect()
    }

    fn applied_state(&self, address: &str) -> Option<&State> {
        self.applied
            .iter()
            .find(|(id, _)| id.address() == address)
            .map(|(_, state)| state)
    }

    fn subject(&self) -> anyhow::Result<&State> {
        self.applied_state(&self.data.resource_name)
            .ok_or_else(|| anyhow!("{} has not been applied", self.data.resource_name))
    }

    async fn run_step(&mut self, step: &TestStep) -> anyhow::Result<()> {
        match step {
            TestStep::Config { config, checks } => {
                self.apply(config).await?;
                let state = self.subject()?.clone();
                for check in checks {
                    check
                        .run(self.provider.client(), self.checker, &state)
                        .await?;
                }
                Ok(())
            }
            TestStep::Import { ignore } => self.verify_import(ignore).await,
            TestStep::RequiresImportError { config } => self.expect_requires_import(config).await,
        }
    }

    /// Create new resources, update changed ones, destroy dropped ones
    async fn apply(&mut self, config: &str) -> anyhow::Result<()> {
        let document = ConfigDocument::parse(config)?;

        let dropped: Vec<ResourceId> = self
            .applied
            .iter()
            .filter(|(id, _)| document.get(&id.address()).is_none())
            .map(|(id, _)| id.clone())
            .collect();
        for id in dropped.iter().rev() {
            self.destroy_one(id).await?;
        }

        for resource in document.resources() {
            let resolved = resolve_references(resource, &self.states())?;
            let address = resource.id.address();

            let state = match self.applied_state(&address) {
                Some(current) => {
                    let identifier = current
                        .identifier
                        .clone()
                        .ok_or_else(|| anyhow!("{} has no identifier", address))?;
                    if self.provider.diff(&resolved, current)?.is_empty() {
                        continue;
                    }
                    let current = current.clone();
                    self.provider
                        .update(&resolved.id, &identifier, &current, &resolved)
                        .await?
                }
                None => {
                    let state = self.provider.create(&resolved).await?;
                    info!("applied {}", address);
                    state
                }
            };
            self.record(state);
        }
        Ok(())
    }

    fn record(&mut self, state: State) {
        match self.applied.iter_mut().find(|(id, _)| *id == state.id) {
            Some((_, current)) => *current = state,
            None => self.applied.push((state.id.clone(), state)),
        }
    }

    async fn verify_import(&self, ignore: &[String]) -> anyhow::Result<()> {
        let state = self.subject()?;
        let identifier = state
            .identifier
            .as_deref()
            .ok_or_else(|| anyhow!("{} has no identifier", state.id))?;

        let imported = self.provider.import(&state.id, identifier).await?;
        let imported = imported
            .into_iter()
            .find(|s| s.id == state.id)
            .ok_or_else(|| anyhow!("import of {} returned no state", identifier))?;

        let ignore: Vec<&str> = ignore.iter().map(String::as_str).collect();
        let mut differences = changed_attributes(&state.attributes, &imported.attributes, &ignore);
        differences.extend(changed_attributes(&imported.attributes, &state.attributes, &ignore));
        differences.sort();
        differences.dedup();
        if !differences.is_empty() {
            bail!(
                "imported {} differs from state in: {}",
                identifier,
                differences.join(", ")
            );
        }
        Ok(())
    }

    async fn expect_requires_import(&mut self, config: &str) -> anyhow::Result<()> {
        let document = ConfigDocument::parse(config)?;

        for resource in document.resources() {
            if self.applied_state(&resource.id.address()).is_some() {
                continue;
            }
            let resolved = resolve_references(resource, &self.states())?;
            match self.provider.create(&resolved).await {
                Err(e) if e.is_already_exists() => {
                    info!("{} correctly requires import", resource.id);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
                Ok(state) => {
                    self.record(state);
                }
            }
        }
        bail!("expected an \"already exists\" error, but every resource was created")
    }

    async fn destroy_one(&mut self, id: &ResourceId) -> anyhow::Result<()> {
        let Some(position) = self.applied.iter().position(|(applied, _)| applied == id) else {
            return Ok(());
        };
        let (id, state) = self.applied.remove(position);
        let identifier = state
            .identifier
            .clone()
            .ok_or_else(|| anyhow!("{} has no identifier", id))?;

        self.provider.delete(&id, &identifier, Some(&state)).await?;
        info!("destroyed {}", id);

        if id.address() == self.data.resource_name
            && self.checker.exists(self.provider.client(), &state).await?
        {
            bail!("{} still exists after destroy", id);
        }
        Ok(())
    }

    /// Destroy in reverse creation order, attempting every resource
    async fn destroy(&mut self) -> anyhow::Result<()> {
        let mut first_error = None;
        let ids: Vec<ResourceId> = self.applied.iter().rev().map(|(id, _)| id.clone()).collect();
        for id in ids {
            if let Err(e) = self.destroy_one(&id).await {
                warn!("destroying {}: {:#}", id, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptance::check::exists_by_id;
    use crate::client::ArmClient;
    use crate::config::AzureConfig;
    use crate::ids::ResourceGroupId;
    use async_trait::async_trait;
    use httptest::matchers::{json_decoded, request};
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};
    use serde_json::json;
    use strata_core::resource::Value;

    const RG: &str = "/subscriptions/sub/resourceGroups/acctestRG-1";

    struct GroupChecker;

    #[async_trait]
    impl ExistenceChecker for GroupChecker {
        async fn exists(&self, client: &ArmClient, state: &State) -> anyhow::Result<bool> {
            exists_by_id::<ResourceGroupId, serde_json::Value>(client, state, "2021-04-01").await
        }
    }

    fn data() -> TestData {
        let mut data = TestData::build("azurerm_resource_group", "test");
        data.random_integer = 1;
        data
    }

    fn config(_: &TestData) -> String {
        r#"{"resource": {"azurerm_resource_group": {"test": {
            "name": "acctestRG-1", "location": "westeurope"
        }}}}"#
            .to_string()
    }

    fn provider(server: &Server) -> AzureProvider {
        AzureProvider::new(
            AzureConfig::default()
                .with_subscription("sub")
                .with_endpoint(server.url_str("")),
        )
        .unwrap()
    }

    fn group() -> serde_json::Value {
        json!({"id": RG, "name": "acctestRG-1", "location": "westeurope"})
    }

    #[tokio::test]
    async fn config_import_and_destroy() {
        let server = Server::run();
        // create check, read back, exists check, import read, post-destroy check
        server.expect(
            Expectation::matching(request::method_path("GET", RG))
                .times(5)
                .respond_with(httptest::cycle![
                    status_code(404),
                    json_encoded(group()),
                    json_encoded(group()),
                    json_encoded(group()),
                    status_code(404),
                ]),
        );
        server.expect(
            Expectation::matching(request::method_path("PUT", RG))
                .respond_with(status_code(201).body("{}")),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", RG))
                .respond_with(status_code(200)),
        );

        let data = data();
        let provider = provider(&server);
        let steps = vec![
            TestStep::Config {
                config: config(&data),
                checks: vec![
                    Check::ExistsInAzure,
                    Check::attr("location", Value::string("westeurope")),
                ],
            },
            data.import_step(),
        ];
        ResourceTest::new(&data, &provider, &GroupChecker)
            .run(steps)
            .await
            .unwrap();
    }

    fn tagged_config(_: &TestData) -> String {
        r#"{"resource": {"azurerm_resource_group": {"test": {
            "name": "acctestRG-1", "location": "westeurope", "tags": {"env": "test"}
        }}}}"#
            .to_string()
    }

    #[tokio::test]
    async fn repeated_config_is_a_no_op_and_changes_update() {
        let server = Server::run();
        // create check, read back, read after patch, post-destroy check
        server.expect(
            Expectation::matching(request::method_path("GET", RG))
                .times(4)
                .respond_with(httptest::cycle![
                    status_code(404),
                    json_encoded(group()),
                    json_encoded(json!({
                        "id": RG, "name": "acctestRG-1", "location": "westeurope",
                        "tags": {"env": "test"}
                    })),
                    status_code(404),
                ]),
        );
        server.expect(
            Expectation::matching(request::method_path("PUT", RG))
                .times(1)
                .respond_with(status_code(201).body("{}")),
        );
        server.expect(
            Expectation::matching(httptest::all_of![
                request::method_path("PATCH", RG),
                request::body(json_decoded(|body: &serde_json::Value| {
                    body == &json!({"tags": {"env": "test"}})
                })),
            ])
            .times(1)
            .respond_with(status_code(200).body("{}")),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", RG))
                .respond_with(status_code(200)),
        );

        let data = data();
        let provider = provider(&server);
        let mut tags = std::collections::HashMap::new();
        tags.insert("env".to_string(), Value::string("test"));
        let steps = vec![
            TestStep::Config {
                config: config(&data),
                checks: vec![],
            },
            TestStep::Config {
                config: config(&data),
                checks: vec![],
            },
            TestStep::Config {
                config: tagged_config(&data),
                checks: vec![Check::attr("tags", Value::Map(tags))],
            },
        ];
        ResourceTest::new(&data, &provider, &GroupChecker)
            .run(steps)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn requires_import_error_when_create_succeeds_is_a_failure() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", RG))
                .times(3)
                .respond_with(httptest::cycle![
                    status_code(404),
                    json_encoded(group()),
                    status_code(404),
                ]),
        );
        server.expect(
            Expectation::matching(request::method_path("PUT", RG))
                .respond_with(status_code(201).body("{}")),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", RG))
                .respond_with(status_code(200)),
        );

        let data = data();
        let provider = provider(&server);
        let steps = vec![data.requires_import_error_step(config)];
        let err = ResourceTest::new(&data, &provider, &GroupChecker)
            .run(steps)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("already exists"));
    }
}
