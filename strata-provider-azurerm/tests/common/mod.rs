//! Configuration fixtures and existence checks for the Dynatrace resources

use async_trait::async_trait;
use serde_json::json;
use strata_core::resource::State;
use strata_provider_azurerm::acceptance::{ExistenceChecker, TestData, exists_by_id};
use strata_provider_azurerm::client::ArmClient;
use strata_provider_azurerm::ids::{MonitorId, TagRuleId};
use strata_provider_azurerm::services::dynatrace::sdk::API_VERSION;
use strata_provider_azurerm::services::dynatrace::sdk::monitors::MonitorResource;
use strata_provider_azurerm::services::dynatrace::sdk::tagrules::TagRule;

pub struct MonitorFixture;

impl MonitorFixture {
    pub fn basic(data: &TestData) -> String {
        json!({"resource": {
            "azurerm_resource_group": {"test": {
                "name": format!("acctestRG-dt-{}", data.random_integer),
                "location": data.locations.primary,
            }},
            "azurerm_dynatrace_monitor": {"test": {
                "name": format!("acctestacc{}", data.random_integer),
                "resource_group_name": "${azurerm_resource_group.test.name}",
                "location": "${azurerm_resource_group.test.location}",
                "monitoring_enabled": true,
                "marketplace_subscription": "Active",
                "identity": [{"type": "SystemAssigned"}],
                "user": [{
                    "first_name": "Alice",
                    "last_name": "Bobab",
                    "email": "alice@example.com",
                    "phone_number": "123456",
                    "country": "westus",
                }],
                "plan": [{
                    "usage_type": "COMMITTED",
                    "billing_cycle": "MONTHLY",
                    "plan": "azureportalintegration_privatepreview@TIDhjdtn7tfnxcy",
                }],
                "tags": {"environment": "Dev"},
            }},
        }})
        .to_string()
    }
}

pub struct TagRulesFixture;

impl TagRulesFixture {
    pub fn basic(data: &TestData) -> String {
        let filtering_tag = json!([{"name": "Environment", "value": "Prod", "action": "Include"}]);
        let tag_rules = json!({"resource": {"azurerm_dynatrace_tag_rules": {"test": {
            "name": "default",
            "monitor_id": "${azurerm_dynatrace_monitor.test.id}",
            "log_rule": [{
                "filtering_tag": filtering_tag,
                "send_aad_logs": "Enabled",
                "send_activity_logs": "Enabled",
            }],
            "metric_rule": [{"filtering_tag": filtering_tag}],
        }}}});
        format!("{}\n{}", MonitorFixture::basic(data), tag_rules)
    }

    pub fn requires_import(data: &TestData) -> String {
        let import = json!({"resource": {"azurerm_dynatrace_tag_rules": {"import": {
            "name": "${azurerm_dynatrace_tag_rules.test.name}",
            "monitor_id": "${azurerm_dynatrace_tag_rules.test.monitor_id}",
        }}}});
        format!("{}\n{}", Self::basic(data), import)
    }
}

pub struct MonitorChecker;

#[async_trait]
impl ExistenceChecker for MonitorChecker {
    async fn exists(&self, client: &ArmClient, state: &State) -> anyhow::Result<bool> {
        exists_by_id::<MonitorId, MonitorResource>(client, state, API_VERSION).await
    }
}

pub struct TagRulesChecker;

#[async_trait]
impl ExistenceChecker for TagRulesChecker {
    async fn exists(&self, client: &ArmClient, state: &State) -> anyhow::Result<bool> {
        exists_by_id::<TagRuleId, TagRule>(client, state, API_VERSION).await
    }
}
