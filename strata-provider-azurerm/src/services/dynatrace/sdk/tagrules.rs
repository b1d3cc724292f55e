//! Tag rule wire types

use serde::{Deserialize, Serialize};

use super::string_enum;

string_enum!(
    /// Whether resources carrying the tag are included or excluded
    TagAction {
        Include => "Include",
        Exclude => "Exclude",
    }
);

string_enum!(
    /// Whether a log category is forwarded to Dynatrace
    SendLogsStatus {
        Enabled => "Enabled",
        Disabled => "Disabled",
    }
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: MonitoringTagRulesProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringTagRulesProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_rules: Option<LogRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_rules: Option<MetricRules>,
    /// Read-only
    #[serde(skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtering_tags: Option<Vec<FilteringTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_aad_logs: Option<SendLogsStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_activity_logs: Option<SendLogsStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_subscription_logs: Option<SendLogsStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtering_tags: Option<Vec<FilteringTag>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteringTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<TagAction>,
}
