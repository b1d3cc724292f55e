//! Expand (configuration to request) and flatten (response to configuration)
//! conversions for the Dynatrace resources.
//!
//! Single-item blocks: only the first element of each input list is used.

use std::collections::HashMap;
use std::str::FromStr;

use strata_core::resource::Value;

use super::models::{FilteringTag, LogRule, MetricRule, PlanData, UserInfo};
use super::sdk::UnknownVariant;
use super::sdk::{monitors, tagrules};
use crate::value::str_or_empty;

/// A configured value has no counterpart in the API
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("expanding `{field}`: {source}")]
pub struct ExpandError {
    pub field: &'static str,
    #[source]
    pub source: UnknownVariant,
}

/// Empty strings mean "not set"
fn parse_optional<T: FromStr<Err = UnknownVariant>>(
    field: &'static str,
    value: &str,
) -> Result<Option<T>, ExpandError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|source| ExpandError { field, source })
}

fn or_empty(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

pub fn expand_plan_data(input: &[PlanData]) -> Option<monitors::PlanData> {
    let v = input.first()?;

    Some(monitors::PlanData {
        billing_cycle: Some(v.billing_cycle.clone()),
        effective_date: None,
        plan_details: Some(v.plan_details.clone()),
        usage_type: Some(v.usage_type.clone()),
    })
}

pub fn expand_user_info(input: &[UserInfo]) -> Option<monitors::UserInfo> {
    let v = input.first()?;

    Some(monitors::UserInfo {
        country: Some(v.country.clone()),
        email_address: Some(v.email_address.clone()),
        first_name: Some(v.first_name.clone()),
        last_name: Some(v.last_name.clone()),
        phone_number: Some(v.phone_number.clone()),
    })
}

pub fn flatten_plan_data(input: Option<&monitors::PlanData>) -> Vec<PlanData> {
    let Some(input) = input else {
        return Vec::new();
    };

    vec![PlanData {
        billing_cycle: or_empty(input.billing_cycle.as_ref()),
        effective_date: or_empty(input.effective_date.as_ref()),
        plan_details: or_empty(input.plan_details.as_ref()),
        usage_type: or_empty(input.usage_type.as_ref()),
    }]
}

/// User info is never returned by the API, so it is flattened from the
/// previously configured `user` block list.
pub fn flatten_user_info(input: &[Value]) -> Vec<UserInfo> {
    let Some(first) = input.first() else {
        return Vec::new();
    };

    let empty = HashMap::new();
    let v = first.as_map().unwrap_or(&empty);
    vec![UserInfo {
        country: str_or_empty(v, "country"),
        email_address: str_or_empty(v, "email"),
        first_name: str_or_empty(v, "first_name"),
        last_name: str_or_empty(v, "last_name"),
        phone_number: str_or_empty(v, "phone_number"),
    }]
}

pub fn flatten_log_rules(input: Option<&tagrules::LogRules>) -> Vec<LogRule> {
    let Some(input) = input else {
        return Vec::new();
    };

    let status = |s: Option<tagrules::SendLogsStatus>| {
        s.map(|s| s.as_str().to_string()).unwrap_or_default()
    };

    vec![LogRule {
        filtering_tags: flatten_filtering_tags(input.filtering_tags.as_deref()),
        send_aad_logs: status(input.send_aad_logs),
        send_activity_logs: status(input.send_activity_logs),
        send_subscription_logs: status(input.send_subscription_logs),
    }]
}

pub fn flatten_filtering_tags(input: Option<&[tagrules::FilteringTag]>) -> Vec<FilteringTag> {
    let Some(v) = input.and_then(|tags| tags.first()) else {
        return Vec::new();
    };

    vec![FilteringTag {
        name: or_empty(v.name.as_ref()),
        value: or_empty(v.value.as_ref()),
        action: v.action.map(|a| a.as_str().to_string()).unwrap_or_default(),
    }]
}

pub fn flatten_metric_rules(input: Option<&tagrules::MetricRules>) -> Vec<MetricRule> {
    let Some(input) = input else {
        return Vec::new();
    };

    vec![MetricRule {
        filtering_tags: flatten_filtering_tags(input.filtering_tags.as_deref()),
    }]
}

pub fn expand_metric_rules(input: &[MetricRule]) -> Result<Option<tagrules::MetricRules>, ExpandError> {
    let Some(v) = input.first() else {
        return Ok(None);
    };

    Ok(Some(tagrules::MetricRules {
        filtering_tags: expand_filtering_tags(&v.filtering_tags)?,
    }))
}

pub fn expand_log_rules(input: &[LogRule]) -> Result<Option<tagrules::LogRules>, ExpandError> {
    let Some(v) = input.first() else {
        return Ok(None);
    };

    Ok(Some(tagrules::LogRules {
        filtering_tags: expand_filtering_tags(&v.filtering_tags)?,
        send_aad_logs: parse_optional("send_aad_logs", &v.send_aad_logs)?,
        send_activity_logs: parse_optional("send_activity_logs", &v.send_activity_logs)?,
        send_subscription_logs: parse_optional(
            "send_subscription_logs",
            &v.send_subscription_logs,
        )?,
    }))
}

pub fn expand_filtering_tags(
    input: &[FilteringTag],
) -> Result<Option<Vec<tagrules::FilteringTag>>, ExpandError> {
    let Some(v) = input.first() else {
        return Ok(None);
    };

    Ok(Some(vec![tagrules::FilteringTag {
        name: Some(v.name.clone()),
        value: Some(v.value.clone()),
        action: parse_optional("action", &v.action)?,
    }]))
}
