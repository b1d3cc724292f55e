//! Flat, user-facing models for the Dynatrace resources
//!
//! Each nested configuration block is a single-item list of these; string
//! fields default to empty when the block omits them.

use std::collections::HashMap;

use strata_core::resource::Value;

use crate::value::{blocks, str_or_empty};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanData {
    pub billing_cycle: String,
    pub effective_date: String,
    pub plan_details: String,
    pub usage_type: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInfo {
    pub country: String,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRule {
    pub filtering_tags: Vec<FilteringTag>,
    pub send_aad_logs: String,
    pub send_activity_logs: String,
    pub send_subscription_logs: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRule {
    pub filtering_tags: Vec<FilteringTag>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteringTag {
    pub name: String,
    pub value: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityProperties {
    pub identity_type: String,
}

fn map(entries: Vec<(&str, Value)>) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

/// Convert a list of models into a block list value
pub fn to_blocks<T>(items: &[T], to_value: fn(&T) -> Value) -> Value {
    Value::List(items.iter().map(to_value).collect())
}

impl PlanData {
    pub fn from_attributes(attrs: &HashMap<String, Value>) -> Self {
        Self {
            billing_cycle: str_or_empty(attrs, "billing_cycle"),
            effective_date: str_or_empty(attrs, "effective_date"),
            plan_details: str_or_empty(attrs, "plan"),
            usage_type: str_or_empty(attrs, "usage_type"),
        }
    }

    pub fn to_value(&self) -> Value {
        map(vec![
            ("billing_cycle", Value::string(&self.billing_cycle)),
            ("effective_date", Value::string(&self.effective_date)),
            ("plan", Value::string(&self.plan_details)),
            ("usage_type", Value::string(&self.usage_type)),
        ])
    }
}

impl UserInfo {
    pub fn from_attributes(attrs: &HashMap<String, Value>) -> Self {
        Self {
            country: str_or_empty(attrs, "country"),
            email_address: str_or_empty(attrs, "email"),
            first_name: str_or_empty(attrs, "first_name"),
            last_name: str_or_empty(attrs, "last_name"),
            phone_number: str_or_empty(attrs, "phone_number"),
        }
    }

    pub fn to_value(&self) -> Value {
        map(vec![
            ("country", Value::string(&self.country)),
            ("email", Value::string(&self.email_address)),
            ("first_name", Value::string(&self.first_name)),
            ("last_name", Value::string(&self.last_name)),
            ("phone_number", Value::string(&self.phone_number)),
        ])
    }
}

impl FilteringTag {
    pub fn from_attributes(attrs: &HashMap<String, Value>) -> Self {
        Self {
            name: str_or_empty(attrs, "name"),
            value: str_or_empty(attrs, "value"),
            action: str_or_empty(attrs, "action"),
        }
    }

    pub fn to_value(&self) -> Value {
        map(vec![
            ("name", Value::string(&self.name)),
            ("value", Value::string(&self.value)),
            ("action", Value::string(&self.action)),
        ])
    }
}

fn filtering_tags_from(attrs: &HashMap<String, Value>) -> Vec<FilteringTag> {
    blocks(attrs, "filtering_tag")
        .into_iter()
        .map(FilteringTag::from_attributes)
        .collect()
}

impl LogRule {
    pub fn from_attributes(attrs: &HashMap<String, Value>) -> Self {
        Self {
            filtering_tags: filtering_tags_from(attrs),
            send_aad_logs: str_or_empty(attrs, "send_aad_logs"),
            send_activity_logs: str_or_empty(attrs, "send_activity_logs"),
            send_subscription_logs: str_or_empty(attrs, "send_subscription_logs"),
        }
    }

    /// Empty statuses are left out so read-back matches what was configured
    pub fn to_value(&self) -> Value {
        let mut entries = vec![(
            "filtering_tag",
            to_blocks(&self.filtering_tags, FilteringTag::to_value),
        )];
        for (key, status) in [
            ("send_aad_logs", &self.send_aad_logs),
            ("send_activity_logs", &self.send_activity_logs),
            ("send_subscription_logs", &self.send_subscription_logs),
        ] {
            if !status.is_empty() {
                entries.push((key, Value::string(status)));
            }
        }
        map(entries)
    }
}

impl MetricRule {
    pub fn from_attributes(attrs: &HashMap<String, Value>) -> Self {
        Self {
            filtering_tags: filtering_tags_from(attrs),
        }
    }

    pub fn to_value(&self) -> Value {
        map(vec![(
            "filtering_tag",
            to_blocks(&self.filtering_tags, FilteringTag::to_value),
        )])
    }
}

impl IdentityProperties {
    pub fn from_attributes(attrs: &HashMap<String, Value>) -> Self {
        Self {
            identity_type: str_or_empty(attrs, "type"),
        }
    }

    pub fn to_value(&self) -> Value {
        map(vec![("type", Value::string(&self.identity_type))])
    }
}

/// Parse every item of a block attribute with `parse`
pub fn from_blocks<T>(
    attrs: &HashMap<String, Value>,
    name: &str,
    parse: fn(&HashMap<String, Value>) -> T,
) -> Vec<T> {
    blocks(attrs, name).into_iter().map(parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_uses_config_keys() {
        let mut attrs = HashMap::new();
        attrs.insert("email".to_string(), Value::string("alice@example.com"));
        attrs.insert("first_name".to_string(), Value::string("Alice"));

        let user = UserInfo::from_attributes(&attrs);
        assert_eq!(user.email_address, "alice@example.com");
        assert_eq!(user.first_name, "Alice");
        assert_eq!(user.country, "");

        let value = user.to_value();
        assert_eq!(
            value.as_map().unwrap()["email"],
            Value::string("alice@example.com")
        );
    }

    #[test]
    fn test_log_rule_from_blocks() {
        let mut tag = HashMap::new();
        tag.insert("name".to_string(), Value::string("Environment"));
        tag.insert("value".to_string(), Value::string("Prod"));
        tag.insert("action".to_string(), Value::string("Include"));
        let mut rule = HashMap::new();
        rule.insert("filtering_tag".to_string(), Value::block(tag));
        rule.insert("send_aad_logs".to_string(), Value::string("Enabled"));
        let mut attrs = HashMap::new();
        attrs.insert("log_rule".to_string(), Value::block(rule));

        let rules = from_blocks(&attrs, "log_rule", LogRule::from_attributes);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].send_aad_logs, "Enabled");
        assert_eq!(rules[0].send_activity_logs, "");
        assert_eq!(
            rules[0].filtering_tags,
            vec![FilteringTag {
                name: "Environment".to_string(),
                value: "Prod".to_string(),
                action: "Include".to_string(),
            }]
        );
    }

    #[test]
    fn test_log_rule_value_omits_empty_statuses() {
        let rule = LogRule {
            send_activity_logs: "Disabled".to_string(),
            ..Default::default()
        };
        let value = rule.to_value();
        let map = value.as_map().unwrap();
        assert_eq!(map["send_activity_logs"], Value::string("Disabled"));
        assert!(!map.contains_key("send_aad_logs"));
        assert_eq!(map["filtering_tag"], Value::List(vec![]));
    }
}
