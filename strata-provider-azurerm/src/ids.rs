//! Typed Azure Resource Manager IDs
//!
//! Each ID type parses from and displays as the canonical ARM path, e.g.
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Dynatrace.Observability/monitors/{name}`.
//! Fixed segments compare case-insensitively because ARM does not preserve
//! their casing consistently; user-supplied segments must be non-empty.

use std::fmt;

use thiserror::Error;

/// Failure to parse an ARM ID
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parsing {input:?} as a {kind} ID: expected the format {expected:?}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub input: String,
    pub expected: String,
}

/// A typed ARM resource ID
pub trait ArmId: fmt::Display + Sized {
    /// Human-readable name of the ID type
    const KIND: &'static str;

    fn parse(input: &str) -> Result<Self, IdParseError>;
}

enum Segment {
    Fixed(&'static str),
    User(&'static str),
}

use Segment::{Fixed, User};

fn format_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        match segment {
            Fixed(s) => out.push_str(s),
            User(name) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
    }
    out
}

/// Match `input` against `segments`, returning the user segment values in order
fn parse_segments(
    kind: &'static str,
    input: &str,
    segments: &[Segment],
) -> Result<Vec<String>, IdParseError> {
    let error = || IdParseError {
        kind,
        input: input.to_string(),
        expected: format_segments(segments),
    };

    let trimmed = input.strip_prefix('/').ok_or_else(error)?;
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() != segments.len() {
        return Err(error());
    }

    let mut values = Vec::new();
    for (part, segment) in parts.iter().zip(segments) {
        match segment {
            Fixed(expected) => {
                if !part.eq_ignore_ascii_case(expected) {
                    return Err(error());
                }
            }
            User(_) => {
                if part.is_empty() {
                    return Err(error());
                }
                values.push(part.to_string());
            }
        }
    }
    Ok(values)
}

const MONITOR_PROVIDER: &str = "Dynatrace.Observability";
const CDN_PROVIDER: &str = "Microsoft.Cdn";

/// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupId {
    pub subscription_id: String,
    pub resource_group_name: String,
}

impl ResourceGroupId {
    pub fn new(subscription_id: impl Into<String>, resource_group_name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
        }
    }
}

impl ArmId for ResourceGroupId {
    const KIND: &'static str = "Resource Group";

    fn parse(input: &str) -> Result<Self, IdParseError> {
        let v = parse_segments(
            Self::KIND,
            input,
            &[
                Fixed("subscriptions"),
                User("subscriptionId"),
                Fixed("resourceGroups"),
                User("resourceGroupName"),
            ],
        )?;
        Ok(Self::new(&v[0], &v[1]))
    }
}

impl fmt::Display for ResourceGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group_name
        )
    }
}

/// Dynatrace monitor ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub monitor_name: String,
}

impl MonitorId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        monitor_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            monitor_name: monitor_name.into(),
        }
    }
}

impl ArmId for MonitorId {
    const KIND: &'static str = "Monitor";

    fn parse(input: &str) -> Result<Self, IdParseError> {
        let v = parse_segments(
            Self::KIND,
            input,
            &[
                Fixed("subscriptions"),
                User("subscriptionId"),
                Fixed("resourceGroups"),
                User("resourceGroupName"),
                Fixed("providers"),
                Fixed(MONITOR_PROVIDER),
                Fixed("monitors"),
                User("monitorName"),
            ],
        )?;
        Ok(Self::new(&v[0], &v[1], &v[2]))
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/monitors/{}",
            self.subscription_id, self.resource_group_name, MONITOR_PROVIDER, self.monitor_name
        )
    }
}

/// Dynatrace tag rule ID (a child of a monitor)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRuleId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub monitor_name: String,
    pub tag_rule_name: String,
}

impl TagRuleId {
    pub fn new(monitor: &MonitorId, tag_rule_name: impl Into<String>) -> Self {
        Self {
            subscription_id: monitor.subscription_id.clone(),
            resource_group_name: monitor.resource_group_name.clone(),
            monitor_name: monitor.monitor_name.clone(),
            tag_rule_name: tag_rule_name.into(),
        }
    }

    pub fn monitor_id(&self) -> MonitorId {
        MonitorId::new(
            &self.subscription_id,
            &self.resource_group_name,
            &self.monitor_name,
        )
    }
}

impl ArmId for TagRuleId {
    const KIND: &'static str = "Tag Rule";

    fn parse(input: &str) -> Result<Self, IdParseError> {
        let v = parse_segments(
            Self::KIND,
            input,
            &[
                Fixed("subscriptions"),
                User("subscriptionId"),
                Fixed("resourceGroups"),
                User("resourceGroupName"),
                Fixed("providers"),
                Fixed(MONITOR_PROVIDER),
                Fixed("monitors"),
                User("monitorName"),
                Fixed("tagRules"),
                User("ruleSetName"),
            ],
        )?;
        Ok(Self {
            subscription_id: v[0].clone(),
            resource_group_name: v[1].clone(),
            monitor_name: v[2].clone(),
            tag_rule_name: v[3].clone(),
        })
    }
}

impl fmt::Display for TagRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/tagRules/{}", self.monitor_id(), self.tag_rule_name)
    }
}

/// Front Door custom domain ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDomainId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub profile_name: String,
    pub custom_domain_name: String,
}

impl ArmId for CustomDomainId {
    const KIND: &'static str = "Front Door Custom Domain";

    fn parse(input: &str) -> Result<Self, IdParseError> {
        let v = parse_segments(
            Self::KIND,
            input,
            &[
                Fixed("subscriptions"),
                User("subscriptionId"),
                Fixed("resourceGroups"),
                User("resourceGroupName"),
                Fixed("providers"),
                Fixed(CDN_PROVIDER),
                Fixed("profiles"),
                User("profileName"),
                Fixed("customDomains"),
                User("customDomainName"),
            ],
        )?;
        Ok(Self {
            subscription_id: v[0].clone(),
            resource_group_name: v[1].clone(),
            profile_name: v[2].clone(),
            custom_domain_name: v[3].clone(),
        })
    }
}

impl fmt::Display for CustomDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/profiles/{}/customDomains/{}",
            self.subscription_id,
            self.resource_group_name,
            CDN_PROVIDER,
            self.profile_name,
            self.custom_domain_name
        )
    }
}

/// Front Door route ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub profile_name: String,
    pub endpoint_name: String,
    pub route_name: String,
}

impl ArmId for RouteId {
    const KIND: &'static str = "Front Door Route";

    fn parse(input: &str) -> Result<Self, IdParseError> {
        let v = parse_segments(
            Self::KIND,
            input,
            &[
                Fixed("subscriptions"),
                User("subscriptionId"),
                Fixed("resourceGroups"),
                User("resourceGroupName"),
                Fixed("providers"),
                Fixed(CDN_PROVIDER),
                Fixed("profiles"),
                User("profileName"),
                Fixed("afdEndpoints"),
                User("afdEndpointName"),
                Fixed("routes"),
                User("routeName"),
            ],
        )?;
        Ok(Self {
            subscription_id: v[0].clone(),
            resource_group_name: v[1].clone(),
            profile_name: v[2].clone(),
            endpoint_name: v[3].clone(),
            route_name: v[4].clone(),
        })
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/profiles/{}/afdEndpoints/{}/routes/{}",
            self.subscription_id,
            self.resource_group_name,
            CDN_PROVIDER,
            self.profile_name,
            self.endpoint_name,
            self.route_name
        )
    }
}

/// Association between a custom domain and the routes serving it
///
/// Not a real ARM object: it is derived from the custom domain ID so the
/// association can be tracked and imported like any other resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDomainAssociationId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub profile_name: String,
    pub association_name: String,
}

impl CustomDomainAssociationId {
    pub fn from_custom_domain(domain: &CustomDomainId) -> Self {
        Self {
            subscription_id: domain.subscription_id.clone(),
            resource_group_name: domain.resource_group_name.clone(),
            profile_name: domain.profile_name.clone(),
            association_name: domain.custom_domain_name.clone(),
        }
    }

    pub fn custom_domain_id(&self) -> CustomDomainId {
        CustomDomainId {
            subscription_id: self.subscription_id.clone(),
            resource_group_name: self.resource_group_name.clone(),
            profile_name: self.profile_name.clone(),
            custom_domain_name: self.association_name.clone(),
        }
    }
}

impl ArmId for CustomDomainAssociationId {
    const KIND: &'static str = "Front Door Custom Domain Association";

    fn parse(input: &str) -> Result<Self, IdParseError> {
        let v = parse_segments(
            Self::KIND,
            input,
            &[
                Fixed("subscriptions"),
                User("subscriptionId"),
                Fixed("resourceGroups"),
                User("resourceGroupName"),
                Fixed("providers"),
                Fixed(CDN_PROVIDER),
                Fixed("profiles"),
                User("profileName"),
                Fixed("associations"),
                User("associationName"),
            ],
        )?;
        Ok(Self {
            subscription_id: v[0].clone(),
            resource_group_name: v[1].clone(),
            profile_name: v[2].clone(),
            association_name: v[3].clone(),
        })
    }
}

impl fmt::Display for CustomDomainAssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/profiles/{}/associations/{}",
            self.subscription_id,
            self.resource_group_name,
            CDN_PROVIDER,
            self.profile_name,
            self.association_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: &str = "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/rg1/providers/Dynatrace.Observability/monitors/monitor1";

    #[test]
    fn test_parse_monitor_id() {
        let id = MonitorId::parse(MONITOR).unwrap();
        assert_eq!(id.subscription_id, "12345678-1234-9876-4563-123456789012");
        assert_eq!(id.resource_group_name, "rg1");
        assert_eq!(id.monitor_name, "monitor1");
        assert_eq!(id.to_string(), MONITOR);
    }

    #[test]
    fn test_parse_is_case_insensitive_for_fixed_segments() {
        let id = MonitorId::parse(
            "/subscriptions/sub/resourcegroups/rg1/providers/dynatrace.observability/monitors/m",
        )
        .unwrap();
        assert_eq!(
            id.to_string(),
            "/subscriptions/sub/resourceGroups/rg1/providers/Dynatrace.Observability/monitors/m"
        );
    }

    #[test]
    fn test_tag_rule_id_round_trips_through_monitor() {
        let monitor = MonitorId::parse(MONITOR).unwrap();
        let rule = TagRuleId::new(&monitor, "default");
        assert_eq!(rule.to_string(), format!("{}/tagRules/default", MONITOR));
        assert_eq!(TagRuleId::parse(&rule.to_string()).unwrap(), rule);
        assert_eq!(rule.monitor_id(), monitor);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let err = TagRuleId::parse(MONITOR).unwrap_err();
        assert_eq!(err.kind, "Tag Rule");
        assert!(err.expected.ends_with("/tagRules/{ruleSetName}"));

        assert!(MonitorId::parse("subscriptions/sub/resourceGroups/rg").is_err());
        assert!(ResourceGroupId::parse("/subscriptions//resourceGroups/rg").is_err());
        assert!(ResourceGroupId::parse("/subscriptions/sub/resourceGroups/rg/").is_ok());
    }

    #[test]
    fn test_association_id_is_derived_from_custom_domain() {
        let domain = CustomDomainId::parse(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p1/customDomains/www",
        )
        .unwrap();
        let association = CustomDomainAssociationId::from_custom_domain(&domain);
        assert_eq!(
            association.to_string(),
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p1/associations/www"
        );
        assert_eq!(association.custom_domain_id(), domain);
    }

    #[test]
    fn test_parse_route_id() {
        let input = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p1/afdEndpoints/e1/routes/r1";
        let id = RouteId::parse(input).unwrap();
        assert_eq!(id.endpoint_name, "e1");
        assert_eq!(id.route_name, "r1");
        assert_eq!(id.to_string(), input);
    }
}
