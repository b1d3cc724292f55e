//! Per-test random data
//!
//! Every acceptance test derives its resource names from a fresh `TestData`
//! so concurrent runs against the same subscription do not collide.

use rand::Rng;

const RANDOM_STRING_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const RANDOM_STRING_LENGTH: usize = 5;

pub const DEFAULT_PRIMARY_LOCATION: &str = "westeurope";
pub const DEFAULT_SECONDARY_LOCATION: &str = "northeurope";

#[derive(Debug, Clone, PartialEq)]
pub struct Locations {
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestData {
    /// Numeric suffix for names that must be unique
    pub random_integer: u64,
    /// Five lowercase alphanumerics for names with tight length limits
    pub random_string: String,
    pub locations: Locations,
    pub resource_type: String,
    pub resource_label: String,
    /// Address of the resource under test (`type.label`)
    pub resource_name: String,
}

impl TestData {
    /// Build test data, reading locations from `ARM_TEST_LOCATION` and
    /// `ARM_TEST_LOCATION_ALT`
    pub fn build(resource_type: &str, label: &str) -> Self {
        Self::build_with(
            resource_type,
            label,
            &mut rand::thread_rng(),
            |key| std::env::var(key).ok(),
        )
    }

    pub(crate) fn build_with(
        resource_type: &str,
        label: &str,
        rng: &mut impl Rng,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let location = |key: &str, default: &str| {
            lookup(key)
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let random_string = (0..RANDOM_STRING_LENGTH)
            .map(|_| RANDOM_STRING_CHARSET[rng.gen_range(0..RANDOM_STRING_CHARSET.len())] as char)
            .collect();

        Self {
            random_integer: rng.gen_range(100_000_000..1_000_000_000),
            random_string,
            locations: Locations {
                primary: location("ARM_TEST_LOCATION", DEFAULT_PRIMARY_LOCATION),
                secondary: location("ARM_TEST_LOCATION_ALT", DEFAULT_SECONDARY_LOCATION),
            },
            resource_type: resource_type.to_string(),
            resource_label: label.to_string(),
            resource_name: format!("{}.{}", resource_type, label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn build_uses_defaults() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = TestData::build_with("azurerm_dynatrace_tag_rules", "test", &mut rng, |_| None);

        assert_eq!(data.resource_name, "azurerm_dynatrace_tag_rules.test");
        assert_eq!(data.locations.primary, "westeurope");
        assert_eq!(data.locations.secondary, "northeurope");
        assert_eq!(data.random_string.len(), 5);
        assert!(
            data.random_string
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
        assert!((100_000_000..1_000_000_000).contains(&data.random_integer));
    }

    #[test]
    fn build_reads_locations_from_environment() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = TestData::build_with("azurerm_dynatrace_monitor", "test", &mut rng, |key| {
            (key == "ARM_TEST_LOCATION").then(|| "eastus2euap".to_string())
        });
        assert_eq!(data.locations.primary, "eastus2euap");
        assert_eq!(data.locations.secondary, "northeurope");
    }

    #[test]
    fn each_build_is_random() {
        let a = TestData::build("azurerm_resource_group", "test");
        let b = TestData::build("azurerm_resource_group", "test");
        assert!(a.random_integer != b.random_integer || a.random_string != b.random_string);
    }
}
