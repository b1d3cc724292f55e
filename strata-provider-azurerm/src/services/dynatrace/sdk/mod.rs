//! Wire types for the Dynatrace.Observability API (2023-04-27)
//!
//! Every field is optional, mirroring what the service accepts and returns.

pub mod monitors;
pub mod tagrules;

pub const API_VERSION: &str = "2023-04-27";

/// Unknown value for a string enum
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {kind} '{value}', expected one of: {}", expected.join(", "))]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: Vec<&'static str>,
}

/// Define a string-valued API enum with serde, `as_str`, `FromStr` and `Display`
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::services::dynatrace::sdk::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err($crate::services::dynatrace::sdk::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                        expected: Self::VARIANTS.to_vec(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;
