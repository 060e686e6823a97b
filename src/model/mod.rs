//! Domain types for Twingate entities.
//!
//! Enumerations use the API's SCREAMING_SNAKE_CASE spelling both on the wire
//! and in resource state.

mod connector;
mod group;
mod remote_network;
mod resource;
mod service_key;
mod user;

pub use connector::Connector;
pub use group::{Group, GroupFilter, GroupType};
pub use remote_network::{Location, RemoteNetwork};
pub use resource::{PortRange, PortRangeError, Policy, ProtocolRule, Protocols, Resource};
pub use service_key::{ServiceKey, ServiceKeyStatus};
pub use user::{User, UserRole, UserType, UserUpdate};

use thiserror::Error;

/// A string did not name a variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
    expected: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str, variants: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: variants.join(", "),
        }
    }
}

/// Declares a closed enumeration with its wire spelling.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Wire spellings of every variant.
            pub fn names() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err($crate::model::UnknownVariant::new($kind, other, &Self::names())),
                }
            }
        }
    };
}

pub(crate) use wire_enum;
