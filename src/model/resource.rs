use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::wire_enum;

wire_enum! {
    /// Port policy for one protocol.
    Policy, "policy" {
        /// Only the listed ports are allowed.
        Restricted => "RESTRICTED",
        /// Every port is allowed.
        AllowAll => "ALLOW_ALL",
        /// No port is allowed.
        DenyAll => "DENY_ALL",
    }
}

/// Errors from parsing or validating a port range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortRangeError {
    /// The text is not `N` or `N-M`.
    #[error("port range '{0}' is not a number or a range like 100-200")]
    Malformed(String),
    /// A bound is outside 1..=65535.
    #[error("port {0} is out of range, ports must be between 1 and 65535")]
    OutOfRange(u32),
    /// The start is after the end.
    #[error("port range {start}-{end} starts after it ends")]
    Reversed {
        /// First port.
        start: u16,
        /// Last port.
        end: u16,
    },
}

/// An inclusive port range, written `8080` or `100-200`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    /// First port.
    pub start: u16,
    /// Last port.
    pub end: u16,
}

impl PortRange {
    /// A validated range.
    pub fn new(start: u16, end: u16) -> Result<Self, PortRangeError> {
        for port in [start, end] {
            if port == 0 {
                return Err(PortRangeError::OutOfRange(port.into()));
            }
        }
        if start > end {
            return Err(PortRangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering one port.
    pub fn single(port: u16) -> Result<Self, PortRangeError> {
        Self::new(port, port)
    }
}

fn parse_port(text: &str, whole: &str) -> Result<u16, PortRangeError> {
    let port: u32 = text
        .trim()
        .parse()
        .map_err(|_| PortRangeError::Malformed(whole.to_string()))?;
    u16::try_from(port).map_err(|_| PortRangeError::OutOfRange(port))
}

impl FromStr for PortRange {
    type Err = PortRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((start, end)) => Self::new(parse_port(start, s)?, parse_port(end, s)?),
            None => Self::single(parse_port(s, s)?),
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Policy and ports for one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolRule {
    /// Port policy.
    pub policy: Policy,
    /// Allowed ports; only meaningful for [`Policy::Restricted`].
    #[serde(default)]
    pub ports: Vec<PortRange>,
}

impl ProtocolRule {
    /// Allow every port.
    pub fn allow_all() -> Self {
        Self {
            policy: Policy::AllowAll,
            ports: Vec::new(),
        }
    }

    /// Check that ports are only listed under a restricted policy.
    pub fn validate(&self) -> Result<(), String> {
        match self.policy {
            Policy::Restricted => Ok(()),
            Policy::AllowAll | Policy::DenyAll if self.ports.is_empty() => Ok(()),
            Policy::AllowAll | Policy::DenyAll => Err(format!(
                "ports are only allowed with policy {}, got {}",
                Policy::Restricted,
                self.policy
            )),
        }
    }
}

impl Default for ProtocolRule {
    fn default() -> Self {
        Self::allow_all()
    }
}

/// Protocol restrictions of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocols {
    /// Whether ICMP (ping) is allowed.
    pub allow_icmp: bool,
    /// TCP rule.
    pub tcp: ProtocolRule,
    /// UDP rule.
    pub udp: ProtocolRule,
}

impl Default for Protocols {
    fn default() -> Self {
        Self {
            allow_icmp: true,
            tcp: ProtocolRule::allow_all(),
            udp: ProtocolRule::allow_all(),
        }
    }
}

/// A network resource reachable through a remote network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    /// Server-assigned ID, empty before creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// IP, CIDR, FQDN or DNS zone.
    pub address: String,
    /// Owning remote network.
    pub remote_network_id: String,
    /// Groups granted access.
    pub group_ids: Vec<String>,
    /// Protocol restrictions.
    pub protocols: Protocols,
}
