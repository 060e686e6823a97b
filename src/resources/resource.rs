//! `twingate_resource`: an address reachable through a remote network.
//!
//! State carries ports as strings (`"443"`, `"8000-8080"`) under a
//! `protocols` block:
//!
//! ```text
//! protocols {
//!   allow_icmp = true
//!   tcp { policy = "RESTRICTED", ports = ["22", "8000-8080"] }
//!   udp { policy = "ALLOW_ALL" }
//! }
//! ```

use serde_json::{json, Value};

use super::found;
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::{Policy, ProtocolRule, Protocols, Resource};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::state::StateReader;

/// Resource type name.
pub const TYPE_NAME: &str = "twingate_resource";

fn protocol_block(protocol: &str) -> NestedBlock {
    NestedBlock::single(
        Block::new()
            .with_description(format!("{} port policy", protocol))
            .with_attribute(
                "policy",
                Attribute::optional_string()
                    .with_default(json!(Policy::AllowAll.as_str()))
                    .with_description(format!(
                        "Whether to allow or deny all ports, or restrict to the listed ports. One of {}",
                        Policy::names().join(", ")
                    )),
            )
            .with_attribute(
                "ports",
                Attribute::optional_string_list()
                    .with_default(json!([]))
                    .with_description("Ports or port ranges like 443 or 8000-8080"),
            ),
    )
}

/// Resource schema.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Resources in Twingate represent servers on the private network that clients can connect to.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("The ID of the Resource"),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The name of the Resource"),
        )
        .with_attribute(
            "address",
            Attribute::required_string()
                .with_description("The Resource's IP/CIDR or FQDN/DNS zone"),
        )
        .with_attribute(
            "remote_network_id",
            Attribute::required_string()
                .with_description("Remote Network ID where the Resource lives"),
        )
        .with_attribute(
            "group_ids",
            Attribute::optional_string_list()
                .with_default(json!([]))
                .with_description("List of Group IDs that have permission to access the Resource"),
        )
        .with_block(
            "protocols",
            NestedBlock::single(
                Block::new()
                    .with_description("Restrict access to certain protocols and ports")
                    .with_attribute(
                        "allow_icmp",
                        Attribute::optional_bool()
                            .with_default(json!(true))
                            .with_description("Whether to allow ICMP (ping) traffic"),
                    )
                    .with_block("tcp", protocol_block("TCP"))
                    .with_block("udp", protocol_block("UDP")),
            ),
        )
}

fn rule_from_state(reader: &StateReader<'_>) -> Result<ProtocolRule, ProviderError> {
    let rule = ProtocolRule {
        policy: reader.parse("policy")?.unwrap_or(Policy::AllowAll),
        ports: reader.parse_list("ports")?,
    };
    rule.validate().map_err(|e| reader.invalid("ports", e))?;
    Ok(rule)
}

fn config_from_state(state: &Value) -> Result<Resource, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    let protocols = reader.nested("protocols")?;

    Ok(Resource {
        id: reader.string_or_default("id")?,
        name: reader.string("name")?,
        address: reader.string("address")?,
        remote_network_id: reader.string("remote_network_id")?,
        group_ids: reader.string_list("group_ids")?,
        protocols: Protocols {
            allow_icmp: protocols.bool_or("allow_icmp", true)?,
            tcp: rule_from_state(&protocols.nested("tcp")?)?,
            udp: rule_from_state(&protocols.nested("udp")?)?,
        },
    })
}

fn rule_state(rule: &ProtocolRule) -> Value {
    json!({
        "policy": rule.policy.as_str(),
        "ports": rule.ports.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

pub(crate) fn to_state(resource: &Resource) -> Value {
    json!({
        "id": resource.id,
        "name": resource.name,
        "address": resource.address,
        "remote_network_id": resource.remote_network_id,
        "group_ids": resource.group_ids,
        "protocols": {
            "allow_icmp": resource.protocols.allow_icmp,
            "tcp": rule_state(&resource.protocols.tcp),
            "udp": rule_state(&resource.protocols.udp),
        },
    })
}

/// `fresh` group ids, in `tracked` order when both hold the same set.
fn keep_group_order(tracked: Vec<String>, mut fresh: Resource) -> Resource {
    let mut a = tracked.clone();
    let mut b = fresh.group_ids.clone();
    a.sort();
    b.sort();
    if a == b {
        fresh.group_ids = tracked;
    }
    fresh
}

pub(super) fn check(config: &Value) -> Result<(), ProviderError> {
    config_from_state(config).map(drop)
}

pub(super) async fn create<T: Transport>(
    client: &Client<T>,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let config = config_from_state(planned)?;
    let created = client.create_resource(&config).await?;
    Ok(to_state(&keep_group_order(config.group_ids, created)))
}

pub(super) async fn read<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<Option<Value>, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    let id = reader.id()?;
    let tracked = reader.string_list("group_ids")?;

    Ok(found(client.read_resource(&id).await)?
        .map(|resource| to_state(&keep_group_order(tracked, resource))))
}

pub(super) async fn update<T: Transport>(
    client: &Client<T>,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let resource = Resource {
        id: StateReader::new(TYPE_NAME, prior)?.id()?,
        ..config_from_state(planned)?
    };
    let updated = client.update_resource(&resource).await?;
    Ok(to_state(&keep_group_order(resource.group_ids, updated)))
}

pub(super) async fn delete<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<(), ProviderError> {
    let id = StateReader::new(TYPE_NAME, state)?.id()?;
    client.delete_resource(&id).await?;
    Ok(())
}

pub(super) async fn import<T: Transport>(
    client: &Client<T>,
    id: &str,
) -> Result<Value, ProviderError> {
    let resource = client.read_resource(id).await?;
    Ok(to_state(&resource))
}
