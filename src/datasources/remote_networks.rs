//! `twingate_remote_network` and `twingate_remote_networks`

use serde_json::{json, Value};

use super::{entries_block, lookup_id, lookup_schema, merge};
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::resources::remote_network::to_state;
use crate::schema::{Attribute, Schema};

/// Single lookup name.
pub const SINGLE: &str = "twingate_remote_network";
/// List lookup name.
pub const LIST: &str = "twingate_remote_networks";

fn attributes() -> [(&'static str, Attribute); 2] {
    [
        ("name", Attribute::computed_string().with_description("The name of the Remote Network")),
        ("location", Attribute::computed_string().with_description("The location of the Remote Network")),
    ]
}

/// Schema of the single lookup.
pub fn single_schema() -> Schema {
    lookup_schema("A Remote Network represents a single private network in Twingate.", &attributes())
}

/// Schema of the list lookup.
pub fn list_schema() -> Schema {
    let mut entry = vec![("id", Attribute::computed_string())];
    entry.extend(attributes());
    Schema::v0()
        .with_description("Every Remote Network in the network.")
        .with_attribute("id", Attribute::computed_string())
        .with_block("remote_networks", entries_block(&entry))
}

pub(super) async fn read_one<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let id = lookup_id(SINGLE, config)?;
    let network = client.read_remote_network(&id).await?;
    Ok(merge(config, to_state(&network)))
}

pub(super) async fn read_all<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let networks = client.read_remote_networks().await?;
    let entries: Vec<Value> = networks.iter().map(to_state).collect();
    Ok(merge(
        config,
        json!({"id": "all-remote-networks", "remote_networks": entries}),
    ))
}
