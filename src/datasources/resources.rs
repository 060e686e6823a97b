//! `twingate_resources`: resources looked up by exact name.
//!
//! Names are not unique, so the lookup returns every match.

use serde_json::{json, Value};
use tracing::debug;

use super::merge;
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::resources::resource::to_state;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::state::StateReader;

/// List lookup name.
pub const LIST: &str = "twingate_resources";

fn rule_block() -> NestedBlock {
    NestedBlock::single(
        Block::new()
            .with_attribute("policy", Attribute::computed_string())
            .with_attribute("ports", Attribute::computed_string_list()),
    )
    .computed()
}

fn entry_block() -> NestedBlock {
    let protocols = Block::new()
        .with_attribute("allow_icmp", Attribute::computed_bool())
        .with_block("tcp", rule_block())
        .with_block("udp", rule_block());

    NestedBlock::list(
        Block::new()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("address", Attribute::computed_string())
            .with_attribute("remote_network_id", Attribute::computed_string())
            .with_attribute("group_ids", Attribute::computed_string_list())
            .with_block("protocols", NestedBlock::single(protocols).computed()),
    )
    .computed()
}

/// Schema of the lookup.
pub fn list_schema() -> Schema {
    Schema::v0()
        .with_description("Resources with a given name.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The exact name of the Resources"),
        )
        .with_block("resources", entry_block())
}

pub(super) fn name_from_config(config: &Value) -> Result<String, ProviderError> {
    StateReader::new(LIST, config)?.string("name")
}

pub(super) async fn read_all<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let name = name_from_config(config)?;
    let resources = client.read_resources_by_name(&name).await?;
    debug!(name = %name, count = resources.len(), "read resources by name");

    let entries: Vec<Value> = resources.iter().map(to_state).collect();
    Ok(merge(
        config,
        json!({
            "id": format!("query resources by name: {}", name),
            "resources": entries,
        }),
    ))
}
