//! `twingate_group` and `twingate_groups`
//!
//! The list lookup takes optional `name`, `is_active` and `types`
//! filters. Omitted filters match everything.

use serde_json::{json, Value};

use super::{entries_block, lookup_id, lookup_schema, merge};
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::{GroupFilter, GroupType};
use crate::resources::group::to_state;
use crate::schema::{Attribute, Schema};
use crate::state::StateReader;

/// Single lookup name.
pub const SINGLE: &str = "twingate_group";
/// List lookup name.
pub const LIST: &str = "twingate_groups";

fn attributes() -> [(&'static str, Attribute); 3] {
    [
        ("name", Attribute::computed_string().with_description("The name of the Group")),
        ("is_active", Attribute::computed_bool().with_description("Whether the Group is active")),
        ("type", Attribute::computed_string().with_description("The type of the Group")),
    ]
}

/// Schema of the single lookup.
pub fn single_schema() -> Schema {
    lookup_schema("Groups are how users are authorized to access Resources.", &attributes())
}

/// Schema of the list lookup.
pub fn list_schema() -> Schema {
    let mut entry = vec![("id", Attribute::computed_string())];
    entry.extend(attributes());
    Schema::v0()
        .with_description("Groups matching the given filters.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::optional_string().with_description("Returns only Groups with this exact name"),
        )
        .with_attribute(
            "is_active",
            Attribute::optional_bool().with_description("Returns only Groups with this activity state"),
        )
        .with_attribute(
            "types",
            Attribute::optional_string_list().with_description(format!(
                "Returns only Groups of these types, any of {}",
                GroupType::names().join(", ")
            )),
        )
        .with_block("groups", entries_block(&entry))
}

pub(super) fn filter_from_config(config: &Value) -> Result<GroupFilter, ProviderError> {
    let reader = StateReader::new(LIST, config)?;
    Ok(GroupFilter {
        name: reader.optional_string("name")?,
        is_active: reader.optional_bool("is_active")?,
        types: reader.parse_list("types")?,
    })
}

pub(super) async fn read_one<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let id = lookup_id(SINGLE, config)?;
    let group = client.read_group(&id).await?;
    Ok(merge(config, to_state(&group)))
}

pub(super) async fn read_all<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let filter = filter_from_config(config)?;
    let groups = client.read_groups(&filter).await?;
    let entries: Vec<Value> = groups.iter().map(to_state).collect();
    Ok(merge(config, json!({"id": "groups-by-filter", "groups": entries})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_provider, MockTransport, ProviderTester};

    #[test]
    fn test_filter_from_config() {
        let filter = filter_from_config(&json!({
            "name": "devs",
            "types": ["MANUAL", "SYSTEM"],
        }))
        .unwrap();

        assert_eq!(filter.name.as_deref(), Some("devs"));
        assert_eq!(filter.is_active, None);
        assert_eq!(filter.types, vec![GroupType::Manual, GroupType::System]);

        assert!(filter_from_config(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_group_type() {
        let err = filter_from_config(&json!({"types": ["ROBOT"]})).unwrap_err();

        assert!(err.to_string().contains("types"));
    }

    #[tokio::test]
    async fn test_filtered_list() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"groups":{"edges":[
                {"node":{"id":"g1","name":"devs","isActive":true,"type":"MANUAL"}}
            ]}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));

        let out = tester
            .read_data_source(LIST, json!({"name": "devs", "is_active": true}))
            .await
            .unwrap();

        assert_eq!(out["name"], "devs");
        assert_eq!(
            out["groups"],
            json!([{"id": "g1", "name": "devs", "is_active": true, "type": "MANUAL"}])
        );
        let variables = &transport.requests()[0].variables;
        assert_eq!(variables["filter"]["name"], json!({"eq": "devs"}));
        assert_eq!(variables["filter"]["isActive"], json!({"eq": true}));
    }

    #[tokio::test]
    async fn test_no_matches() {
        let transport =
            MockTransport::new().respond_with(r#"{"data":{"groups":{"edges":[]}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let out = tester.read_data_source(LIST, json!({})).await.unwrap();

        assert_eq!(out["groups"], json!([]));
    }
}
