//! `twingate_connector` and `twingate_connectors`

use serde_json::{json, Value};
use tracing::debug;

use super::{entries_block, lookup_id, lookup_schema, merge};
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::resources::connector::to_state;
use crate::schema::{Attribute, Schema};

/// Single lookup name.
pub const SINGLE: &str = "twingate_connector";
/// List lookup name.
pub const LIST: &str = "twingate_connectors";

fn attributes() -> [(&'static str, Attribute); 3] {
    [
        ("name", Attribute::computed_string().with_description("The name of the Connector")),
        (
            "remote_network_id",
            Attribute::computed_string()
                .with_description("The ID of the Remote Network the Connector is attached to"),
        ),
        (
            "status_updates_enabled",
            Attribute::computed_bool()
                .with_description("Whether status notifications are enabled for the Connector"),
        ),
    ]
}

/// Schema of the single lookup.
pub fn single_schema() -> Schema {
    lookup_schema("Connectors provide connectivity to Remote Networks.", &attributes())
}

/// Schema of the list lookup.
pub fn list_schema() -> Schema {
    let mut entry = vec![("id", Attribute::computed_string())];
    entry.extend(attributes());
    Schema::v0()
        .with_description("Every Connector in the network.")
        .with_attribute("id", Attribute::computed_string())
        .with_block("connectors", entries_block(&entry))
}

pub(super) async fn read_one<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let id = lookup_id(SINGLE, config)?;
    let connector = client.read_connector(&id).await?;
    Ok(merge(config, to_state(&connector, "")))
}

pub(super) async fn read_all<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let connectors = client.read_connectors().await?;
    debug!(count = connectors.len(), "read connectors");

    let entries: Vec<Value> = connectors.iter().map(|c| to_state(c, "")).collect();
    Ok(merge(config, json!({"id": "all-connectors", "connectors": entries})))
}

#[cfg(test)]
mod tests {
    use crate::testing::{mock_provider, MockTransport, ProviderTester};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_in_server_order() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"connectors":{"edges":[
                {"node":{"id":"c2","name":"b","remoteNetwork":{"id":"rn1"},"hasStatusNotificationsEnabled":false}},
                {"node":null},
                {"node":{"id":"c1","name":"a","remoteNetwork":{"id":"rn1"},"hasStatusNotificationsEnabled":true}}
            ]}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));

        let out = tester.read_data_source(super::LIST, json!({})).await.unwrap();

        assert_eq!(out["id"], "all-connectors");
        let ids: Vec<_> = out["connectors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["c2", "c1"]);
    }

    #[tokio::test]
    async fn test_empty_list() {
        let transport = MockTransport::new().respond_with("{}");
        let tester = ProviderTester::new(mock_provider(&transport));

        let out = tester.read_data_source(super::LIST, json!({})).await.unwrap();

        assert_eq!(out["connectors"], json!([]));
    }

    #[tokio::test]
    async fn test_single_lookup() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"connector":{"id":"c1","name":"a","remoteNetwork":{"id":"rn1"}}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));

        let out = tester
            .read_data_source(super::SINGLE, json!({"id": "c1"}))
            .await
            .unwrap();

        assert_eq!(out["name"], "a");
        assert_eq!(out["remote_network_id"], "rn1");
    }

    #[tokio::test]
    async fn test_single_lookup_missing() {
        let transport = MockTransport::new().respond_with(r#"{"data":{"connector":null}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .read_data_source(super::SINGLE, json!({"id": "c1"}))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }
}
