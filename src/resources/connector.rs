//! `twingate_connector`: a connector deployed into a remote network.
//!
//! The server names new connectors; a configured `name` is applied with a
//! rename right after creation.

use serde_json::{json, Value};
use tracing::info;

use super::{found, undo_on_error};
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::Connector;
use crate::schema::{Attribute, Schema};
use crate::state::StateReader;

/// Resource type name.
pub const TYPE_NAME: &str = "twingate_connector";

/// Resource schema.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Connectors provide connectivity to Remote Networks.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("The ID of the Connector"),
        )
        .with_attribute(
            "name",
            Attribute::optional_computed_string()
                .with_description("Name of the Connector, if not provided one will be generated"),
        )
        .with_attribute(
            "remote_network_id",
            Attribute::required_string()
                .with_force_new()
                .with_description("The ID of the Remote Network the Connector is attached to"),
        )
        .with_attribute(
            "status_updates_enabled",
            Attribute::computed_bool()
                .with_description("Whether status notifications are enabled for the Connector"),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConnectorConfig {
    name: Option<String>,
    remote_network_id: String,
}

impl ConnectorConfig {
    fn from_state(state: &Value) -> Result<Self, ProviderError> {
        let reader = StateReader::new(TYPE_NAME, state)?;
        Ok(Self {
            name: reader.optional_string("name")?.filter(|n| !n.is_empty()),
            remote_network_id: reader.string("remote_network_id")?,
        })
    }
}

/// State for `connector`; `remote_network_id` fills in when the API omits it.
pub(crate) fn to_state(connector: &Connector, remote_network_id: &str) -> Value {
    json!({
        "id": connector.id,
        "name": connector.name,
        "remote_network_id": connector
            .remote_network_id
            .as_deref()
            .unwrap_or(remote_network_id),
        "status_updates_enabled": connector.status_updates_enabled,
    })
}

pub(super) fn check(config: &Value) -> Result<(), ProviderError> {
    ConnectorConfig::from_state(config).map(drop)
}

pub(super) async fn create<T: Transport>(
    client: &Client<T>,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let config = ConnectorConfig::from_state(planned)?;

    let connector = client.create_connector(&config.remote_network_id).await?;
    undo_on_error(
        &connector.id,
        finish_create(client, &config, &connector).await,
        client.delete_connector(&connector.id),
    )
    .await
}

/// Apply the configured name to a fresh connector and read it back.
async fn finish_create<T: Transport>(
    client: &Client<T>,
    config: &ConnectorConfig,
    created: &Connector,
) -> Result<Value, ProviderError> {
    if let Some(name) = config.name.as_deref().filter(|n| *n != created.name) {
        client.update_connector(&created.id, name).await?;
        info!(id = %created.id, name, "renamed connector");
    }

    let connector = client.read_connector(&created.id).await?;
    Ok(to_state(&connector, &config.remote_network_id))
}

pub(super) async fn read<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<Option<Value>, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    let id = reader.id()?;
    let remote_network_id = reader.string_or_default("remote_network_id")?;

    Ok(found(client.read_connector(&id).await)?
        .map(|connector| to_state(&connector, &remote_network_id)))
}

pub(super) async fn update<T: Transport>(
    client: &Client<T>,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let id = StateReader::new(TYPE_NAME, prior)?.id()?;
    let before = ConnectorConfig::from_state(prior)?;
    let after = ConnectorConfig::from_state(planned)?;

    if let Some(name) = after.name.as_deref().filter(|_| after.name != before.name) {
        client.update_connector(&id, name).await?;
    }

    let connector = client.read_connector(&id).await?;
    Ok(to_state(&connector, &after.remote_network_id))
}

pub(super) async fn delete<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<(), ProviderError> {
    let id = StateReader::new(TYPE_NAME, state)?.id()?;
    client.delete_connector(&id).await?;
    Ok(())
}

pub(super) async fn import<T: Transport>(
    client: &Client<T>,
    id: &str,
) -> Result<Value, ProviderError> {
    let connector = client.read_connector(id).await?;
    Ok(to_state(&connector, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        assert_plan_changes_attribute, assert_plan_replaces, mock_provider, MockTransport,
        ProviderTester, MOCK_URL,
    };

    const CREATED: &str = r#"{"data":{"connectorCreate":{"ok":true,"error":null,
        "entity":{"id":"c1","name":"smart-tortoise","remoteNetwork":{"id":"rn1"},"hasStatusNotificationsEnabled":true}}}}"#;
    const RENAMED: &str = r#"{"data":{"connectorUpdate":{"ok":true,"error":null}}}"#;
    const READ_RENAMED: &str = r#"{"data":{"connector":
        {"id":"c1","name":"edge","remoteNetwork":{"id":"rn1"},"hasStatusNotificationsEnabled":true}}}"#;

    #[tokio::test]
    async fn test_create_with_name_renames() {
        let transport = MockTransport::new()
            .respond_with(CREATED)
            .respond_with(RENAMED)
            .respond_with(READ_RENAMED);
        let tester = ProviderTester::new(mock_provider(&transport));

        let state = tester
            .create(TYPE_NAME, json!({"name": "edge", "remote_network_id": "rn1"}))
            .await
            .unwrap();

        assert_eq!(
            state,
            json!({"id": "c1", "name": "edge", "remote_network_id": "rn1", "status_updates_enabled": true})
        );
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].variables, json!({"id": "c1", "name": "edge"}));
    }

    #[tokio::test]
    async fn test_create_deletes_connector_when_rename_fails() {
        let transport = MockTransport::new()
            .respond_with(CREATED)
            .respond_with(r#"{"data":{"connectorUpdate":{"ok":false,"error":"name taken"}}}"#)
            .respond_with(r#"{"data":{"connectorDelete":{"ok":true,"error":null}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .create(TYPE_NAME, json!({"name": "edge", "remote_network_id": "rn1"}))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to update connector with id c1: name taken"
        );
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].query.contains("connectorDelete"));
        assert_eq!(requests[2].variables, json!({"id": "c1"}));
    }

    #[tokio::test]
    async fn test_create_keeps_rename_error_when_cleanup_fails() {
        let transport = MockTransport::new()
            .respond_with(CREATED)
            .respond_with(RENAMED)
            .fail_with("connection reset")
            .fail_with("connection reset");
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .create(TYPE_NAME, json!({"name": "edge", "remote_network_id": "rn1"}))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("failed to read connector with id c1"));
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn test_create_without_name_keeps_generated() {
        const READ_GENERATED: &str =
            r#"{"data":{"connector":{"id":"c1","name":"smart-tortoise","remoteNetwork":{"id":"rn1"}}}}"#;
        let transport = MockTransport::new()
            .respond_with(CREATED)
            .respond_with(READ_GENERATED)
            .respond_with(READ_GENERATED);
        let tester = ProviderTester::new(mock_provider(&transport));

        let state = tester
            .lifecycle_create(TYPE_NAME, json!({"remote_network_id": "rn1"}))
            .await
            .unwrap();

        assert_eq!(state["name"], "smart-tortoise");
        assert_eq!(state["status_updates_enabled"], Value::Null);
        assert!(transport
            .requests()
            .iter()
            .all(|r| !r.query.contains("connectorUpdate")));
    }

    #[tokio::test]
    async fn test_create_surfaces_transport_error() {
        let transport = MockTransport::new().fail_with("error_1");
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .create(TYPE_NAME, json!({"remote_network_id": "rn1"}))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("failed to create connector: Post \"{}\": error_1", MOCK_URL)
        );
    }

    #[tokio::test]
    async fn test_read_gone_clears_state() {
        let transport = MockTransport::new().respond_with(r#"{"data":{"connector":null}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let state = tester
            .read(TYPE_NAME, json!({"id": "c1", "remote_network_id": "rn1"}))
            .await
            .unwrap();

        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_update_renames_only_on_change() {
        let transport = MockTransport::new().respond_with(READ_RENAMED);
        let tester = ProviderTester::new(mock_provider(&transport));
        let prior = json!({"id": "c1", "name": "edge", "remote_network_id": "rn1"});

        let state = tester.update(TYPE_NAME, prior.clone(), prior).await.unwrap();

        assert_eq!(state["name"], "edge");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_update_failure_names_the_id() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"connectorUpdate":{"ok":false,"error":"error_1"}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .update(
                TYPE_NAME,
                json!({"id": "test-id", "name": "a", "remote_network_id": "rn1"}),
                json!({"id": "test-id", "name": "b", "remote_network_id": "rn1"}),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to update connector with id test-id: error_1"
        );
    }

    #[tokio::test]
    async fn test_network_change_replaces() {
        let tester = ProviderTester::new(mock_provider(&MockTransport::new()));

        let plan = tester
            .plan_update(
                TYPE_NAME,
                json!({"id": "c1", "name": "edge", "remote_network_id": "rn1"}),
                json!({"name": "edge", "remote_network_id": "rn2"}),
            )
            .await
            .unwrap();

        assert_plan_replaces(&plan);
        assert_plan_changes_attribute(&plan, "remote_network_id");
        assert_eq!(plan.planned_state["id"], "c1");
    }

    #[tokio::test]
    async fn test_delete_and_empty_id() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"connectorDelete":{"ok":true,"error":null}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        tester
            .delete(TYPE_NAME, json!({"id": "c1", "remote_network_id": "rn1"}))
            .await
            .unwrap();

        let err = tester
            .delete(TYPE_NAME, json!({"remote_network_id": "rn1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_network_fails_validation() {
        let tester = ProviderTester::new(mock_provider(&MockTransport::new()));

        let err = tester
            .validate_resource_config(TYPE_NAME, json!({"name": "edge"}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("remote_network_id"));
    }
}
