use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::graphql::{Envelope, IdRef};
use super::{require, Client, ClientError, EntityKind, Operation, OperationContext, Transport};
use crate::model::Connector;

const CREATE_CONNECTOR: &str = r#"
mutation CreateConnector($remoteNetworkId: ID!) {
  connectorCreate(remoteNetworkId: $remoteNetworkId) {
    ok
    error
    entity { id name remoteNetwork { id } hasStatusNotificationsEnabled }
  }
}"#;

const UPDATE_CONNECTOR: &str = r#"
mutation UpdateConnector($id: ID!, $name: String) {
  connectorUpdate(id: $id, name: $name) {
    ok
    error
  }
}"#;

const DELETE_CONNECTOR: &str = r#"
mutation DeleteConnector($id: ID!) {
  connectorDelete(id: $id) {
    ok
    error
  }
}"#;

const READ_CONNECTOR: &str = r#"
query ReadConnector($id: ID!) {
  connector(id: $id) { id name remoteNetwork { id } hasStatusNotificationsEnabled }
}"#;

const READ_CONNECTORS: &str = r#"
query ReadConnectors {
  connectors { edges { node { id name remoteNetwork { id } hasStatusNotificationsEnabled } } }
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectorNode {
    id: String,
    name: String,
    remote_network: Option<IdRef>,
    has_status_notifications_enabled: Option<bool>,
}

impl From<ConnectorNode> for Connector {
    fn from(node: ConnectorNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            remote_network_id: node.remote_network.map(|r| r.id),
            status_updates_enabled: node.has_status_notifications_enabled,
        }
    }
}

impl<T: Transport> Client<T> {
    /// Create a connector in a remote network. The server picks its name.
    pub async fn create_connector(&self, remote_network_id: &str) -> Result<Connector, ClientError> {
        let context = OperationContext::new(Operation::Create, EntityKind::Connector);
        require(remote_network_id, context.clone(), "network id is empty")?;

        let envelope: Envelope<ConnectorNode> = self
            .mutate(
                context.clone(),
                CREATE_CONNECTOR,
                json!({ "remoteNetworkId": remote_network_id }),
                "connectorCreate",
            )
            .await?;

        let connector: Connector = envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into();
        info!(id = %connector.id, name = %connector.name, "created connector");
        Ok(connector)
    }

    /// Rename a connector.
    pub async fn update_connector(&self, id: &str, name: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Update, EntityKind::Connector),
            "connector id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Update, EntityKind::Connector, id);

        let _: Envelope<serde_json::Value> = self
            .mutate(
                context,
                UPDATE_CONNECTOR,
                json!({ "id": id, "name": name }),
                "connectorUpdate",
            )
            .await?;
        Ok(())
    }

    /// Delete a connector.
    pub async fn delete_connector(&self, id: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Delete, EntityKind::Connector),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Delete, EntityKind::Connector, id);

        let _: Envelope<serde_json::Value> = self
            .mutate(context, DELETE_CONNECTOR, json!({ "id": id }), "connectorDelete")
            .await?;
        Ok(())
    }

    /// Read one connector.
    pub async fn read_connector(&self, id: &str) -> Result<Connector, ClientError> {
        require(
            id,
            OperationContext::new(Operation::Read, EntityKind::Connector),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Read, EntityKind::Connector, id);

        let node: ConnectorNode = self
            .query_one(context, READ_CONNECTOR, json!({ "id": id }), "connector")
            .await?;
        Ok(node.into())
    }

    /// Read every connector, in server order.
    pub async fn read_connectors(&self) -> Result<Vec<Connector>, ClientError> {
        let nodes: Vec<ConnectorNode> = self
            .query_list(
                OperationContext::list(EntityKind::Connector),
                READ_CONNECTORS,
                json!({}),
                &["connectors"],
            )
            .await?;
        Ok(nodes.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{Client, ErrorKind};
    use crate::model::Connector;
    use crate::testing::{MockTransport, MOCK_URL};
    use tokio_test::{assert_err, assert_ok};

    fn client(transport: &MockTransport) -> Client<MockTransport> {
        Client::new(transport.clone())
    }

    #[tokio::test]
    async fn test_create_ok() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"connectorCreate":{"entity":{"id":"test-id","name":"test-name"},"ok":true,"error":null}}}"#,
        );

        let connector = assert_ok!(client(&transport).create_connector("test").await);

        assert_eq!(
            connector,
            Connector {
                id: "test-id".into(),
                name: "test-name".into(),
                ..Default::default()
            }
        );
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].variables["remoteNetworkId"], "test");
    }

    #[tokio::test]
    async fn test_create_decodes_remote_network() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"connectorCreate":{"ok":true,"error":null,"entity":{"id":"c","name":"n","remoteNetwork":{"id":"rn"},"hasStatusNotificationsEnabled":true}}}}"#,
        );

        let connector = client(&transport).create_connector("rn").await.unwrap();

        assert_eq!(connector.remote_network_id.as_deref(), Some("rn"));
        assert_eq!(connector.status_updates_enabled, Some(true));
    }

    #[tokio::test]
    async fn test_create_error() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"connectorCreate":{"ok":false,"error":"error_1"}}}"#);

        let err = assert_err!(client(&transport).create_connector("test").await);

        assert_eq!(err.to_string(), "failed to create connector: error_1");
        assert_eq!(err.kind(), ErrorKind::Operation);
    }

    #[tokio::test]
    async fn test_create_empty_network_id() {
        let transport = MockTransport::new().respond_with("{}");

        let err = client(&transport).create_connector("").await.unwrap_err();

        assert_eq!(err.to_string(), "failed to create connector: network id is empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_request_error() {
        let transport = MockTransport::new().fail_with("error_1");

        let err = client(&transport).create_connector("test").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("failed to create connector: Post \"{}\": error_1", MOCK_URL)
        );
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_update_ok() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"connectorUpdate":{"entity":{"id":"test-id","name":"test-name"},"ok":true,"error":null}}}"#,
        );

        assert_ok!(client(&transport).update_connector("test-id", "test-name").await);
        assert_eq!(transport.requests()[0].variables["name"], "test-name");
    }

    #[tokio::test]
    async fn test_update_error() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"connectorUpdate":{"ok":false,"error":"error_1"}}}"#);

        let err = client(&transport)
            .update_connector("test-id", "test-name")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to update connector with id test-id: error_1"
        );
    }

    #[tokio::test]
    async fn test_update_empty_id() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"connectorUpdate":{"ok":false,"error":"error_1"}}}"#);

        let err = client(&transport).update_connector("", "").await.unwrap_err();

        assert_eq!(err.to_string(), "failed to update connector: connector id is empty");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_request_error() {
        let transport = MockTransport::new().fail_with("error_1");

        let err = client(&transport)
            .update_connector("test", "new name")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!(
                "failed to update connector with id test: Post \"{}\": error_1",
                MOCK_URL
            )
        );
    }

    #[tokio::test]
    async fn test_delete_ok() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"connectorDelete":{"ok":true,"error":null}}}"#);

        assert_ok!(client(&transport).delete_connector("test").await);
    }

    #[tokio::test]
    async fn test_delete_error() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"connectorDelete":{"ok":false,"error":"error_1"}}}"#);

        let err = client(&transport).delete_connector("test").await.unwrap_err();

        assert_eq!(err.to_string(), "failed to delete connector with id test: error_1");
    }

    #[tokio::test]
    async fn test_delete_empty_id() {
        let transport = MockTransport::new().respond_with("{}");

        let err = client(&transport).delete_connector("").await.unwrap_err();

        assert_eq!(err.to_string(), "failed to delete connector: id is empty");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_request_error() {
        let transport = MockTransport::new().fail_with("error_1");

        let err = client(&transport).delete_connector("test").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            format!(
                "failed to delete connector with id test: Post \"{}\": error_1",
                MOCK_URL
            )
        );
    }

    #[tokio::test]
    async fn test_read_null_entity_is_not_found() {
        let transport = MockTransport::new().respond_with(r#"{"data":{"connector":null}}"#);

        let err = client(&transport).read_connector("test").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "failed to read connector with id test: query result is empty"
        );
    }

    #[tokio::test]
    async fn test_read_empty_id() {
        let transport = MockTransport::new().respond_with("{}");

        let err = client(&transport).read_connector("").await.unwrap_err();

        assert_eq!(err.to_string(), "failed to read connector: id is empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_read_request_error() {
        let transport = MockTransport::new().fail_with("error_1");

        let err = client(&transport).read_connector("test").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            format!(
                "failed to read connector with id test: Post \"{}\": error_1",
                MOCK_URL
            )
        );
    }

    #[tokio::test]
    async fn test_read_malformed_body_is_decode_error() {
        let transport = MockTransport::new().respond_with("<html>bad gateway</html>");

        let err = client(&transport).read_connector("test").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_read_graphql_errors_are_operation_errors() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":null,"errors":[{"message":"Signature has expired"}]}"#);

        let err = client(&transport).read_connector("test").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Operation);
        assert_eq!(
            err.to_string(),
            "failed to read connector with id test: Signature has expired"
        );
    }

    #[tokio::test]
    async fn test_read_all_ok() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"connectors":{"edges":[
                {"node":{"id":"connector1","name":"tf-acc-connector1"}},
                {"node":{"id":"connector2","name":"connector2"}},
                {"node":{"id":"connector3","name":"tf-acc-connector3"}}
            ]}}}"#,
        );

        let connectors = client(&transport).read_connectors().await.unwrap();

        let pairs: Vec<(&str, &str)> = connectors
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("connector1", "tf-acc-connector1"),
                ("connector2", "connector2"),
                ("connector3", "tf-acc-connector3"),
            ]
        );
    }

    #[tokio::test]
    async fn test_read_all_empty_payload() {
        let transport = MockTransport::new().respond_with("{}");

        let connectors = assert_ok!(client(&transport).read_connectors().await);

        assert!(connectors.is_empty());
    }

    #[tokio::test]
    async fn test_read_all_malformed_connection() {
        let transport =
            MockTransport::new().respond_with(r#"{"data":{"connectors":{"edges":"oops"}}}"#);

        let connectors = assert_ok!(client(&transport).read_connectors().await);

        assert!(connectors.is_empty());
    }
}
