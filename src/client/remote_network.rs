use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::graphql::Envelope;
use super::{require, Client, ClientError, EntityKind, Operation, OperationContext, Transport};
use crate::model::{Location, RemoteNetwork};

const CREATE_REMOTE_NETWORK: &str = r#"
mutation CreateRemoteNetwork($name: String!, $location: RemoteNetworkLocation) {
  remoteNetworkCreate(name: $name, isActive: true, location: $location) {
    ok
    error
    entity { id name location }
  }
}"#;

const UPDATE_REMOTE_NETWORK: &str = r#"
mutation UpdateRemoteNetwork($id: ID!, $name: String, $location: RemoteNetworkLocation) {
  remoteNetworkUpdate(id: $id, name: $name, location: $location) {
    ok
    error
    entity { id name location }
  }
}"#;

const DELETE_REMOTE_NETWORK: &str = r#"
mutation DeleteRemoteNetwork($id: ID!) {
  remoteNetworkDelete(id: $id) {
    ok
    error
  }
}"#;

const READ_REMOTE_NETWORK: &str = r#"
query ReadRemoteNetwork($id: ID!) {
  remoteNetwork(id: $id) { id name location }
}"#;

const READ_REMOTE_NETWORKS: &str = r#"
query ReadRemoteNetworks {
  remoteNetworks { edges { node { id name location } } }
}"#;

#[derive(Debug, Deserialize)]
struct RemoteNetworkNode {
    id: String,
    name: String,
    #[serde(default)]
    location: Option<Location>,
}

impl From<RemoteNetworkNode> for RemoteNetwork {
    fn from(node: RemoteNetworkNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            location: node.location.unwrap_or_default(),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Create a remote network.
    pub async fn create_remote_network(
        &self,
        network: &RemoteNetwork,
    ) -> Result<RemoteNetwork, ClientError> {
        let context = OperationContext::new(Operation::Create, EntityKind::RemoteNetwork);
        require(&network.name, context.clone(), "network name is empty")?;

        let envelope: Envelope<RemoteNetworkNode> = self
            .mutate(
                context.clone(),
                CREATE_REMOTE_NETWORK,
                json!({ "name": network.name, "location": network.location }),
                "remoteNetworkCreate",
            )
            .await?;

        let created: RemoteNetwork = envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into();
        info!(id = %created.id, name = %created.name, "created remote network");
        Ok(created)
    }

    /// Rename or relocate a remote network.
    pub async fn update_remote_network(
        &self,
        network: &RemoteNetwork,
    ) -> Result<RemoteNetwork, ClientError> {
        require(
            &network.id,
            OperationContext::new(Operation::Update, EntityKind::RemoteNetwork),
            "remote network id is empty",
        )?;
        let context =
            OperationContext::with_id(Operation::Update, EntityKind::RemoteNetwork, &network.id);

        let envelope: Envelope<RemoteNetworkNode> = self
            .mutate(
                context.clone(),
                UPDATE_REMOTE_NETWORK,
                json!({ "id": network.id, "name": network.name, "location": network.location }),
                "remoteNetworkUpdate",
            )
            .await?;

        Ok(envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into())
    }

    /// Delete a remote network.
    pub async fn delete_remote_network(&self, id: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Delete, EntityKind::RemoteNetwork),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Delete, EntityKind::RemoteNetwork, id);

        let _: Envelope<serde_json::Value> = self
            .mutate(
                context,
                DELETE_REMOTE_NETWORK,
                json!({ "id": id }),
                "remoteNetworkDelete",
            )
            .await?;
        Ok(())
    }

    /// Read one remote network.
    pub async fn read_remote_network(&self, id: &str) -> Result<RemoteNetwork, ClientError> {
        require(
            id,
            OperationContext::new(Operation::Read, EntityKind::RemoteNetwork),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Read, EntityKind::RemoteNetwork, id);

        let node: RemoteNetworkNode = self
            .query_one(context, READ_REMOTE_NETWORK, json!({ "id": id }), "remoteNetwork")
            .await?;
        Ok(node.into())
    }

    /// Read every remote network, in server order.
    pub async fn read_remote_networks(&self) -> Result<Vec<RemoteNetwork>, ClientError> {
        let nodes: Vec<RemoteNetworkNode> = self
            .query_list(
                OperationContext::list(EntityKind::RemoteNetwork),
                READ_REMOTE_NETWORKS,
                json!({}),
                &["remoteNetworks"],
            )
            .await?;
        Ok(nodes.into_iter().map(Into::into).collect())
    }
}
