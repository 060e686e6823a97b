use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::graphql::{Connection, Envelope, IdRef};
use super::{require, Client, ClientError, EntityKind, Operation, OperationContext, Transport};
use crate::model::{Protocols, Resource};

const CREATE_RESOURCE: &str = r#"
mutation CreateResource($name: String!, $address: String!, $remoteNetworkId: ID!, $groupIds: [ID], $protocols: ProtocolsInput) {
  resourceCreate(name: $name, address: $address, remoteNetworkId: $remoteNetworkId, groupIds: $groupIds, protocols: $protocols) {
    ok
    error
    entity { id name address { value } remoteNetwork { id } groups { edges { node { id } } } protocols { allowIcmp tcp { policy ports { start end } } udp { policy ports { start end } } } }
  }
}"#;

const UPDATE_RESOURCE: &str = r#"
mutation UpdateResource($id: ID!, $name: String, $address: String, $remoteNetworkId: ID, $groupIds: [ID], $protocols: ProtocolsInput) {
  resourceUpdate(id: $id, name: $name, address: $address, remoteNetworkId: $remoteNetworkId, groupIds: $groupIds, protocols: $protocols) {
    ok
    error
    entity { id name address { value } remoteNetwork { id } groups { edges { node { id } } } protocols { allowIcmp tcp { policy ports { start end } } udp { policy ports { start end } } } }
  }
}"#;

const DELETE_RESOURCE: &str = r#"
mutation DeleteResource($id: ID!) {
  resourceDelete(id: $id) {
    ok
    error
  }
}"#;

const READ_RESOURCE: &str = r#"
query ReadResource($id: ID!) {
  resource(id: $id) { id name address { value } remoteNetwork { id } groups { edges { node { id } } } protocols { allowIcmp tcp { policy ports { start end } } udp { policy ports { start end } } } }
}"#;

const READ_RESOURCES: &str = r#"
query ReadResources {
  resources { edges { node { id name address { value } remoteNetwork { id } groups { edges { node { id } } } protocols { allowIcmp tcp { policy ports { start end } } udp { policy ports { start end } } } } } }
}"#;

const READ_RESOURCES_BY_NAME: &str = r#"
query ReadResourcesByName($name: String!) {
  resources(filter: { name: { eq: $name } }) { edges { node { id name address { value } remoteNetwork { id } groups { edges { node { id } } } protocols { allowIcmp tcp { policy ports { start end } } udp { policy ports { start end } } } } } }
}"#;

#[derive(Debug, Deserialize)]
struct AddressNode {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceNode {
    id: String,
    name: String,
    address: AddressNode,
    remote_network: IdRef,
    #[serde(default)]
    groups: Option<Connection<IdRef>>,
    #[serde(default)]
    protocols: Option<Protocols>,
}

impl From<ResourceNode> for Resource {
    fn from(node: ResourceNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            address: node.address.value,
            remote_network_id: node.remote_network.id,
            group_ids: node
                .groups
                .map(|groups| groups.into_nodes().into_iter().map(|g| g.id).collect())
                .unwrap_or_default(),
            protocols: node.protocols.unwrap_or_default(),
        }
    }
}

fn resource_variables(resource: &Resource) -> serde_json::Value {
    json!({
        "name": resource.name,
        "address": resource.address,
        "remoteNetworkId": resource.remote_network_id,
        "groupIds": resource.group_ids,
        "protocols": resource.protocols,
    })
}

impl<T: Transport> Client<T> {
    /// Create a resource.
    pub async fn create_resource(&self, resource: &Resource) -> Result<Resource, ClientError> {
        let context = OperationContext::new(Operation::Create, EntityKind::Resource);
        require(&resource.name, context.clone(), "resource name is empty")?;
        require(&resource.address, context.clone(), "resource address is empty")?;
        require(
            &resource.remote_network_id,
            context.clone(),
            "network id is empty",
        )?;

        let envelope: Envelope<ResourceNode> = self
            .mutate(
                context.clone(),
                CREATE_RESOURCE,
                resource_variables(resource),
                "resourceCreate",
            )
            .await?;

        let created: Resource = envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into();
        info!(id = %created.id, name = %created.name, "created resource");
        Ok(created)
    }

    /// Replace a resource's configuration.
    pub async fn update_resource(&self, resource: &Resource) -> Result<Resource, ClientError> {
        require(
            &resource.id,
            OperationContext::new(Operation::Update, EntityKind::Resource),
            "resource id is empty",
        )?;
        let context =
            OperationContext::with_id(Operation::Update, EntityKind::Resource, &resource.id);

        let mut variables = resource_variables(resource);
        variables["id"] = json!(resource.id);

        let envelope: Envelope<ResourceNode> = self
            .mutate(context.clone(), UPDATE_RESOURCE, variables, "resourceUpdate")
            .await?;

        Ok(envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into())
    }

    /// Delete a resource.
    pub async fn delete_resource(&self, id: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Delete, EntityKind::Resource),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Delete, EntityKind::Resource, id);

        let _: Envelope<serde_json::Value> = self
            .mutate(context, DELETE_RESOURCE, json!({ "id": id }), "resourceDelete")
            .await?;
        Ok(())
    }

    /// Read one resource.
    pub async fn read_resource(&self, id: &str) -> Result<Resource, ClientError> {
        require(
            id,
            OperationContext::new(Operation::Read, EntityKind::Resource),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Read, EntityKind::Resource, id);

        let node: ResourceNode = self
            .query_one(context, READ_RESOURCE, json!({ "id": id }), "resource")
            .await?;
        Ok(node.into())
    }

    /// Read every resource, in server order.
    pub async fn read_resources(&self) -> Result<Vec<Resource>, ClientError> {
        let nodes: Vec<ResourceNode> = self
            .query_list(
                OperationContext::list(EntityKind::Resource),
                READ_RESOURCES,
                json!({}),
                &["resources"],
            )
            .await?;
        Ok(nodes.into_iter().map(Into::into).collect())
    }

    /// Read the resources whose name equals `name`.
    pub async fn read_resources_by_name(&self, name: &str) -> Result<Vec<Resource>, ClientError> {
        let context = OperationContext::list(EntityKind::Resource);
        require(name, context.clone(), "resource name is empty")?;

        let nodes: Vec<ResourceNode> = self
            .query_list(
                context,
                READ_RESOURCES_BY_NAME,
                json!({ "name": name }),
                &["resources"],
            )
            .await?;
        Ok(nodes.into_iter().map(Into::into).collect())
    }
}
