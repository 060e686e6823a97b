use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::graphql::{Envelope, IdRef, MutationPayload};
use super::{require, Client, ClientError, EntityKind, Operation, OperationContext, Transport};
use crate::model::{ServiceKey, ServiceKeyStatus};

const CREATE_SERVICE_KEY: &str = r#"
mutation CreateServiceAccountKey($serviceAccountId: ID!, $name: String, $expirationTime: Int!) {
  serviceAccountKeyCreate(serviceAccountId: $serviceAccountId, name: $name, expirationTime: $expirationTime) {
    ok
    error
    token
    entity { id name status serviceAccount { id } }
  }
}"#;

const UPDATE_SERVICE_KEY: &str = r#"
mutation UpdateServiceAccountKey($id: ID!, $name: String!) {
  serviceAccountKeyUpdate(id: $id, name: $name) {
    ok
    error
    entity { id name status serviceAccount { id } }
  }
}"#;

const REVOKE_SERVICE_KEY: &str = r#"
mutation RevokeServiceAccountKey($id: ID!) {
  serviceAccountKeyRevoke(id: $id) {
    ok
    error
  }
}"#;

const DELETE_SERVICE_KEY: &str = r#"
mutation DeleteServiceAccountKey($id: ID!) {
  serviceAccountKeyDelete(id: $id) {
    ok
    error
  }
}"#;

const READ_SERVICE_KEY: &str = r#"
query ReadServiceAccountKey($id: ID!) {
  serviceAccountKey(id: $id) { id name status serviceAccount { id } }
}"#;

const READ_SERVICE_KEYS: &str = r#"
query ReadServiceAccountKeys($id: ID!) {
  serviceAccount(id: $id) {
    keys { edges { node { id name status serviceAccount { id } } } }
  }
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceKeyNode {
    id: String,
    name: String,
    status: ServiceKeyStatus,
    service_account: IdRef,
}

impl From<ServiceKeyNode> for ServiceKey {
    fn from(node: ServiceKeyNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            service: node.service_account.id,
            status: node.status,
            ..Default::default()
        }
    }
}

/// The create payload, which carries the secret next to the entity.
#[derive(Debug, Deserialize)]
struct KeyCreated {
    #[serde(default)]
    ok: bool,
    error: Option<String>,
    token: Option<String>,
    entity: Option<ServiceKeyNode>,
}

impl MutationPayload for KeyCreated {
    fn ok(&self) -> bool {
        self.ok
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<T: Transport> Client<T> {
    /// Create a key for a service account. The returned key holds the token.
    pub async fn create_service_key(&self, key: &ServiceKey) -> Result<ServiceKey, ClientError> {
        let context = OperationContext::new(Operation::Create, EntityKind::ServiceKey);
        require(&key.service, context.clone(), "service account id is empty")?;

        let created: KeyCreated = self
            .mutate(
                context.clone(),
                CREATE_SERVICE_KEY,
                json!({
                    "serviceAccountId": key.service,
                    "name": key.name,
                    "expirationTime": key.expiration_time,
                }),
                "serviceAccountKeyCreate",
            )
            .await?;

        let node = created
            .entity
            .ok_or_else(|| ClientError::not_found(context))?;
        let created_key = ServiceKey {
            token: created.token,
            expiration_time: key.expiration_time,
            ..node.into()
        };
        info!(id = %created_key.id, name = %created_key.name, "created service account key");
        Ok(created_key)
    }

    /// Rename a key.
    pub async fn update_service_key(&self, key: &ServiceKey) -> Result<ServiceKey, ClientError> {
        require(
            &key.id,
            OperationContext::new(Operation::Update, EntityKind::ServiceKey),
            "service account key id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Update, EntityKind::ServiceKey, &key.id);

        let envelope: Envelope<ServiceKeyNode> = self
            .mutate(
                context.clone(),
                UPDATE_SERVICE_KEY,
                json!({ "id": key.id, "name": key.name }),
                "serviceAccountKeyUpdate",
            )
            .await?;

        Ok(envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into())
    }

    /// Revoke a key; it stays readable with status `REVOKED`.
    pub async fn revoke_service_key(&self, id: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Revoke, EntityKind::ServiceKey),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Revoke, EntityKind::ServiceKey, id);

        let _: Envelope<serde_json::Value> = self
            .mutate(
                context,
                REVOKE_SERVICE_KEY,
                json!({ "id": id }),
                "serviceAccountKeyRevoke",
            )
            .await?;
        Ok(())
    }

    /// Delete a key.
    pub async fn delete_service_key(&self, id: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Delete, EntityKind::ServiceKey),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Delete, EntityKind::ServiceKey, id);

        let _: Envelope<serde_json::Value> = self
            .mutate(
                context,
                DELETE_SERVICE_KEY,
                json!({ "id": id }),
                "serviceAccountKeyDelete",
            )
            .await?;
        Ok(())
    }

    /// Read one key. The token is never returned.
    pub async fn read_service_key(&self, id: &str) -> Result<ServiceKey, ClientError> {
        require(
            id,
            OperationContext::new(Operation::Read, EntityKind::ServiceKey),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Read, EntityKind::ServiceKey, id);

        let node: ServiceKeyNode = self
            .query_one(context, READ_SERVICE_KEY, json!({ "id": id }), "serviceAccountKey")
            .await?;
        Ok(node.into())
    }

    /// Read the keys of one service account.
    pub async fn read_service_keys(
        &self,
        service_account_id: &str,
    ) -> Result<Vec<ServiceKey>, ClientError> {
        let context = OperationContext::list(EntityKind::ServiceKey);
        require(service_account_id, context.clone(), "service account id is empty")?;

        let nodes: Vec<ServiceKeyNode> = self
            .query_list(
                context,
                READ_SERVICE_KEYS,
                json!({ "id": service_account_id }),
                &["serviceAccount", "keys"],
            )
            .await?;
        Ok(nodes.into_iter().map(Into::into).collect())
    }
}
