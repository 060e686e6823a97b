use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::graphql::Envelope;
use super::{require, Client, ClientError, EntityKind, Operation, OperationContext, Transport};
use crate::model::{Group, GroupFilter, GroupType};

const CREATE_GROUP: &str = r#"
mutation CreateGroup($name: String!, $isActive: Boolean) {
  groupCreate(name: $name, isActive: $isActive) {
    ok
    error
    entity { id name isActive type }
  }
}"#;

const UPDATE_GROUP: &str = r#"
mutation UpdateGroup($id: ID!, $name: String, $isActive: Boolean) {
  groupUpdate(id: $id, name: $name, isActive: $isActive) {
    ok
    error
    entity { id name isActive type }
  }
}"#;

const DELETE_GROUP: &str = r#"
mutation DeleteGroup($id: ID!) {
  groupDelete(id: $id) {
    ok
    error
  }
}"#;

const READ_GROUP: &str = r#"
query ReadGroup($id: ID!) {
  group(id: $id) { id name isActive type }
}"#;

const READ_GROUPS: &str = r#"
query ReadGroups($filter: GroupFilterInput) {
  groups(filter: $filter) { edges { node { id name isActive type } } }
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupNode {
    id: String,
    name: String,
    #[serde(default = "active")]
    is_active: bool,
    #[serde(rename = "type", default)]
    group_type: GroupType,
}

fn active() -> bool {
    true
}

impl From<GroupNode> for Group {
    fn from(node: GroupNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            is_active: node.is_active,
            group_type: node.group_type,
        }
    }
}

/// The `GroupFilterInput` value for a filter, `null` when it matches all.
fn filter_variable(filter: &GroupFilter) -> Value {
    if filter.is_empty() {
        return Value::Null;
    }

    let mut input = Map::new();
    if let Some(name) = &filter.name {
        input.insert("name".into(), json!({ "eq": name }));
    }
    if let Some(is_active) = filter.is_active {
        input.insert("isActive".into(), json!({ "eq": is_active }));
    }
    if !filter.types.is_empty() {
        input.insert("type".into(), json!({ "in": filter.types }));
    }
    Value::Object(input)
}

impl<T: Transport> Client<T> {
    /// Create a group.
    pub async fn create_group(&self, group: &Group) -> Result<Group, ClientError> {
        let context = OperationContext::new(Operation::Create, EntityKind::Group);
        require(&group.name, context.clone(), "group name is empty")?;

        let envelope: Envelope<GroupNode> = self
            .mutate(
                context.clone(),
                CREATE_GROUP,
                json!({ "name": group.name, "isActive": group.is_active }),
                "groupCreate",
            )
            .await?;

        let created: Group = envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into();
        info!(id = %created.id, name = %created.name, "created group");
        Ok(created)
    }

    /// Rename or (de)activate a group.
    pub async fn update_group(&self, group: &Group) -> Result<Group, ClientError> {
        require(
            &group.id,
            OperationContext::new(Operation::Update, EntityKind::Group),
            "group id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Update, EntityKind::Group, &group.id);

        let envelope: Envelope<GroupNode> = self
            .mutate(
                context.clone(),
                UPDATE_GROUP,
                json!({ "id": group.id, "name": group.name, "isActive": group.is_active }),
                "groupUpdate",
            )
            .await?;

        Ok(envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into())
    }

    /// Delete a group.
    pub async fn delete_group(&self, id: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Delete, EntityKind::Group),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Delete, EntityKind::Group, id);

        let _: Envelope<Value> = self
            .mutate(context, DELETE_GROUP, json!({ "id": id }), "groupDelete")
            .await?;
        Ok(())
    }

    /// Read one group.
    pub async fn read_group(&self, id: &str) -> Result<Group, ClientError> {
        require(
            id,
            OperationContext::new(Operation::Read, EntityKind::Group),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Read, EntityKind::Group, id);

        let node: GroupNode = self
            .query_one(context, READ_GROUP, json!({ "id": id }), "group")
            .await?;
        Ok(node.into())
    }

    /// Read the groups matching `filter`, in server order.
    pub async fn read_groups(&self, filter: &GroupFilter) -> Result<Vec<Group>, ClientError> {
        let nodes: Vec<GroupNode> = self
            .query_list(
                OperationContext::list(EntityKind::Group),
                READ_GROUPS,
                json!({ "filter": filter_variable(filter) }),
                &["groups"],
            )
            .await?;
        Ok(nodes.into_iter().map(Into::into).collect())
    }
}
