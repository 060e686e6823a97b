use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::graphql::Envelope;
use super::{require, Client, ClientError, EntityKind, Operation, OperationContext, Transport};
use crate::model::{User, UserRole, UserType, UserUpdate};

const CREATE_USER: &str = r#"
mutation CreateUser($email: String!, $firstName: String, $lastName: String, $role: UserRole, $shouldSendInvite: Boolean) {
  userCreate(email: $email, firstName: $firstName, lastName: $lastName, role: $role, shouldSendInvite: $shouldSendInvite) {
    ok
    error
    entity { id email firstName lastName role type state }
  }
}"#;

const UPDATE_USER_DETAILS: &str = r#"
mutation UpdateUserDetails($id: ID!, $firstName: String, $lastName: String, $state: UserStateUpdateInput) {
  userDetailsUpdate(id: $id, firstName: $firstName, lastName: $lastName, state: $state) {
    ok
    error
    entity { id email firstName lastName role type state }
  }
}"#;

const UPDATE_USER_ROLE: &str = r#"
mutation UpdateUserRole($id: ID!, $role: UserRole!) {
  userRoleUpdate(id: $id, userRole: $role) {
    ok
    error
    entity { id email firstName lastName role type state }
  }
}"#;

const DELETE_USER: &str = r#"
mutation DeleteUser($id: ID!) {
  userDelete(id: $id) {
    ok
    error
  }
}"#;

const READ_USER: &str = r#"
query ReadUser($id: ID!) {
  user(id: $id) { id email firstName lastName role type state }
}"#;

const READ_USERS: &str = r#"
query ReadUsers {
  users { edges { node { id email firstName lastName role type state } } }
}"#;

/// Wire spelling of a user's activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum UserState {
    Active,
    Pending,
    Disabled,
}

impl UserState {
    fn from_active(is_active: bool) -> Self {
        if is_active {
            Self::Active
        } else {
            Self::Disabled
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    id: String,
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    role: UserRole,
    #[serde(rename = "type")]
    user_type: UserType,
    state: UserState,
}

impl From<UserNode> for User {
    fn from(node: UserNode) -> Self {
        Self {
            id: node.id,
            email: node.email,
            first_name: node.first_name.unwrap_or_default(),
            last_name: node.last_name.unwrap_or_default(),
            is_active: node.state != UserState::Disabled,
            role: node.role,
            user_type: node.user_type,
            ..Default::default()
        }
    }
}

/// Variables for `userDetailsUpdate`; absent fields stay unchanged.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailsVariables<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<UserState>,
}

impl<T: Transport> Client<T> {
    /// Create a user, optionally emailing an invitation.
    pub async fn create_user(&self, user: &User) -> Result<User, ClientError> {
        let context = OperationContext::new(Operation::Create, EntityKind::User);
        require(&user.email, context.clone(), "email is empty")?;

        let envelope: Envelope<UserNode> = self
            .mutate(
                context.clone(),
                CREATE_USER,
                json!({
                    "email": user.email,
                    "firstName": user.first_name,
                    "lastName": user.last_name,
                    "role": user.role,
                    "shouldSendInvite": user.send_invite,
                }),
                "userCreate",
            )
            .await?;

        let mut created: User = envelope
            .entity
            .ok_or_else(|| ClientError::not_found(context))?
            .into();
        created.send_invite = user.send_invite;
        info!(id = %created.id, "created user");
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// Details (names, activity) and role are separate mutations; each is
    /// only sent when one of its fields is set. An update with nothing set
    /// reads the user instead.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ClientError> {
        require(
            &update.id,
            OperationContext::new(Operation::Update, EntityKind::User),
            "user id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Update, EntityKind::User, &update.id);

        if !update.has_changes() {
            debug!(id = %update.id, "user update has no changes");
            return self.read_user(&update.id).await;
        }

        let mut updated = None;

        if update.has_details() {
            let variables = DetailsVariables {
                id: &update.id,
                first_name: update.first_name.as_deref(),
                last_name: update.last_name.as_deref(),
                state: update.is_active.map(UserState::from_active),
            };
            let variables = serde_json::to_value(&variables).map_err(|source| {
                ClientError::Decode {
                    context: context.clone(),
                    source,
                }
            })?;

            let envelope: Envelope<UserNode> = self
                .mutate(context.clone(), UPDATE_USER_DETAILS, variables, "userDetailsUpdate")
                .await?;
            updated = envelope.entity;
        }

        if let Some(role) = update.role {
            let envelope: Envelope<UserNode> = self
                .mutate(
                    context.clone(),
                    UPDATE_USER_ROLE,
                    json!({ "id": update.id, "role": role }),
                    "userRoleUpdate",
                )
                .await?;
            updated = envelope.entity.or(updated);
        }

        updated
            .map(Into::into)
            .ok_or_else(|| ClientError::not_found(context))
    }

    /// Delete a user.
    pub async fn delete_user(&self, id: &str) -> Result<(), ClientError> {
        require(
            id,
            OperationContext::new(Operation::Delete, EntityKind::User),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Delete, EntityKind::User, id);

        let _: Envelope<serde_json::Value> = self
            .mutate(context, DELETE_USER, json!({ "id": id }), "userDelete")
            .await?;
        Ok(())
    }

    /// Read one user.
    pub async fn read_user(&self, id: &str) -> Result<User, ClientError> {
        require(
            id,
            OperationContext::new(Operation::Read, EntityKind::User),
            "id is empty",
        )?;
        let context = OperationContext::with_id(Operation::Read, EntityKind::User, id);

        let node: UserNode = self
            .query_one(context, READ_USER, json!({ "id": id }), "user")
            .await?;
        Ok(node.into())
    }

    /// Read every user, in server order.
    pub async fn read_users(&self) -> Result<Vec<User>, ClientError> {
        let nodes: Vec<UserNode> = self
            .query_list(
                OperationContext::list(EntityKind::User),
                READ_USERS,
                json!({}),
                &["users"],
            )
            .await?;
        Ok(nodes.into_iter().map(Into::into).collect())
    }
}
