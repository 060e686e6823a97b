//! `twingate_user`
//!
//! Only users of type `MANUAL` may be changed through this resource; synced
//! users are rejected before any request is sent. `send_invite` is a
//! create-time flag the API never echoes, so it lives only in state.

use serde_json::{json, Value};
use tracing::{debug, info};

use super::{found, undo_on_error};
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::{User, UserRole, UserType, UserUpdate};
use crate::schema::{Attribute, Schema};
use crate::state::StateReader;

/// Resource type name.
pub const TYPE_NAME: &str = "twingate_user";

/// Resource schema.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Users provides different levels of write capabilities across the Twingate Admin Console.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("The ID of the User"),
        )
        .with_attribute(
            "email",
            Attribute::required_string()
                .with_force_new()
                .with_description("The User's e-mail address"),
        )
        .with_attribute(
            "first_name",
            Attribute::optional_string().with_description("The User's first name"),
        )
        .with_attribute(
            "last_name",
            Attribute::optional_string().with_description("The User's last name"),
        )
        .with_attribute(
            "send_invite",
            Attribute::optional_bool()
                .with_default(json!(true))
                .with_description("Determines whether to send an email invitation to the User. True by default."),
        )
        .with_attribute(
            "is_active",
            Attribute::optional_bool()
                .with_default(json!(true))
                .with_description("Determines whether the User is active or not. Inactive users will be not able to sign in."),
        )
        .with_attribute(
            "role",
            Attribute::optional_string()
                .with_default(json!(UserRole::default().as_str()))
                .with_description(format!(
                    "Determines the User's role. Either {}",
                    UserRole::names().join(", ")
                )),
        )
        .with_attribute(
            "type",
            Attribute::computed_string()
                .with_description(format!("Indicates the User's type. Either {}", UserType::names().join(" or "))),
        )
}

fn config_from_state(state: &Value) -> Result<User, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    Ok(User {
        id: reader.string_or_default("id")?,
        email: reader.string("email")?,
        first_name: reader.string_or_default("first_name")?,
        last_name: reader.string_or_default("last_name")?,
        send_invite: reader.bool_or("send_invite", true)?,
        is_active: reader.bool_or("is_active", true)?,
        role: reader.parse("role")?.unwrap_or_default(),
        user_type: reader.parse("type")?.unwrap_or_default(),
    })
}

fn to_state(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "send_invite": user.send_invite,
        "is_active": user.is_active,
        "role": user.role.as_str(),
        "type": user.user_type.as_str(),
    })
}

/// The tracked user's id, provided it may be modified.
fn manual_user_id(state: &Value) -> Result<String, ProviderError> {
    if !config_from_state(state)?.is_manual() {
        return Err(ProviderError::ManualUsersOnly);
    }
    StateReader::new(TYPE_NAME, state)?.id()
}

/// The fields of `after` that differ from `before`.
fn diff(id: String, before: &User, after: &User) -> UserUpdate {
    let changed = |b: &String, a: &String| (b != a).then(|| a.clone());
    UserUpdate {
        id,
        first_name: changed(&before.first_name, &after.first_name),
        last_name: changed(&before.last_name, &after.last_name),
        is_active: (before.is_active != after.is_active).then_some(after.is_active),
        role: (before.role != after.role).then_some(after.role),
    }
}

pub(super) fn check(config: &Value) -> Result<(), ProviderError> {
    config_from_state(config).map(drop)
}

pub(super) async fn create<T: Transport>(
    client: &Client<T>,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let config = config_from_state(planned)?;

    let mut user = client.create_user(&config).await?;
    if !config.is_active {
        let update = UserUpdate {
            is_active: Some(false),
            ..UserUpdate::new(user.id.clone())
        };
        let deactivated = client.update_user(&update).await.map_err(ProviderError::from);
        user = undo_on_error(&update.id, deactivated, client.delete_user(&update.id)).await?;
        info!(id = %user.id, "deactivated new user");
    }

    user.send_invite = config.send_invite;
    Ok(to_state(&user))
}

pub(super) async fn read<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<Option<Value>, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    let id = reader.id()?;
    let send_invite = reader.bool_or("send_invite", true)?;

    Ok(found(client.read_user(&id).await)?.map(|user| {
        to_state(&User {
            send_invite,
            ..user
        })
    }))
}

pub(super) async fn update<T: Transport>(
    client: &Client<T>,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let id = manual_user_id(prior)?;
    let before = config_from_state(prior)?;
    let after = config_from_state(planned)?;

    let update = diff(id, &before, &after);
    debug!(id = %update.id, changes = update.has_changes(), "updating user");
    let user = client.update_user(&update).await?;

    Ok(to_state(&User {
        send_invite: after.send_invite,
        ..user
    }))
}

pub(super) async fn delete<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<(), ProviderError> {
    let id = manual_user_id(state)?;
    client.delete_user(&id).await?;
    Ok(())
}

pub(super) async fn import<T: Transport>(
    client: &Client<T>,
    id: &str,
) -> Result<Value, ProviderError> {
    let user = client.read_user(id).await?;
    Ok(to_state(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        assert_plan_no_changes, assert_plan_replaces, mock_provider, MockTransport, ProviderTester,
    };

    fn user_json(state: &str, user_type: &str) -> String {
        format!(
            r#"{{"id":"u1","email":"jane@acme.io","firstName":"Jane","lastName":"Doe","role":"MEMBER","type":"{}","state":"{}"}}"#,
            user_type, state
        )
    }

    fn prior(user_type: &str) -> Value {
        json!({
            "id": "u1",
            "email": "jane@acme.io",
            "first_name": "Jane",
            "last_name": "Doe",
            "send_invite": false,
            "is_active": true,
            "role": "MEMBER",
            "type": user_type,
        })
    }

    #[tokio::test]
    async fn test_create_inactive_user_deactivates() {
        let transport = MockTransport::new()
            .respond_with(format!(
                r#"{{"data":{{"userCreate":{{"ok":true,"error":null,"entity":{}}}}}}}"#,
                user_json("PENDING", "MANUAL")
            ))
            .respond_with(format!(
                r#"{{"data":{{"userDetailsUpdate":{{"ok":true,"error":null,"entity":{}}}}}}}"#,
                user_json("DISABLED", "MANUAL")
            ));
        let tester = ProviderTester::new(mock_provider(&transport));

        let plan = tester
            .plan_create(
                TYPE_NAME,
                json!({"email": "jane@acme.io", "first_name": "Jane", "last_name": "Doe", "is_active": false}),
            )
            .await
            .unwrap();
        let state = tester.create(TYPE_NAME, plan.planned_state).await.unwrap();

        assert_eq!(state["is_active"], false);
        assert_eq!(state["send_invite"], true);
        assert_eq!(state["type"], "MANUAL");

        let requests = transport.requests();
        assert_eq!(requests[0].variables["shouldSendInvite"], true);
        assert_eq!(requests[1].variables, json!({"id": "u1", "state": "DISABLED"}));
    }

    #[tokio::test]
    async fn test_create_deletes_user_when_deactivation_fails() {
        let transport = MockTransport::new()
            .respond_with(format!(
                r#"{{"data":{{"userCreate":{{"ok":true,"error":null,"entity":{}}}}}}}"#,
                user_json("PENDING", "MANUAL")
            ))
            .respond_with(r#"{"data":{"userDetailsUpdate":{"ok":false,"error":"forbidden"}}}"#)
            .respond_with(r#"{"data":{"userDelete":{"ok":true,"error":null}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .create(
                TYPE_NAME,
                json!({"email": "jane@acme.io", "is_active": false, "role": "MEMBER"}),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("forbidden"));
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].query.contains("userDelete"));
        assert_eq!(requests[2].variables, json!({"id": "u1"}));
    }

    #[tokio::test]
    async fn test_read_keeps_send_invite() {
        let transport = MockTransport::new().respond_with(format!(
            r#"{{"data":{{"user":{}}}}}"#,
            user_json("ACTIVE", "MANUAL")
        ));
        let tester = ProviderTester::new(mock_provider(&transport));

        let state = tester.read(TYPE_NAME, prior("MANUAL")).await.unwrap().unwrap();

        assert_eq!(state, prior("MANUAL"));
    }

    #[tokio::test]
    async fn test_update_sends_only_changes() {
        let transport = MockTransport::new().respond_with(format!(
            r#"{{"data":{{"userRoleUpdate":{{"ok":true,"error":null,"entity":{}}}}}}}"#,
            user_json("ACTIVE", "MANUAL").replace("MEMBER", "ADMIN")
        ));
        let tester = ProviderTester::new(mock_provider(&transport));
        let mut planned = prior("MANUAL");
        planned["role"] = json!("ADMIN");

        let state = tester
            .update(TYPE_NAME, prior("MANUAL"), planned)
            .await
            .unwrap();

        assert_eq!(state["role"], "ADMIN");
        assert_eq!(state["send_invite"], false);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].variables, json!({"id": "u1", "role": "ADMIN"}));
    }

    #[tokio::test]
    async fn test_synced_user_is_read_only() {
        let transport = MockTransport::new();
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .update(TYPE_NAME, prior("SYNCED"), prior("SYNCED"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ManualUsersOnly));

        let err = tester.delete(TYPE_NAME, prior("SYNCED")).await.unwrap_err();
        assert_eq!(err.to_string(), "only users of type MANUAL may be modified");

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_manual_user() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"userDelete":{"ok":true,"error":null}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let mut state = prior("MANUAL");
        state["type"] = Value::Null;
        tester.delete(TYPE_NAME, state).await.unwrap();

        assert_eq!(transport.requests()[0].variables["id"], "u1");
    }

    #[tokio::test]
    async fn test_plan() {
        let tester = ProviderTester::new(mock_provider(&MockTransport::new()));

        let plan = tester
            .plan_update(TYPE_NAME, prior("MANUAL"), prior("MANUAL"))
            .await
            .unwrap();
        assert_plan_no_changes(&plan);

        let mut moved = prior("MANUAL");
        moved["email"] = json!("jane@other.io");
        let plan = tester
            .plan_update(TYPE_NAME, prior("MANUAL"), moved)
            .await
            .unwrap();
        assert_plan_replaces(&plan);
    }

    #[test]
    fn test_diff() {
        let before = config_from_state(&prior("MANUAL")).unwrap();
        let after = User {
            last_name: "Smith".into(),
            is_active: false,
            ..before.clone()
        };

        let update = diff("u1".into(), &before, &after);

        assert_eq!(update.first_name, None);
        assert_eq!(update.last_name.as_deref(), Some("Smith"));
        assert_eq!(update.is_active, Some(false));
        assert_eq!(update.role, None);
    }
}
