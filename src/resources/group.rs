//! `twingate_group`

use serde_json::{json, Value};

use super::found;
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::{Group, GroupType};
use crate::schema::{Attribute, Schema};
use crate::state::StateReader;

/// Resource type name.
pub const TYPE_NAME: &str = "twingate_group";

/// Resource schema.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Groups are how users are authorized to access Resources.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The name of the group"),
        )
        .with_attribute(
            "is_active",
            Attribute::optional_bool()
                .with_default(json!(true))
                .with_description("Whether the group is active"),
        )
        .with_attribute(
            "type",
            Attribute::computed_string().with_description(format!(
                "The type of the group, one of {}",
                GroupType::names().join(", ")
            )),
        )
}

fn config_from_state(state: &Value) -> Result<Group, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    Ok(Group {
        id: reader.string_or_default("id")?,
        name: reader.string("name")?,
        is_active: reader.bool_or("is_active", true)?,
        group_type: reader.parse("type")?.unwrap_or_default(),
    })
}

pub(crate) fn to_state(group: &Group) -> Value {
    json!({
        "id": group.id,
        "name": group.name,
        "is_active": group.is_active,
        "type": group.group_type.as_str(),
    })
}

pub(super) fn check(config: &Value) -> Result<(), ProviderError> {
    config_from_state(config).map(drop)
}

pub(super) async fn create<T: Transport>(
    client: &Client<T>,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let group = config_from_state(planned)?;
    let created = client.create_group(&group).await?;
    Ok(to_state(&created))
}

pub(super) async fn read<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<Option<Value>, ProviderError> {
    let id = StateReader::new(TYPE_NAME, state)?.id()?;
    Ok(found(client.read_group(&id).await)?.map(|group| to_state(&group)))
}

pub(super) async fn update<T: Transport>(
    client: &Client<T>,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let group = Group {
        id: StateReader::new(TYPE_NAME, prior)?.id()?,
        ..config_from_state(planned)?
    };
    let updated = client.update_group(&group).await?;
    Ok(to_state(&updated))
}

pub(super) async fn delete<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<(), ProviderError> {
    let id = StateReader::new(TYPE_NAME, state)?.id()?;
    client.delete_group(&id).await?;
    Ok(())
}

pub(super) async fn import<T: Transport>(
    client: &Client<T>,
    id: &str,
) -> Result<Value, ProviderError> {
    let group = client.read_group(id).await?;
    Ok(to_state(&group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_provider, MockTransport, ProviderTester};

    #[tokio::test]
    async fn test_crud() {
        let transport = MockTransport::new()
            .respond_with(
                r#"{"data":{"groupCreate":{"ok":true,"error":null,
                    "entity":{"id":"g1","name":"devs","isActive":true,"type":"MANUAL"}}}}"#,
            )
            .respond_with(
                r#"{"data":{"groupUpdate":{"ok":true,"error":null,
                    "entity":{"id":"g1","name":"engineers","isActive":false,"type":"MANUAL"}}}}"#,
            )
            .respond_with(r#"{"data":{"groupDelete":{"ok":true,"error":null}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let created = tester
            .create(TYPE_NAME, json!({"name": "devs", "is_active": true}))
            .await
            .unwrap();
        assert_eq!(
            created,
            json!({"id": "g1", "name": "devs", "is_active": true, "type": "MANUAL"})
        );

        let updated = tester
            .update(
                TYPE_NAME,
                created.clone(),
                json!({"id": "g1", "name": "engineers", "is_active": false, "type": "MANUAL"}),
            )
            .await
            .unwrap();
        assert_eq!(updated["name"], "engineers");
        assert_eq!(updated["is_active"], false);
        assert_eq!(
            transport.requests()[1].variables,
            json!({"id": "g1", "name": "engineers", "isActive": false})
        );

        tester.delete(TYPE_NAME, updated).await.unwrap();
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_create_failure() {
        let transport = MockTransport::new()
            .respond_with(r#"{"data":{"groupCreate":{"ok":false,"error":"name taken"}}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .create(TYPE_NAME, json!({"name": "devs"}))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to create group: name taken");
    }

    #[tokio::test]
    async fn test_read_gone() {
        let transport = MockTransport::new().respond_with(r#"{"data":{"group":null}}"#);
        let tester = ProviderTester::new(mock_provider(&transport));

        let state = tester
            .read(TYPE_NAME, json!({"id": "g1", "name": "devs"}))
            .await
            .unwrap();

        assert!(state.is_none());
    }
}
