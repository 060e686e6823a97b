//! `twingate_remote_network`

use serde_json::{json, Value};

use super::found;
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::{Location, RemoteNetwork};
use crate::schema::{Attribute, Schema};
use crate::state::StateReader;

/// Resource type name.
pub const TYPE_NAME: &str = "twingate_remote_network";

/// Resource schema.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A Remote Network represents a single private network in Twingate.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("The ID of the Remote Network"),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The name of the Remote Network"),
        )
        .with_attribute(
            "location",
            Attribute::optional_string()
                .with_default(json!(Location::default().as_str()))
                .with_description(format!(
                    "The location of the Remote Network. Must be one of: {}",
                    Location::names().join(", ")
                )),
        )
}

fn config_from_state(state: &Value) -> Result<RemoteNetwork, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    Ok(RemoteNetwork {
        id: reader.string_or_default("id")?,
        name: reader.string("name")?,
        location: reader.parse("location")?.unwrap_or_default(),
    })
}

pub(crate) fn to_state(network: &RemoteNetwork) -> Value {
    json!({
        "id": network.id,
        "name": network.name,
        "location": network.location.as_str(),
    })
}

pub(super) fn check(config: &Value) -> Result<(), ProviderError> {
    config_from_state(config).map(drop)
}

pub(super) async fn create<T: Transport>(
    client: &Client<T>,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let network = config_from_state(planned)?;
    let created = client.create_remote_network(&network).await?;
    Ok(to_state(&created))
}

pub(super) async fn read<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<Option<Value>, ProviderError> {
    let id = StateReader::new(TYPE_NAME, state)?.id()?;
    Ok(found(client.read_remote_network(&id).await)?.map(|network| to_state(&network)))
}

pub(super) async fn update<T: Transport>(
    client: &Client<T>,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let network = RemoteNetwork {
        id: StateReader::new(TYPE_NAME, prior)?.id()?,
        ..config_from_state(planned)?
    };
    let updated = client.update_remote_network(&network).await?;
    Ok(to_state(&updated))
}

pub(super) async fn delete<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<(), ProviderError> {
    let id = StateReader::new(TYPE_NAME, state)?.id()?;
    client.delete_remote_network(&id).await?;
    Ok(())
}

pub(super) async fn import<T: Transport>(
    client: &Client<T>,
    id: &str,
) -> Result<Value, ProviderError> {
    let network = client.read_remote_network(id).await?;
    Ok(to_state(&network))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        assert_plan_changes_attribute, assert_plan_updates_in_place, mock_provider, MockTransport,
        ProviderTester,
    };

    #[tokio::test]
    async fn test_create_defaults_location() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"remoteNetworkCreate":{"ok":true,"error":null,
                "entity":{"id":"rn1","name":"office","location":"OTHER"}}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));

        let plan = tester
            .plan_create(TYPE_NAME, json!({"name": "office"}))
            .await
            .unwrap();
        assert_eq!(plan.planned_state["location"], "OTHER");

        let state = tester.create(TYPE_NAME, plan.planned_state).await.unwrap();

        assert_eq!(state, json!({"id": "rn1", "name": "office", "location": "OTHER"}));
        assert_eq!(transport.requests()[0].variables["location"], "OTHER");
    }

    #[tokio::test]
    async fn test_update_in_place() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"remoteNetworkUpdate":{"ok":true,"error":null,
                "entity":{"id":"rn1","name":"office","location":"AWS"}}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));
        let prior = json!({"id": "rn1", "name": "office", "location": "OTHER"});

        let plan = tester
            .plan_update(TYPE_NAME, prior.clone(), json!({"name": "office", "location": "AWS"}))
            .await
            .unwrap();
        assert_plan_updates_in_place(&plan);
        assert_plan_changes_attribute(&plan, "location");

        let state = tester
            .update(TYPE_NAME, prior, plan.planned_state)
            .await
            .unwrap();

        assert_eq!(state["location"], "AWS");
        assert_eq!(transport.requests()[0].variables["id"], "rn1");
    }

    #[tokio::test]
    async fn test_unknown_location_is_rejected() {
        let tester = ProviderTester::new(mock_provider(&MockTransport::new()));

        let err = tester
            .validate_resource_config(TYPE_NAME, json!({"name": "office", "location": "MARS"}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("unknown location 'MARS'"));
    }

    #[tokio::test]
    async fn test_import() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"remoteNetwork":{"id":"rn1","name":"office","location":"ON_PREMISE"}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));

        let imported = tester.import_resource(TYPE_NAME, "rn1").await.unwrap();

        assert_eq!(imported[0].state["location"], "ON_PREMISE");
    }
}
