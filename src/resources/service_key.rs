//! `twingate_service_account_key`
//!
//! The token is returned once, by the create mutation, and is kept in state
//! from then on. A key found revoked or expired on read is deleted and
//! created again. Deleting an active key revokes it first.

use serde_json::{json, Value};
use tracing::{info, warn};

use super::found;
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::ServiceKey;
use crate::schema::{Attribute, Schema};
use crate::state::StateReader;

/// Resource type name.
pub const TYPE_NAME: &str = "twingate_service_account_key";

/// Longest allowed key lifetime, in days.
const MAX_EXPIRATION_DAYS: i64 = 365;

/// Resource schema.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A Service Key authorizes access to all Resources assigned to a Service Account.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("Autogenerated ID of the Service Account Key"),
        )
        .with_attribute(
            "service_account_id",
            Attribute::required_string()
                .with_force_new()
                .with_description("The id of the Service Account"),
        )
        .with_attribute(
            "name",
            Attribute::optional_computed_string()
                .with_description("The name of the Service Key"),
        )
        .with_attribute(
            "expiration_time",
            Attribute::optional_int64()
                .with_default(json!(0))
                .with_force_new()
                .with_description(format!(
                    "Days until the key expires, between 0 and {}. 0 never expires.",
                    MAX_EXPIRATION_DAYS
                )),
        )
        .with_attribute(
            "token",
            Attribute::computed_string()
                .sensitive()
                .with_description("Autogenerated Access Token of the Service Account Key"),
        )
}

fn config_from_state(state: &Value) -> Result<ServiceKey, ProviderError> {
    let reader = StateReader::new(TYPE_NAME, state)?;
    let expiration_time = reader.optional_i64("expiration_time")?.unwrap_or(0);
    if !(0..=MAX_EXPIRATION_DAYS).contains(&expiration_time) {
        return Err(reader.invalid(
            "expiration_time",
            format!("must be between 0 and {}, got {}", MAX_EXPIRATION_DAYS, expiration_time),
        ));
    }

    Ok(ServiceKey {
        id: reader.string_or_default("id")?,
        name: reader.string_or_default("name")?,
        service: reader.string("service_account_id")?,
        token: reader.optional_string("token")?,
        expiration_time,
        ..Default::default()
    })
}

fn to_state(key: &ServiceKey) -> Value {
    json!({
        "id": key.id,
        "service_account_id": key.service,
        "name": key.name,
        "expiration_time": key.expiration_time,
        "token": key.token,
    })
}

pub(super) fn check(config: &Value) -> Result<(), ProviderError> {
    config_from_state(config).map(drop)
}

pub(super) async fn create<T: Transport>(
    client: &Client<T>,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let config = config_from_state(planned)?;
    let created = client.create_service_key(&config).await?;
    Ok(to_state(&created))
}

pub(super) async fn read<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<Option<Value>, ProviderError> {
    let tracked = config_from_state(state)?;
    let id = StateReader::new(TYPE_NAME, state)?.id()?;

    let Some(key) = found(client.read_service_key(&id).await)? else {
        return Ok(None);
    };

    if key.is_active() {
        return Ok(Some(to_state(&ServiceKey {
            token: tracked.token,
            expiration_time: tracked.expiration_time,
            ..key
        })));
    }

    warn!(id = %key.id, status = %key.status, "service account key is not active, recreating");
    found(client.delete_service_key(&key.id).await)?;
    let recreated = client
        .create_service_key(&ServiceKey {
            name: key.name,
            ..tracked
        })
        .await?;
    info!(old_id = %key.id, id = %recreated.id, "recreated service account key");
    Ok(Some(to_state(&recreated)))
}

pub(super) async fn update<T: Transport>(
    client: &Client<T>,
    prior: &Value,
    planned: &Value,
) -> Result<Value, ProviderError> {
    let tracked = config_from_state(prior)?;
    let config = config_from_state(planned)?;
    let id = StateReader::new(TYPE_NAME, prior)?.id()?;

    let updated = client
        .update_service_key(&ServiceKey {
            id,
            ..config.clone()
        })
        .await?;

    Ok(to_state(&ServiceKey {
        token: tracked.token,
        expiration_time: config.expiration_time,
        ..updated
    }))
}

pub(super) async fn delete<T: Transport>(
    client: &Client<T>,
    state: &Value,
) -> Result<(), ProviderError> {
    let id = StateReader::new(TYPE_NAME, state)?.id()?;

    let Some(key) = found(client.read_service_key(&id).await)? else {
        info!(id = %id, "service account key already deleted");
        return Ok(());
    };

    if key.is_active() {
        client.revoke_service_key(&id).await?;
    }
    client.delete_service_key(&id).await?;
    Ok(())
}

pub(super) async fn import<T: Transport>(
    client: &Client<T>,
    id: &str,
) -> Result<Value, ProviderError> {
    let key = client.read_service_key(id).await?;
    Ok(to_state(&key))
}
