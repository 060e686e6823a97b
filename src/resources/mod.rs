//! Managed resource types.
//!
//! Each submodule owns one resource type: its schema, a typed configuration
//! read from state, the mapping from the entity back into state, and the
//! create/read/update/delete/import lifecycle. [`ResourceKind`] dispatches
//! host calls by type name.

pub mod connector;
pub mod group;
pub mod remote_network;
pub mod resource;
pub mod service_key;
pub mod user;

use std::future::Future;

use serde_json::Value;
use tracing::{error, warn};

use crate::client::{Client, ClientError, Transport};
use crate::error::ProviderError;
use crate::schema::Schema;

/// Every resource type this provider manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `twingate_connector`
    Connector,
    /// `twingate_remote_network`
    RemoteNetwork,
    /// `twingate_user`
    User,
    /// `twingate_service_account_key`
    ServiceKey,
    /// `twingate_group`
    Group,
    /// `twingate_resource`
    Resource,
}

impl ResourceKind {
    /// Every resource type.
    pub const ALL: &'static [ResourceKind] = &[
        Self::Connector,
        Self::RemoteNetwork,
        Self::User,
        Self::ServiceKey,
        Self::Group,
        Self::Resource,
    ];

    /// The type name the host uses.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Connector => connector::TYPE_NAME,
            Self::RemoteNetwork => remote_network::TYPE_NAME,
            Self::User => user::TYPE_NAME,
            Self::ServiceKey => service_key::TYPE_NAME,
            Self::Group => group::TYPE_NAME,
            Self::Resource => resource::TYPE_NAME,
        }
    }

    /// Look up a resource type by name.
    pub fn from_type_name(name: &str) -> Result<Self, ProviderError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_name() == name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    /// The resource schema.
    pub fn schema(self) -> Schema {
        match self {
            Self::Connector => connector::schema(),
            Self::RemoteNetwork => remote_network::schema(),
            Self::User => user::schema(),
            Self::ServiceKey => service_key::schema(),
            Self::Group => group::schema(),
            Self::Resource => resource::schema(),
        }
    }

    /// Check that `config` maps onto the typed configuration.
    pub fn check(self, config: &Value) -> Result<(), ProviderError> {
        match self {
            Self::Connector => connector::check(config),
            Self::RemoteNetwork => remote_network::check(config),
            Self::User => user::check(config),
            Self::ServiceKey => service_key::check(config),
            Self::Group => group::check(config),
            Self::Resource => resource::check(config),
        }
    }

    /// Create the entity described by `planned` and return its state.
    pub async fn create<T: Transport>(
        self,
        client: &Client<T>,
        planned: &Value,
    ) -> Result<Value, ProviderError> {
        match self {
            Self::Connector => connector::create(client, planned).await,
            Self::RemoteNetwork => remote_network::create(client, planned).await,
            Self::User => user::create(client, planned).await,
            Self::ServiceKey => service_key::create(client, planned).await,
            Self::Group => group::create(client, planned).await,
            Self::Resource => resource::create(client, planned).await,
        }
    }

    /// Refresh `state`; `None` when the entity is gone.
    pub async fn read<T: Transport>(
        self,
        client: &Client<T>,
        state: &Value,
    ) -> Result<Option<Value>, ProviderError> {
        match self {
            Self::Connector => connector::read(client, state).await,
            Self::RemoteNetwork => remote_network::read(client, state).await,
            Self::User => user::read(client, state).await,
            Self::ServiceKey => service_key::read(client, state).await,
            Self::Group => group::read(client, state).await,
            Self::Resource => resource::read(client, state).await,
        }
    }

    /// Move the entity from `prior` to `planned` and return the new state.
    pub async fn update<T: Transport>(
        self,
        client: &Client<T>,
        prior: &Value,
        planned: &Value,
    ) -> Result<Value, ProviderError> {
        match self {
            Self::Connector => connector::update(client, prior, planned).await,
            Self::RemoteNetwork => remote_network::update(client, prior, planned).await,
            Self::User => user::update(client, prior, planned).await,
            Self::ServiceKey => service_key::update(client, prior, planned).await,
            Self::Group => group::update(client, prior, planned).await,
            Self::Resource => resource::update(client, prior, planned).await,
        }
    }

    /// Delete the entity tracked by `state`.
    pub async fn delete<T: Transport>(
        self,
        client: &Client<T>,
        state: &Value,
    ) -> Result<(), ProviderError> {
        match self {
            Self::Connector => connector::delete(client, state).await,
            Self::RemoteNetwork => remote_network::delete(client, state).await,
            Self::User => user::delete(client, state).await,
            Self::ServiceKey => service_key::delete(client, state).await,
            Self::Group => group::delete(client, state).await,
            Self::Resource => resource::delete(client, state).await,
        }
    }

    /// Read the entity `id` into fresh state.
    pub async fn import<T: Transport>(
        self,
        client: &Client<T>,
        id: &str,
    ) -> Result<Value, ProviderError> {
        match self {
            Self::Connector => connector::import(client, id).await,
            Self::RemoteNetwork => remote_network::import(client, id).await,
            Self::User => user::import(client, id).await,
            Self::ServiceKey => service_key::import(client, id).await,
            Self::Group => group::import(client, id).await,
            Self::Resource => resource::import(client, id).await,
        }
    }
}

/// Turn "query result is empty" into `None`.
pub(crate) fn found<T>(result: Result<T, ClientError>) -> Result<Option<T>, ProviderError> {
    match result {
        Ok(entity) => Ok(Some(entity)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Keep `result`, deleting the entity `undo` targets when it failed.
///
/// Used after a create whose follow-up call failed, so no entity is left
/// behind without state. A failed delete is logged and the original error
/// is returned.
pub(crate) async fn undo_on_error<V, F>(
    id: &str,
    result: Result<V, ProviderError>,
    undo: F,
) -> Result<V, ProviderError>
where
    F: Future<Output = Result<(), ClientError>>,
{
    let err = match result {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    warn!(id, error = %err, "create did not finish, deleting the new entity");
    if let Err(undo_err) = undo.await {
        error!(id, error = %undo_err, "could not delete the new entity");
    }
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{EntityKind, Operation, OperationContext};

    #[test]
    fn test_type_names_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_type_name(kind.type_name()).unwrap(), *kind);
        }
        assert!(matches!(
            ResourceKind::from_type_name("twingate_connectors"),
            Err(ProviderError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_every_schema_has_computed_id() {
        for kind in ResourceKind::ALL {
            let schema = kind.schema();
            let id = &schema.block.attributes["id"];
            assert!(id.flags.is_computed_only(), "{}", kind.type_name());
        }
    }

    #[test]
    fn test_found() {
        let gone: Result<(), ClientError> = Err(ClientError::not_found(OperationContext::with_id(
            Operation::Read,
            EntityKind::Group,
            "g1",
        )));
        assert!(found(gone).unwrap().is_none());

        let invalid: Result<(), ClientError> = Err(ClientError::validation(
            OperationContext::new(Operation::Read, EntityKind::Group),
            "id is empty",
        ));
        assert!(found(invalid).is_err());
    }
}
