//! Read-only data sources.
//!
//! A data source's output is its configuration with the computed
//! attributes filled in. List lookups return every match, and an empty
//! result is not an error. Single lookups by id fail when the entity is
//! missing.

pub mod connectors;
pub mod groups;
pub mod remote_networks;
pub mod resources;
pub mod users;

use serde_json::{Map, Value};

use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::state::StateReader;

/// Every data source this provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    /// `twingate_connector`
    Connector,
    /// `twingate_connectors`
    Connectors,
    /// `twingate_remote_network`
    RemoteNetwork,
    /// `twingate_remote_networks`
    RemoteNetworks,
    /// `twingate_user`
    User,
    /// `twingate_users`
    Users,
    /// `twingate_group`
    Group,
    /// `twingate_groups`
    Groups,
    /// `twingate_resources`
    Resources,
}

impl DataSourceKind {
    /// Every data source.
    pub const ALL: &'static [DataSourceKind] = &[
        Self::Connector,
        Self::Connectors,
        Self::RemoteNetwork,
        Self::RemoteNetworks,
        Self::User,
        Self::Users,
        Self::Group,
        Self::Groups,
        Self::Resources,
    ];

    /// The type name the host uses.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Connector => connectors::SINGLE,
            Self::Connectors => connectors::LIST,
            Self::RemoteNetwork => remote_networks::SINGLE,
            Self::RemoteNetworks => remote_networks::LIST,
            Self::User => users::SINGLE,
            Self::Users => users::LIST,
            Self::Group => groups::SINGLE,
            Self::Groups => groups::LIST,
            Self::Resources => resources::LIST,
        }
    }

    /// Look up a data source by name.
    pub fn from_type_name(name: &str) -> Result<Self, ProviderError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_name() == name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    /// The data source schema.
    pub fn schema(self) -> Schema {
        match self {
            Self::Connector => connectors::single_schema(),
            Self::Connectors => connectors::list_schema(),
            Self::RemoteNetwork => remote_networks::single_schema(),
            Self::RemoteNetworks => remote_networks::list_schema(),
            Self::User => users::single_schema(),
            Self::Users => users::list_schema(),
            Self::Group => groups::single_schema(),
            Self::Groups => groups::list_schema(),
            Self::Resources => resources::list_schema(),
        }
    }

    /// Check that `config` maps onto the lookup's arguments.
    pub fn check(self, config: &Value) -> Result<(), ProviderError> {
        match self {
            Self::Connector | Self::RemoteNetwork | Self::User | Self::Group => {
                lookup_id(self.type_name(), config).map(drop)
            }
            Self::Groups => groups::filter_from_config(config).map(drop),
            Self::Resources => resources::name_from_config(config).map(drop),
            Self::Connectors | Self::RemoteNetworks | Self::Users => Ok(()),
        }
    }

    /// Run the lookup.
    pub async fn read<T: Transport>(
        self,
        client: &Client<T>,
        config: &Value,
    ) -> Result<Value, ProviderError> {
        match self {
            Self::Connector => connectors::read_one(client, config).await,
            Self::Connectors => connectors::read_all(client, config).await,
            Self::RemoteNetwork => remote_networks::read_one(client, config).await,
            Self::RemoteNetworks => remote_networks::read_all(client, config).await,
            Self::User => users::read_one(client, config).await,
            Self::Users => users::read_all(client, config).await,
            Self::Group => groups::read_one(client, config).await,
            Self::Groups => groups::read_all(client, config).await,
            Self::Resources => resources::read_all(client, config).await,
        }
    }
}

/// The `id` argument of a single lookup.
fn lookup_id(data_source: &str, config: &Value) -> Result<String, ProviderError> {
    StateReader::new(data_source, config)?.id()
}

/// Schema for a lookup by id: a required `id` plus computed `attributes`.
fn lookup_schema(description: &str, attributes: &[(&str, Attribute)]) -> Schema {
    attributes.iter().cloned().fold(
        Schema::v0()
            .with_description(description)
            .with_attribute("id", Attribute::required_string().with_description("The ID to look up")),
        |schema, (name, attr)| schema.with_attribute(name, attr),
    )
}

/// A computed list block whose entries carry `attributes`.
fn entries_block(attributes: &[(&str, Attribute)]) -> NestedBlock {
    let block = attributes
        .iter()
        .cloned()
        .fold(Block::new(), |block, (name, attr)| block.with_attribute(name, attr));
    NestedBlock::list(block).computed()
}

/// `config` with `computed` merged over it.
fn merge(config: &Value, computed: Value) -> Value {
    let mut out = config.as_object().cloned().unwrap_or_else(Map::new);
    if let Value::Object(computed) = computed {
        out.extend(computed);
    }
    Value::Object(out)
}
