/// A connector attached to a remote network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connector {
    /// Server-assigned ID.
    pub id: String,
    /// Server-assigned name; changed only through an explicit update.
    pub name: String,
    /// The remote network the connector belongs to, when the query selects it.
    pub remote_network_id: Option<String>,
    /// Whether status notifications are enabled, when the query selects it.
    pub status_updates_enabled: Option<bool>,
}
