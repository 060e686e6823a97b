use super::wire_enum;

wire_enum! {
    /// Where a remote network is hosted.
    Location, "location" {
        /// Amazon Web Services.
        Aws => "AWS",
        /// Microsoft Azure.
        Azure => "AZURE",
        /// Google Cloud Platform.
        GoogleCloud => "GOOGLE_CLOUD",
        /// A self-hosted network.
        OnPremise => "ON_PREMISE",
        /// Anything else.
        Other => "OTHER",
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::Other
    }
}

/// A remote network: the container connectors and resources live in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteNetwork {
    /// Server-assigned ID, empty before creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hosting location.
    pub location: Location,
}
