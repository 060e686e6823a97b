//! Provider-level errors.

use thiserror::Error;

use crate::client::ClientError;
use crate::model::UserType;
use crate::schema::Diagnostic;

/// Errors surfaced by the provider to the host.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Configuration or state failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// An operation needing the API ran before `configure`.
    #[error("Provider is not configured")]
    NotConfigured,

    /// Only manually created users may be updated or deleted.
    #[error("only users of type {} may be modified", UserType::Manual)]
    ManualUsersOnly,

    /// The API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ProviderError {
    /// Whether the remote entity is gone.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Client(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Render as a single error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string())
    }
}
