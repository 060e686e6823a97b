//! Error taxonomy for the GraphQL client.
//!
//! Every failure carries an [`OperationContext`] so its message reads
//! `failed to <verb> <entity>[ with id <id>]: <cause>`. Callers branch on the
//! variant (or [`ClientError::is_not_found`]), never on the message text.

use std::fmt;

use thiserror::Error;

use super::transport::TransportError;

/// The verb of a client operation, as it appears in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A create mutation.
    Create,
    /// A single-entity or list query.
    Read,
    /// An update mutation.
    Update,
    /// A delete mutation.
    Delete,
    /// A revoke mutation (service account keys only).
    Revoke,
}

impl Operation {
    /// The lowercase verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Revoke => "revoke",
        }
    }
}

/// The entity family an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A connector.
    Connector,
    /// A remote network.
    RemoteNetwork,
    /// A user account.
    User,
    /// A service account key.
    ServiceKey,
    /// A group.
    Group,
    /// A network resource.
    Resource,
}

impl EntityKind {
    /// Singular noun used in messages.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Connector => "connector",
            Self::RemoteNetwork => "remote network",
            Self::User => "user",
            Self::ServiceKey => "service account key",
            Self::Group => "group",
            Self::Resource => "resource",
        }
    }

    /// Plural noun used in messages for list operations.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Connector => "connectors",
            Self::RemoteNetwork => "remote networks",
            Self::User => "users",
            Self::ServiceKey => "service account keys",
            Self::Group => "groups",
            Self::Resource => "resources",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Unspecified,
    Id(String),
    All,
}

/// What was being attempted when an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    operation: Operation,
    entity: EntityKind,
    target: Target,
}

impl OperationContext {
    /// Context for an operation with no identifier yet (creates, failed preconditions).
    pub fn new(operation: Operation, entity: EntityKind) -> Self {
        Self {
            operation,
            entity,
            target: Target::Unspecified,
        }
    }

    /// Context for an operation addressing one entity by ID.
    pub fn with_id(operation: Operation, entity: EntityKind, id: impl Into<String>) -> Self {
        Self {
            operation,
            entity,
            target: Target::Id(id.into()),
        }
    }

    /// Context for a list read.
    pub fn list(entity: EntityKind) -> Self {
        Self {
            operation: Operation::Read,
            entity,
            target: Target::All,
        }
    }

    /// The operation verb.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The targeted entity family.
    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// The targeted ID, if the operation addresses a single entity.
    pub fn id(&self) -> Option<&str> {
        match &self.target {
            Target::Id(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Unspecified => {
                write!(f, "failed to {} {}", self.operation.as_str(), self.entity.noun())
            }
            Target::Id(id) => write!(
                f,
                "failed to {} {} with id {}",
                self.operation.as_str(),
                self.entity.noun(),
                id
            ),
            Target::All => {
                write!(f, "failed to {} {}", self.operation.as_str(), self.entity.plural())
            }
        }
    }
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required argument was empty; no request was sent.
    Validation,
    /// The HTTP request itself failed.
    Transport,
    /// The API answered with `ok: false` or GraphQL errors.
    Operation,
    /// The expected entity was absent from a well-formed response.
    NotFound,
    /// The response body was not valid JSON for the expected shape.
    Decode,
}

/// Errors returned by the GraphQL client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required identifier or argument was empty.
    #[error("{context}: {reason}")]
    Validation {
        /// The attempted operation.
        context: OperationContext,
        /// Which precondition failed.
        reason: String,
    },

    /// The request never produced a response body.
    #[error("{context}: {source}")]
    Transport {
        /// The attempted operation.
        context: OperationContext,
        /// The underlying transport failure.
        source: TransportError,
    },

    /// The API reported a failure.
    #[error("{context}: {message}")]
    Operation {
        /// The attempted operation.
        context: OperationContext,
        /// The server-provided error text.
        message: String,
    },

    /// The response was well formed but held no entity.
    #[error("{context}: query result is empty")]
    NotFound {
        /// The attempted operation.
        context: OperationContext,
    },

    /// The response body could not be decoded.
    #[error("{context}: {source}")]
    Decode {
        /// The attempted operation.
        context: OperationContext,
        /// The JSON error.
        source: serde_json::Error,
    },
}

impl ClientError {
    pub(crate) fn validation(context: OperationContext, reason: impl Into<String>) -> Self {
        Self::Validation {
            context,
            reason: reason.into(),
        }
    }

    pub(crate) fn operation(context: OperationContext, message: impl Into<String>) -> Self {
        Self::Operation {
            context,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(context: OperationContext) -> Self {
        Self::NotFound { context }
    }

    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Operation { .. } => ErrorKind::Operation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Whether the entity was absent, i.e. already gone on the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The operation that failed.
    pub fn context(&self) -> &OperationContext {
        match self {
            Self::Validation { context, .. }
            | Self::Transport { context, .. }
            | Self::Operation { context, .. }
            | Self::NotFound { context }
            | Self::Decode { context, .. } => context,
        }
    }
}
