//! Typed GraphQL client for the Twingate API.
//!
//! One [`Client`] method per entity operation. Each method validates its
//! identifiers, posts a single request through the [`Transport`], decodes
//! the response and maps failures onto [`ClientError`].
//!
//! ```ignore
//! use hemmer_provider_twingate::client::{Client, HttpTransport};
//!
//! let transport = HttpTransport::new("https://acme.twingate.com/api/graphql/", token)?;
//! let client = Client::new(transport);
//! let connector = client.create_connector("UmVtb3RlTmV0d29yazox").await?;
//! ```

pub mod error;
pub mod transport;

mod connector;
mod graphql;
mod group;
mod remote_network;
mod resource;
mod service_key;
mod user;

pub use error::{ClientError, EntityKind, ErrorKind, Operation, OperationContext};
pub use transport::{GraphqlRequest, HttpTransport, Transport, TransportError};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use graphql::{Connection, Field, MutationPayload};

/// Client for the Twingate GraphQL API.
#[derive(Debug)]
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The transport in use.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The GraphQL endpoint.
    pub fn url(&self) -> &str {
        self.transport.url()
    }

    async fn post(
        &self,
        context: &OperationContext,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<Vec<u8>, ClientError> {
        debug!(operation = %context, "sending graphql request");
        self.transport
            .execute(&GraphqlRequest::new(query, variables))
            .await
            .map_err(|source| ClientError::Transport {
                context: context.clone(),
                source,
            })
    }

    /// Run a mutation and check its `ok` flag.
    async fn mutate<P: MutationPayload>(
        &self,
        context: OperationContext,
        query: &'static str,
        variables: serde_json::Value,
        field: &str,
    ) -> Result<P, ClientError> {
        let body = self.post(&context, query, variables).await?;

        let value = match decode(&context, &body, field)? {
            Some(value) => value,
            None => return Err(ClientError::not_found(context)),
        };

        let payload = P::deserialize(value).map_err(|source| ClientError::Decode {
            context: context.clone(),
            source,
        })?;

        if !payload.ok() {
            let message = payload.error().unwrap_or("unknown error").to_string();
            return Err(ClientError::operation(context, message));
        }

        Ok(payload)
    }

    /// Run a query for a single entity; absence is [`ClientError::NotFound`].
    async fn query_one<N: DeserializeOwned>(
        &self,
        context: OperationContext,
        query: &'static str,
        variables: serde_json::Value,
        field: &str,
    ) -> Result<N, ClientError> {
        let body = self.post(&context, query, variables).await?;

        match decode(&context, &body, field)? {
            Some(value) => N::deserialize(value).map_err(|source| ClientError::Decode {
                context,
                source,
            }),
            None => Err(ClientError::not_found(context)),
        }
    }

    /// Run a query for a connection; absence or a malformed shape is an empty list.
    async fn query_list<N: DeserializeOwned>(
        &self,
        context: OperationContext,
        query: &'static str,
        variables: serde_json::Value,
        path: &[&str],
    ) -> Result<Vec<N>, ClientError> {
        let Some((field, rest)) = path.split_first() else {
            return Ok(Vec::new());
        };

        let body = self.post(&context, query, variables).await?;

        let Some(mut value) = decode(&context, &body, field)? else {
            debug!(operation = %context, "query result is empty");
            return Ok(Vec::new());
        };

        for segment in rest {
            value = match value.get_mut(segment).map(serde_json::Value::take) {
                Some(inner) if !inner.is_null() => inner,
                _ => {
                    debug!(operation = %context, "query result is empty");
                    return Ok(Vec::new());
                }
            };
        }

        match Connection::<N>::deserialize(value) {
            Ok(connection) => Ok(connection.into_nodes()),
            Err(e) => {
                warn!(operation = %context, error = %e, "ignoring malformed connection");
                Ok(Vec::new())
            }
        }
    }
}

/// Parse a body, mapping GraphQL `errors` to [`ClientError::Operation`].
fn decode(
    context: &OperationContext,
    body: &[u8],
    field: &str,
) -> Result<Option<serde_json::Value>, ClientError> {
    match graphql::field(body, field) {
        Ok(Field::Present(value)) => Ok(Some(value)),
        Ok(Field::Empty) => Ok(None),
        Ok(Field::Errors(errors)) => Err(ClientError::operation(
            context.clone(),
            graphql::join_errors(&errors),
        )),
        Err(source) => Err(ClientError::Decode {
            context: context.clone(),
            source,
        }),
    }
}

/// Fail with a validation error when `value` is empty.
fn require(value: &str, context: OperationContext, reason: &str) -> Result<(), ClientError> {
    if value.is_empty() {
        Err(ClientError::validation(context, reason))
    } else {
        Ok(())
    }
}
