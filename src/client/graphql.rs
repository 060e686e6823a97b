//! Response decoding: envelopes, connections and GraphQL error lists.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// A `{message}` entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
}

/// The result of looking up one top-level field under `data`.
#[derive(Debug)]
pub(crate) enum Field {
    /// The field holds a value.
    Present(Value),
    /// The field is absent or `null`.
    Empty,
    /// The field is absent and the server reported errors.
    Errors(Vec<GraphqlError>),
}

/// Parse a response body and pick out `data.<name>`.
pub(crate) fn field(body: &[u8], name: &str) -> Result<Field, serde_json::Error> {
    let mut root: Value = serde_json::from_slice(body)?;

    let value = root
        .get_mut("data")
        .and_then(|data| data.get_mut(name))
        .map(Value::take)
        .filter(|v| !v.is_null());

    if let Some(value) = value {
        return Ok(Field::Present(value));
    }

    let errors = match root.get_mut("errors").map(Value::take) {
        Some(errors @ Value::Array(_)) => Vec::<GraphqlError>::deserialize(errors).unwrap_or_default(),
        _ => Vec::new(),
    };

    if errors.is_empty() {
        Ok(Field::Empty)
    } else {
        Ok(Field::Errors(errors))
    }
}

/// Join GraphQL error messages into one line.
pub(crate) fn join_errors(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Common view over mutation payloads.
pub(crate) trait MutationPayload: DeserializeOwned {
    fn ok(&self) -> bool;
    fn error(&self) -> Option<&str>;
}

/// The `{ok, error, entity}` mutation envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub ok: bool,
    pub error: Option<String>,
    pub entity: Option<T>,
}

impl<T: DeserializeOwned> MutationPayload for Envelope<T> {
    fn ok(&self) -> bool {
        self.ok
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// An `{edges: [{node}]}` connection.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Connection<T> {
    #[serde(default)]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: Option<T>,
}

impl<T> Connection<T> {
    /// Nodes in server order, skipping null ones.
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().filter_map(|edge| edge.node).collect()
    }
}

/// A `{id}` reference to another entity.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdRef {
    pub id: String,
}
