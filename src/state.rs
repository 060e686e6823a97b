//! Typed reads from JSON resource state.
//!
//! Resources build their typed configuration field by field through a
//! [`StateReader`]; any mismatch becomes a [`ProviderError::Validation`]
//! naming the resource type and attribute path.

use std::fmt::Display;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::validation::value_type_name;

/// Read-only view over one object of resource state.
#[derive(Debug, Clone)]
pub struct StateReader<'a> {
    resource: &'a str,
    prefix: String,
    object: Option<&'a Map<String, Value>>,
}

impl<'a> StateReader<'a> {
    /// Wrap `state`; `null` reads as an empty object.
    pub fn new(resource: &'a str, state: &'a Value) -> Result<Self, ProviderError> {
        match state {
            Value::Object(object) => Ok(Self {
                resource,
                prefix: String::new(),
                object: Some(object),
            }),
            Value::Null => Ok(Self {
                resource,
                prefix: String::new(),
                object: None,
            }),
            other => Err(ProviderError::Validation(format!(
                "{}: expected an object, got {}",
                resource,
                value_type_name(other)
            ))),
        }
    }

    /// Reader for a nested single block; absent or null reads as empty.
    pub fn nested(&self, name: &str) -> Result<Self, ProviderError> {
        let object = match self.get(name) {
            None => None,
            Some(Value::Object(object)) => Some(object),
            Some(other) => return Err(self.type_error(name, "object", other)),
        };
        Ok(Self {
            resource: self.resource,
            prefix: self.path(name),
            object,
        })
    }

    /// The `id` attribute, which must be set.
    pub fn id(&self) -> Result<String, ProviderError> {
        self.string("id")
    }

    /// A required, non-empty string.
    pub fn string(&self, name: &str) -> Result<String, ProviderError> {
        self.optional_string(name)?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ProviderError::Validation(format!(
                    "{}: attribute '{}' is required",
                    self.resource,
                    self.path(name)
                ))
            })
    }

    /// An optional string.
    pub fn optional_string(&self, name: &str) -> Result<Option<String>, ProviderError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.type_error(name, "string", other)),
        }
    }

    /// A string, empty when absent.
    pub fn string_or_default(&self, name: &str) -> Result<String, ProviderError> {
        Ok(self.optional_string(name)?.unwrap_or_default())
    }

    /// An optional bool.
    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, ProviderError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.type_error(name, "bool", other)),
        }
    }

    /// A bool, `default` when absent.
    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, ProviderError> {
        Ok(self.optional_bool(name)?.unwrap_or(default))
    }

    /// An optional integer.
    pub fn optional_i64(&self, name: &str) -> Result<Option<i64>, ProviderError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.type_error(name, "int64", value)),
        }
    }

    /// A list of strings, empty when absent.
    pub fn string_list(&self, name: &str) -> Result<Vec<String>, ProviderError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.type_error(&format!("{}.{}", name, i), "string", other)),
                })
                .collect(),
            Some(other) => Err(self.type_error(name, "list", other)),
        }
    }

    /// An optional string parsed with [`FromStr`].
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>, ProviderError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional_string(name)?
            .map(|raw| {
                raw.parse::<T>().map_err(|e| {
                    ProviderError::Validation(format!(
                        "{}: attribute '{}': {}",
                        self.resource,
                        self.path(name),
                        e
                    ))
                })
            })
            .transpose()
    }

    /// A list of strings, each parsed with [`FromStr`].
    pub fn parse_list<T>(&self, name: &str) -> Result<Vec<T>, ProviderError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.string_list(name)?
            .iter()
            .map(|raw| {
                raw.parse::<T>().map_err(|e| {
                    ProviderError::Validation(format!(
                        "{}: attribute '{}': {}",
                        self.resource,
                        self.path(name),
                        e
                    ))
                })
            })
            .collect()
    }

    /// A validation error at `name`.
    pub fn invalid(&self, name: &str, reason: impl Display) -> ProviderError {
        ProviderError::Validation(format!(
            "{}: attribute '{}': {}",
            self.resource,
            self.path(name),
            reason
        ))
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.object
            .and_then(|object| object.get(name))
            .filter(|v| !v.is_null())
    }

    fn path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    fn type_error(&self, name: &str, expected: &str, got: &Value) -> ProviderError {
        ProviderError::Validation(format!(
            "{}: attribute '{}' must be {}, got {}",
            self.resource,
            self.path(name),
            expected,
            value_type_name(got)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PortRange, UserRole};
    use serde_json::json;

    #[test]
    fn test_typed_reads() {
        let state = json!({
            "id": "u1",
            "email": "jane@acme.io",
            "first_name": null,
            "is_active": false,
            "expiration_time": 30,
            "group_ids": ["g1", "g2"],
            "role": "ADMIN",
        });
        let reader = StateReader::new("twingate_user", &state).unwrap();

        assert_eq!(reader.id().unwrap(), "u1");
        assert_eq!(reader.string("email").unwrap(), "jane@acme.io");
        assert_eq!(reader.optional_string("first_name").unwrap(), None);
        assert_eq!(reader.string_or_default("last_name").unwrap(), "");
        assert!(!reader.bool_or("is_active", true).unwrap());
        assert!(reader.bool_or("send_invite", true).unwrap());
        assert_eq!(reader.optional_i64("expiration_time").unwrap(), Some(30));
        assert_eq!(reader.string_list("group_ids").unwrap(), vec!["g1", "g2"]);
        assert_eq!(reader.parse::<UserRole>("role").unwrap(), Some(UserRole::Admin));
    }

    #[test]
    fn test_missing_required() {
        let state = json!({"id": ""});
        let reader = StateReader::new("twingate_group", &state).unwrap();

        let err = reader.id().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: twingate_group: attribute 'id' is required"
        );
    }

    #[test]
    fn test_type_errors_name_the_attribute() {
        let state = json!({"name": 1, "group_ids": ["g1", 2]});
        let reader = StateReader::new("twingate_resource", &state).unwrap();

        assert_eq!(
            reader.string("name").unwrap_err().to_string(),
            "Validation error: twingate_resource: attribute 'name' must be string, got number"
        );
        assert!(reader
            .string_list("group_ids")
            .unwrap_err()
            .to_string()
            .contains("'group_ids.1'"));
    }

    #[test]
    fn test_parse_error() {
        let state = json!({"role": "OWNER"});
        let reader = StateReader::new("twingate_user", &state).unwrap();

        let err = reader.parse::<UserRole>("role").unwrap_err();
        assert!(err.to_string().contains("unknown user role 'OWNER'"));
    }

    #[test]
    fn test_nested_paths() {
        let state = json!({"protocols": {"tcp": {"ports": ["22", "x"]}}});
        let reader = StateReader::new("twingate_resource", &state).unwrap();
        let protocols = reader.nested("protocols").unwrap();
        let tcp = protocols.nested("tcp").unwrap();

        let err = tcp.parse_list::<PortRange>("ports").unwrap_err();
        assert!(err.to_string().contains("attribute 'protocols.tcp.ports'"));

        let udp = protocols.nested("udp").unwrap();
        assert!(udp.string_list("ports").unwrap().is_empty());
    }

    #[test]
    fn test_non_object_state() {
        assert!(StateReader::new("twingate_group", &json!(null)).is_ok());
        assert!(StateReader::new("twingate_group", &json!([1])).is_err());
    }
}
