//! `twingate_user` and `twingate_users`
//!
//! Entries omit `send_invite`, which only exists on the managed resource.

use serde_json::{json, Value};

use super::{entries_block, lookup_id, lookup_schema, merge};
use crate::client::{Client, Transport};
use crate::error::ProviderError;
use crate::model::User;
use crate::schema::{Attribute, Schema};

/// Single lookup name.
pub const SINGLE: &str = "twingate_user";
/// List lookup name.
pub const LIST: &str = "twingate_users";

fn attributes() -> [(&'static str, Attribute); 6] {
    [
        ("email", Attribute::computed_string().with_description("The email address of the User")),
        ("first_name", Attribute::computed_string().with_description("The first name of the User")),
        ("last_name", Attribute::computed_string().with_description("The last name of the User")),
        ("is_active", Attribute::computed_bool().with_description("Whether the User can sign in")),
        ("role", Attribute::computed_string().with_description("The role of the User")),
        ("type", Attribute::computed_string().with_description("The type of the User")),
    ]
}

fn entry(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "is_active": user.is_active,
        "role": user.role.as_str(),
        "type": user.user_type.as_str(),
    })
}

/// Schema of the single lookup.
pub fn single_schema() -> Schema {
    lookup_schema("Users in Twingate can be given access to Twingate Resources.", &attributes())
}

/// Schema of the list lookup.
pub fn list_schema() -> Schema {
    let mut fields = vec![("id", Attribute::computed_string())];
    fields.extend(attributes());
    Schema::v0()
        .with_description("Every User in the network.")
        .with_attribute("id", Attribute::computed_string())
        .with_block("users", entries_block(&fields))
}

pub(super) async fn read_one<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let id = lookup_id(SINGLE, config)?;
    let user = client.read_user(&id).await?;
    Ok(merge(config, entry(&user)))
}

pub(super) async fn read_all<T: Transport>(
    client: &Client<T>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let users = client.read_users().await?;
    let entries: Vec<Value> = users.iter().map(entry).collect();
    Ok(merge(config, json!({"id": "all-users", "users": entries})))
}

#[cfg(test)]
mod tests {
    use crate::testing::{mock_provider, MockTransport, ProviderTester};
    use serde_json::json;

    #[tokio::test]
    async fn test_list() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"users":{"edges":[
                {"node":{"id":"u1","email":"jane@acme.io","firstName":"Jane","lastName":"Doe","role":"ADMIN","type":"MANUAL","state":"ACTIVE"}},
                {"node":{"id":"u2","email":"sync@acme.io","role":"MEMBER","type":"SYNCED","state":"DISABLED"}}
            ]}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));

        let out = tester.read_data_source(super::LIST, json!({})).await.unwrap();

        assert_eq!(out["id"], "all-users");
        assert_eq!(out["users"][0]["role"], "ADMIN");
        assert_eq!(
            out["users"][1],
            json!({
                "id": "u2",
                "email": "sync@acme.io",
                "first_name": "",
                "last_name": "",
                "is_active": false,
                "role": "MEMBER",
                "type": "SYNCED",
            })
        );
    }

    #[tokio::test]
    async fn test_single_lookup_needs_id() {
        let transport = MockTransport::new();
        let tester = ProviderTester::new(mock_provider(&transport));

        assert!(tester
            .validate_data_source_config(super::SINGLE, json!({}))
            .await
            .is_err());
        assert!(tester
            .read_data_source(super::SINGLE, json!({"id": ""}))
            .await
            .is_err());
        assert_eq!(transport.calls(), 0);
    }
}
