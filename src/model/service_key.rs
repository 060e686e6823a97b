use super::wire_enum;

wire_enum! {
    /// Lifecycle status of a service account key.
    ServiceKeyStatus, "service key status" {
        /// Usable.
        Active => "ACTIVE",
        /// Revoked by an administrator.
        Revoked => "REVOKED",
        /// Past its expiration time.
        Expired => "EXPIRED",
    }
}

/// A key authorizing a service account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceKey {
    /// Server-assigned ID, empty before creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// ID of the owning service account.
    pub service: String,
    /// Secret token, only returned by the create mutation.
    pub token: Option<String>,
    /// Current status.
    pub status: ServiceKeyStatus,
    /// Days until expiry at creation time; 0 never expires.
    pub expiration_time: i64,
}

impl Default for ServiceKey {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            service: String::new(),
            token: None,
            status: ServiceKeyStatus::Active,
            expiration_time: 0,
        }
    }
}

impl ServiceKey {
    /// Whether the key can still be used.
    pub fn is_active(&self) -> bool {
        self.status == ServiceKeyStatus::Active
    }
}
