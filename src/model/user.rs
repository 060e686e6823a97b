use super::wire_enum;

wire_enum! {
    /// A user's role.
    UserRole, "user role" {
        /// Full administrative access.
        Admin => "ADMIN",
        /// Infrastructure management access.
        Devops => "DEVOPS",
        /// Read-mostly support access.
        Support => "SUPPORT",
        /// No admin console access.
        Member => "MEMBER",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Member
    }
}

wire_enum! {
    /// How a user account is provisioned.
    UserType, "user type" {
        /// Created by hand; editable through this provider.
        Manual => "MANUAL",
        /// Synced from an identity provider; read-only here.
        Synced => "SYNCED",
    }
}

impl Default for UserType {
    fn default() -> Self {
        Self::Manual
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Server-assigned ID, empty before creation.
    pub id: String,
    /// Email address; immutable after creation.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Whether to email an invitation on creation. Never returned by the API.
    pub send_invite: bool,
    /// Whether the user can sign in.
    pub is_active: bool,
    /// Role.
    pub role: UserRole,
    /// Provisioning type.
    pub user_type: UserType,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            send_invite: true,
            is_active: true,
            role: UserRole::default(),
            user_type: UserType::default(),
        }
    }
}

impl User {
    /// Whether this provider may update or delete the user.
    pub fn is_manual(&self) -> bool {
        self.user_type == UserType::Manual
    }
}

/// A partial update of a [`User`]; only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// The user to update.
    pub id: String,
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New activity state.
    pub is_active: Option<bool>,
    /// New role.
    pub role: Option<UserRole>,
}

impl UserUpdate {
    /// An update of `id` that changes nothing yet.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Whether any detail field (everything but the role) is set.
    pub fn has_details(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some() || self.is_active.is_some()
    }

    /// Whether anything is set.
    pub fn has_changes(&self) -> bool {
        self.has_details() || self.role.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults() {
        let user = User::default();
        assert!(user.send_invite);
        assert!(user.is_active);
        assert_eq!(user.role, UserRole::Member);
        assert!(user.is_manual());
    }

    #[test]
    fn test_user_update_changes() {
        let mut update = UserUpdate::new("u1");
        assert!(!update.has_changes());

        update.role = Some(UserRole::Admin);
        assert!(update.has_changes());
        assert!(!update.has_details());

        update.is_active = Some(false);
        assert!(update.has_details());
    }

    #[test]
    fn test_role_names() {
        assert_eq!(UserRole::names(), vec!["ADMIN", "DEVOPS", "SUPPORT", "MEMBER"]);
        assert_eq!("SYNCED".parse::<UserType>().unwrap(), UserType::Synced);
    }
}
