use super::wire_enum;

wire_enum! {
    /// How a group is managed.
    GroupType, "group type" {
        /// Created by hand.
        Manual => "MANUAL",
        /// Synced from an identity provider.
        Synced => "SYNCED",
        /// Built in, such as "Everyone".
        System => "SYSTEM",
    }
}

impl Default for GroupType {
    fn default() -> Self {
        Self::Manual
    }
}

/// A group of users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Server-assigned ID, empty before creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the group grants access.
    pub is_active: bool,
    /// Management type.
    pub group_type: GroupType,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            is_active: true,
            group_type: GroupType::default(),
        }
    }
}

/// Server-side filter for listing groups. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    /// Exact name.
    pub name: Option<String>,
    /// Activity state.
    pub is_active: Option<bool>,
    /// Any of these types.
    pub types: Vec<GroupType>,
}

impl GroupFilter {
    /// Whether the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_active.is_none() && self.types.is_empty()
    }
}
