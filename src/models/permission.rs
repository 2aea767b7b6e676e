//! Permission model matching the console's Permission interface.

use serde::{Deserialize, Serialize};

/// A single grantable permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub platform: String,
    pub category: String,
    pub action: String,
    pub item: String,
    #[serde(default)]
    pub description: String,
}

impl Permission {
    /// The `(platform, category, action, item)` tuple identifying the grant,
    /// independent of the storage id.
    pub fn logical_key(&self) -> PermissionKey {
        PermissionKey {
            platform: self.platform.clone(),
            category: self.category.clone(),
            action: self.action.clone(),
            item: self.item.clone(),
        }
    }
}

/// Logical identity of a permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionKey {
    pub platform: String,
    pub category: String,
    pub action: String,
    pub item: String,
}

impl std::fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.platform, self.category, self.action, self.item
        )
    }
}

/// Permission list of one product configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductPermissions {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl ProductPermissions {
    pub fn contains_id(&self, id: &str) -> bool {
        self.permissions.iter().any(|p| p.id == id)
    }
}
