//! Group model matching the console's Group interface.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ProductKey;
use crate::store::ConfigurationStore;

/// Role level tag shown on a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleLevel {
    Admin,
    Editor,
    Viewer,
}

/// A named set of members sharing product access and permission grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Cached count of members referencing this group
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub products: Vec<ProductKey>,
    pub role_level: RoleLevel,
    pub last_updated: NaiveDate,
    /// Grants given to every member, limited to `products`
    #[serde(default)]
    pub configurations: ConfigurationStore,
}

impl Group {
    pub fn grants_product(&self, key: ProductKey) -> bool {
        self.products.contains(&key)
    }
}

/// Request body for creating a new group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: String,
    pub role_level: RoleLevel,
    #[serde(default)]
    pub products: Vec<ProductKey>,
}
