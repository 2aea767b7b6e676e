//! Complete per-product configuration.

use serde::{Deserialize, Serialize};

use super::{ProductKey, ProductPermissions, ProductPreferences, ProductScope};

/// Scope, permissions and preferences of one product for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfiguration {
    pub key: ProductKey,
    pub name: String,
    #[serde(default)]
    pub scope: ProductScope,
    #[serde(default)]
    pub permissions: ProductPermissions,
    #[serde(default)]
    pub preferences: ProductPreferences,
}

impl ProductConfiguration {
    /// An empty configuration named after the product.
    pub fn empty(key: ProductKey) -> Self {
        Self {
            key,
            name: key.display_name().to_string(),
            scope: ProductScope::default(),
            permissions: ProductPermissions::default(),
            preferences: ProductPreferences::default(),
        }
    }
}
