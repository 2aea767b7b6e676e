//! Configuration store: one [`ProductConfiguration`] per product key.
//!
//! Every update returns `Ok(true)` when applied and `Ok(false)` when the product
//! has no configuration in this store. Whether "not applied" is acceptable is the
//! caller's policy (see [`crate::config::MissingConfiguration`]).

use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, ConsoleResult};
use crate::models::{
    Permission, PreferenceValue, ProductConfiguration, ProductKey, ProductPreferences,
    ScopeCategory, ScopeFilter,
};

/// Which preference list an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceList {
    Features,
    Preferences,
}

/// Product configurations of one owner, in the order products were enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationStore {
    configurations: Vec<ProductConfiguration>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_configuration(&self, key: ProductKey) -> Option<&ProductConfiguration> {
        self.configurations.iter().find(|c| c.key == key)
    }

    fn get_mut(&mut self, key: ProductKey) -> Option<&mut ProductConfiguration> {
        self.configurations.iter_mut().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductConfiguration> {
        self.configurations.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = ProductKey> + '_ {
        self.configurations.iter().map(|c| c.key)
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Insert a configuration, replacing any existing one for the same product in place.
    pub fn insert(&mut self, configuration: ProductConfiguration) -> Option<ProductConfiguration> {
        match self.get_mut(configuration.key) {
            Some(existing) => Some(std::mem::replace(existing, configuration)),
            None => {
                self.configurations.push(configuration);
                None
            }
        }
    }

    pub fn remove(&mut self, key: ProductKey) -> Option<ProductConfiguration> {
        let index = self.configurations.iter().position(|c| c.key == key)?;
        Some(self.configurations.remove(index))
    }

    /// Check that each product appears once and every scope holds its invariants.
    pub fn validate(&self) -> ConsoleResult<()> {
        for (i, configuration) in self.configurations.iter().enumerate() {
            if self.configurations[..i].iter().any(|c| c.key == configuration.key) {
                return Err(ConsoleError::Validation(format!(
                    "Duplicate configuration for {}",
                    configuration.key
                )));
            }
            configuration.scope.validate().map_err(|err| {
                ConsoleError::Validation(format!("{}: {}", configuration.key, err.message()))
            })?;
        }
        Ok(())
    }

    /// Replace one scope category. Other categories are left as they are.
    pub fn update_scope(
        &mut self,
        key: ProductKey,
        category: ScopeCategory,
        filters: Vec<ScopeFilter>,
    ) -> ConsoleResult<bool> {
        let Some(configuration) = self.get_mut(key) else {
            return Ok(false);
        };
        configuration.scope.replace_filters(category, filters)?;
        Ok(true)
    }

    pub fn add_filter(
        &mut self,
        key: ProductKey,
        category: ScopeCategory,
        filter: ScopeFilter,
    ) -> ConsoleResult<bool> {
        match self.get_mut(key) {
            Some(configuration) => configuration.scope.add_filter(category, filter),
            None => Ok(false),
        }
    }

    pub fn remove_filter(&mut self, key: ProductKey, category: ScopeCategory, filter_id: &str) -> bool {
        self.get_mut(key)
            .map(|c| c.scope.remove_filter(category, filter_id))
            .unwrap_or(false)
    }

    /// Select a single crosswalk, or clear the selection with `None`.
    ///
    /// The id must be one of the configuration's code-type crosswalks.
    pub fn select_crosswalk(&mut self, key: ProductKey, crosswalk_id: Option<&str>) -> ConsoleResult<bool> {
        let Some(configuration) = self.get_mut(key) else {
            return Ok(false);
        };
        if let Some(id) = crosswalk_id {
            if !configuration.scope.code_type_crosswalks.iter().any(|c| c.id == id) {
                return Err(ConsoleError::Validation(format!(
                    "Crosswalk {} is not available for {}",
                    id, key
                )));
            }
        }
        configuration.scope.selected_crosswalk = crosswalk_id.map(str::to_string);
        Ok(true)
    }

    /// List-shaped selection kept for callers that still pass `[id]`.
    /// More than one id is rejected; the new selection replaces the old one.
    pub fn update_crosswalks(&mut self, key: ProductKey, crosswalk_ids: &[String]) -> ConsoleResult<bool> {
        match crosswalk_ids {
            [] => self.select_crosswalk(key, None),
            [id] => self.select_crosswalk(key, Some(id.as_str())),
            _ => Err(ConsoleError::Validation(format!(
                "At most one crosswalk can be selected, got {}",
                crosswalk_ids.len()
            ))),
        }
    }

    /// Replace the whole permission list. Ids are taken as given.
    pub fn update_permissions(&mut self, key: ProductKey, permissions: Vec<Permission>) -> bool {
        match self.get_mut(key) {
            Some(configuration) => {
                configuration.permissions.permissions = permissions;
                true
            }
            None => false,
        }
    }

    /// Append one permission unless its id is already assigned.
    pub fn add_permission(&mut self, key: ProductKey, permission: Permission) -> bool {
        let Some(configuration) = self.get_mut(key) else {
            return false;
        };
        if configuration.permissions.contains_id(&permission.id) {
            return false;
        }
        configuration.permissions.permissions.push(permission);
        true
    }

    pub fn remove_permission(&mut self, key: ProductKey, permission_id: &str) -> bool {
        let Some(configuration) = self.get_mut(key) else {
            return false;
        };
        let permissions = &mut configuration.permissions.permissions;
        let before = permissions.len();
        permissions.retain(|p| p.id != permission_id);
        permissions.len() != before
    }

    /// Replace features and preferences together.
    pub fn update_preferences(&mut self, key: ProductKey, preferences: ProductPreferences) -> bool {
        match self.get_mut(key) {
            Some(configuration) => {
                configuration.preferences = preferences;
                true
            }
            None => false,
        }
    }

    /// Set one preference or feature from raw input, coerced to its declared type.
    ///
    /// Returns the stored value, or `None` when the product or preference id is unknown.
    pub fn set_preference(
        &mut self,
        key: ProductKey,
        list: PreferenceList,
        preference_id: &str,
        raw: &str,
    ) -> Option<PreferenceValue> {
        let configuration = self.get_mut(key)?;
        let entries = match list {
            PreferenceList::Features => &mut configuration.preferences.features,
            PreferenceList::Preferences => &mut configuration.preferences.preferences,
        };
        let entry = entries.iter_mut().find(|p| p.id == preference_id)?;
        entry.value = entry.value.coerce(raw);
        tracing::debug!(
            "Set {} {} on {} to {:?}",
            entry.value.type_name(),
            preference_id,
            key,
            entry.value
        );
        Some(entry.value.clone())
    }
}
