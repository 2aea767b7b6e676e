//! The console: one organization's members, groups and product configurations.
//!
//! State lives behind an `Arc` so readers can hold a stable [`Console::snapshot`]
//! while edits continue. Mutations go through `&mut Console` and copy the state
//! only when a snapshot is still shared.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::catalog::Catalogs;
use crate::config::{Config, ConsoleSettings, MissingConfiguration};
use crate::directory::ConsoleState;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::models::{
    ConsoleSnapshot, CreateGroupRequest, CreateMemberRequest, Group, Member, Org, Permission,
    PreferenceValue, ProductConfiguration, ProductKey, ProductPreferences, RevisionInfo,
    ScopeCategory, ScopeFilter, UpdateMemberRequest, SCHEMA_VERSION,
};
use crate::resolver::{self, ProductFilter, ResolvedPermissions};
use crate::store::{ConfigurationStore, PreferenceList};

/// Whose configuration store an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOwner<'a> {
    Member(&'a str),
    Group(&'a str),
}

impl fmt::Display for ConfigOwner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOwner::Member(id) => write!(f, "member {}", id),
            ConfigOwner::Group(id) => write!(f, "group {}", id),
        }
    }
}

#[derive(Debug)]
pub struct Console {
    state: Arc<ConsoleState>,
    catalogs: Catalogs,
    settings: ConsoleSettings,
    revision: RevisionInfo,
}

impl Console {
    /// An empty console for `org`.
    pub fn new(org: Org, catalogs: Catalogs, settings: ConsoleSettings) -> Self {
        Self {
            state: Arc::new(ConsoleState::new(org)),
            catalogs,
            settings,
            revision: RevisionInfo {
                revision_id: 0,
                generated_at: now(),
            },
        }
    }

    /// Start from a snapshot. Ids and scopes are validated the way edits are;
    /// cached member counts are checked against actual membership and corrected.
    pub fn from_snapshot(
        snapshot: ConsoleSnapshot,
        catalogs: Catalogs,
        settings: ConsoleSettings,
    ) -> ConsoleResult<Self> {
        if snapshot.schema_version > SCHEMA_VERSION {
            return Err(ConsoleError::Validation(format!(
                "Snapshot schema version {} is newer than supported version {}",
                snapshot.schema_version, SCHEMA_VERSION
            )));
        }

        let mut state = ConsoleState {
            org: snapshot.org,
            members: snapshot.members,
            groups: snapshot.groups,
        };
        state.validate()?;
        for drift in state.reconcile_member_counts() {
            tracing::warn!(
                "Group {} cached {} members but has {}; corrected",
                drift.group_id,
                drift.cached,
                drift.actual
            );
        }

        tracing::info!(
            "Loaded {} members and {} groups at revision {}",
            state.members.len(),
            state.groups.len(),
            snapshot.revision_id
        );

        Ok(Self {
            state: Arc::new(state),
            catalogs,
            settings,
            revision: RevisionInfo {
                revision_id: snapshot.revision_id,
                generated_at: snapshot.generated_at,
            },
        })
    }

    pub fn from_json(json: &str, catalogs: Catalogs, settings: ConsoleSettings) -> ConsoleResult<Self> {
        let snapshot: ConsoleSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot, catalogs, settings)
    }

    pub fn load(path: &Path, catalogs: Catalogs, settings: ConsoleSettings) -> ConsoleResult<Self> {
        tracing::info!("Loading snapshot from {:?}", path);
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, catalogs, settings)
    }

    /// Start from the configured seed snapshot, or an empty console for `org`
    /// when none is configured.
    pub fn from_config(config: &Config, org: Org) -> ConsoleResult<Self> {
        let catalogs = Catalogs::reference();
        match &config.seed_path {
            Some(path) => Self::load(path, catalogs, config.settings),
            None => Ok(Self::new(org, catalogs, config.settings)),
        }
    }

    // ==================== READ ACCESS ====================

    /// A stable view of the current state, unaffected by later edits.
    pub fn snapshot(&self) -> Arc<ConsoleState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn settings(&self) -> ConsoleSettings {
        self.settings
    }

    pub fn revision(&self) -> &RevisionInfo {
        &self.revision
    }

    pub fn get_member(&self, id: &str) -> Option<&Member> {
        self.state.get_member(id)
    }

    pub fn get_group(&self, id: &str) -> Option<&Group> {
        self.state.get_group(id)
    }

    pub fn configurations(&self, owner: ConfigOwner<'_>) -> Option<&ConfigurationStore> {
        match owner {
            ConfigOwner::Member(id) => self.state.get_member(id).map(|m| &m.product_configurations),
            ConfigOwner::Group(id) => self.state.get_group(id).map(|g| &g.configurations),
        }
    }

    pub fn get_configuration(
        &self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
    ) -> Option<&ProductConfiguration> {
        self.configurations(owner)?.get_configuration(key)
    }

    pub fn export_snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot {
            schema_version: SCHEMA_VERSION,
            generated_at: self.revision.generated_at.clone(),
            revision_id: self.revision.revision_id,
            org: self.state.org.clone(),
            members: self.state.members.clone(),
            groups: self.state.groups.clone(),
        }
    }

    pub fn to_json(&self) -> ConsoleResult<String> {
        Ok(serde_json::to_string_pretty(&self.export_snapshot())?)
    }

    pub fn save(&self, path: &Path) -> ConsoleResult<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(
            "Saved revision {} to {:?}",
            self.revision.revision_id,
            path
        );
        Ok(())
    }

    // ==================== PERMISSION RESOLUTION ====================

    /// Effective permissions of a member, or `None` for an unknown member.
    pub fn resolve_permissions(
        &self,
        member_id: &str,
        products: ProductFilter<'_>,
    ) -> Option<ResolvedPermissions> {
        let member = self.state.get_member(member_id)?;
        Some(resolver::resolve_permissions(
            member,
            self.state.as_ref(),
            products,
            self.settings.group_precedence,
        ))
    }

    // ==================== PRODUCTS ====================

    /// Give `owner` a blank configuration for `key`.
    ///
    /// Enabling a product on a group also grants it to the group's members.
    /// Returns `Ok(false)` when the product is already enabled.
    pub fn enable_product(&mut self, owner: ConfigOwner<'_>, key: ProductKey) -> ConsoleResult<bool> {
        let Some(store) = self.configurations(owner) else {
            return self.missing(owner, key);
        };
        if store.get_configuration(key).is_some() {
            return Ok(false);
        }

        let configuration = self.catalogs.blank_configuration(key);
        let state = Arc::make_mut(&mut self.state);
        match owner {
            ConfigOwner::Member(id) => {
                if let Some(member) = state.get_member_mut(id) {
                    member.product_configurations.insert(configuration);
                }
            }
            ConfigOwner::Group(id) => {
                if let Some(group) = state.get_group_mut(id) {
                    group.configurations.insert(configuration);
                    if !group.grants_product(key) {
                        group.products.push(key);
                    }
                }
            }
        }
        tracing::info!("Enabled {} for {}", key, owner);
        self.bump_revision();
        Ok(true)
    }

    /// Drop `owner`'s configuration for `key`. Absent configurations are a no-op.
    pub fn disable_product(&mut self, owner: ConfigOwner<'_>, key: ProductKey) -> bool {
        if self.get_configuration(owner, key).is_none() {
            return false;
        }

        let state = Arc::make_mut(&mut self.state);
        match owner {
            ConfigOwner::Member(id) => {
                if let Some(member) = state.get_member_mut(id) {
                    member.product_configurations.remove(key);
                }
            }
            ConfigOwner::Group(id) => {
                if let Some(group) = state.get_group_mut(id) {
                    group.configurations.remove(key);
                    group.products.retain(|k| *k != key);
                }
            }
        }
        tracing::info!("Disabled {} for {}", key, owner);
        self.bump_revision();
        true
    }

    // ==================== SCOPE ====================

    pub fn update_scope(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        category: ScopeCategory,
        filters: Vec<ScopeFilter>,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| store.update_scope(key, category, filters))
    }

    pub fn add_filter(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        category: ScopeCategory,
        filter: ScopeFilter,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| store.add_filter(key, category, filter))
    }

    pub fn remove_filter(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        category: ScopeCategory,
        filter_id: &str,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| Ok(store.remove_filter(key, category, filter_id)))
    }

    /// Filters currently selected in one category; empty when unconfigured.
    pub fn list_selected_filters(
        &self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        category: ScopeCategory,
    ) -> &[ScopeFilter] {
        self.get_configuration(owner, key)
            .map(|c| c.scope.filters(category))
            .unwrap_or(&[])
    }

    /// Catalog filters of one category matching `query` and not yet selected.
    pub fn list_available_filters<'a>(
        &'a self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        category: ScopeCategory,
        query: &str,
    ) -> impl Iterator<Item = &'a ScopeFilter> + 'a {
        let selected = self.list_selected_filters(owner, key, category);
        self.catalogs.filters.search(category, selected, query)
    }

    pub fn update_crosswalks(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        crosswalk_ids: &[String],
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| store.update_crosswalks(key, crosswalk_ids))
    }

    pub fn select_crosswalk(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        crosswalk_id: Option<&str>,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| store.select_crosswalk(key, crosswalk_id))
    }

    // ==================== PERMISSIONS ====================

    pub fn update_permissions(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        permissions: Vec<Permission>,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| Ok(store.update_permissions(key, permissions)))
    }

    pub fn add_permission(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        permission: Permission,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| Ok(store.add_permission(key, permission)))
    }

    pub fn remove_permission(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        permission_id: &str,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| Ok(store.remove_permission(key, permission_id)))
    }

    /// Catalog permissions of `key` matching `query` that `owner` does not hold yet.
    pub fn available_permissions<'a>(
        &'a self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        query: &'a str,
    ) -> impl Iterator<Item = &'a Permission> + 'a {
        let assigned = self
            .get_configuration(owner, key)
            .map(|c| c.permissions.permissions.as_slice())
            .unwrap_or(&[]);
        self.catalogs.permissions.search(key, assigned, query)
    }

    // ==================== PREFERENCES ====================

    pub fn update_preferences(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        preferences: ProductPreferences,
    ) -> ConsoleResult<bool> {
        self.edit(owner, key, |store| Ok(store.update_preferences(key, preferences)))
    }

    /// Set one preference from raw input. `Ok(None)` for an unknown preference id.
    pub fn set_preference(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        preference_id: &str,
        raw: &str,
    ) -> ConsoleResult<Option<PreferenceValue>> {
        self.set_entry(owner, key, PreferenceList::Preferences, preference_id, raw)
    }

    /// Set one feature toggle from raw input. `Ok(None)` for an unknown feature id.
    pub fn set_feature(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        feature_id: &str,
        raw: &str,
    ) -> ConsoleResult<Option<PreferenceValue>> {
        self.set_entry(owner, key, PreferenceList::Features, feature_id, raw)
    }

    fn set_entry(
        &mut self,
        owner: ConfigOwner<'_>,
        key: ProductKey,
        list: PreferenceList,
        id: &str,
        raw: &str,
    ) -> ConsoleResult<Option<PreferenceValue>> {
        if self.get_configuration(owner, key).is_none() {
            return self.missing(owner, key).map(|_| None);
        }
        let value = self
            .store_mut(owner)
            .and_then(|store| store.set_preference(key, list, id, raw));
        if value.is_some() {
            self.bump_revision();
        }
        Ok(value)
    }

    // ==================== MEMBERS & GROUPS ====================

    pub fn add_member(&mut self, request: CreateMemberRequest) -> ConsoleResult<Member> {
        let member = Arc::make_mut(&mut self.state).add_member(request)?;
        self.bump_revision();
        Ok(member)
    }

    pub fn update_member(
        &mut self,
        id: &str,
        request: UpdateMemberRequest,
    ) -> ConsoleResult<Option<Member>> {
        if self.state.get_member(id).is_none() {
            return Ok(None);
        }
        let member = Arc::make_mut(&mut self.state).update_member(id, request)?;
        if member.is_some() {
            self.bump_revision();
        }
        Ok(member)
    }

    pub fn create_group(&mut self, request: CreateGroupRequest) -> ConsoleResult<Group> {
        let group = Arc::make_mut(&mut self.state).create_group(request)?;
        self.bump_revision();
        Ok(group)
    }

    pub fn add_member_to_group(&mut self, member_id: &str, group_id: &str) -> bool {
        let joinable = matches!(
            (self.state.get_member(member_id), self.state.get_group(group_id)),
            (Some(member), Some(_)) if !member.is_in_group(group_id)
        );
        if !joinable {
            tracing::debug!("Membership {} -> {} not applied", member_id, group_id);
            return false;
        }
        let applied = Arc::make_mut(&mut self.state).add_member_to_group(member_id, group_id);
        if applied {
            self.bump_revision();
        }
        applied
    }

    pub fn remove_member_from_group(&mut self, member_id: &str, group_id: &str) -> bool {
        let is_member = self
            .state
            .get_member(member_id)
            .is_some_and(|m| m.is_in_group(group_id));
        if !is_member {
            tracing::debug!("Member {} is not in group {}", member_id, group_id);
            return false;
        }
        let applied = Arc::make_mut(&mut self.state).remove_member_from_group(member_id, group_id);
        if applied {
            self.bump_revision();
        }
        applied
    }

    // ==================== INTERNALS ====================

    /// Run `apply` against `owner`'s store when it has a configuration for `key`,
    /// bumping the revision when the edit changed something.
    fn edit<F>(&mut self, owner: ConfigOwner<'_>, key: ProductKey, apply: F) -> ConsoleResult<bool>
    where
        F: FnOnce(&mut ConfigurationStore) -> ConsoleResult<bool>,
    {
        if self.get_configuration(owner, key).is_none() {
            return self.missing(owner, key);
        }
        let applied = match self.store_mut(owner) {
            Some(store) => apply(store)?,
            None => false,
        };
        if applied {
            self.bump_revision();
        }
        Ok(applied)
    }

    fn store_mut(&mut self, owner: ConfigOwner<'_>) -> Option<&mut ConfigurationStore> {
        let state = Arc::make_mut(&mut self.state);
        match owner {
            ConfigOwner::Member(id) => state.get_member_mut(id).map(|m| &mut m.product_configurations),
            ConfigOwner::Group(id) => state.get_group_mut(id).map(|g| &mut g.configurations),
        }
    }

    fn missing(&self, owner: ConfigOwner<'_>, key: ProductKey) -> ConsoleResult<bool> {
        match self.settings.missing_configuration {
            MissingConfiguration::Ignore => {
                tracing::debug!("No {} configuration for {}; not applied", key, owner);
                Ok(false)
            }
            MissingConfiguration::Reject => Err(ConsoleError::NotFound(format!(
                "No {} configuration for {}",
                key, owner
            ))),
        }
    }

    fn bump_revision(&mut self) {
        self.revision.revision_id += 1;
        self.revision.generated_at = now();
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}
