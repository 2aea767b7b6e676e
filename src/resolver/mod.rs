//! Permission resolver.
//!
//! Computes a member's effective permission view from the permissions granted by
//! their groups and the permissions assigned directly on their own product
//! configurations. Entries are keyed by the logical
//! `platform-category-action-item` key, never by permission id.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::GroupPrecedence;
use crate::models::{Group, Member, Permission, PermissionKey, ProductKey};

/// Source label used for permissions assigned on the member itself.
pub const DIRECT_ASSIGNMENT: &str = "Direct Assignment";

/// Lookup of groups by id.
pub trait GroupDirectory {
    fn group(&self, group_id: &str) -> Option<&Group>;
}

impl GroupDirectory for [Group] {
    fn group(&self, group_id: &str) -> Option<&Group> {
        self.iter().find(|g| g.id == group_id)
    }
}

impl GroupDirectory for Vec<Group> {
    fn group(&self, group_id: &str) -> Option<&Group> {
        self.as_slice().group(group_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Direct,
    Group,
}

/// A permission annotated with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPermission {
    #[serde(flatten)]
    pub permission: Permission,
    pub source: String,
    pub source_type: SourceType,
    /// A group also granted this key and the direct assignment replaced it
    pub is_overridden: bool,
}

/// Which products to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFilter<'a> {
    All,
    Only(&'a [ProductKey]),
}

impl ProductFilter<'_> {
    fn includes(&self, key: ProductKey) -> bool {
        match self {
            ProductFilter::All => true,
            ProductFilter::Only(keys) => keys.contains(&key),
        }
    }
}

/// The resolved view. Order is inherited entries first, then direct entries
/// that did not replace an inherited one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedPermissions {
    entries: Vec<ResolvedPermission>,
}

impl ResolvedPermissions {
    pub fn entries(&self) -> &[ResolvedPermission] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ResolvedPermission> {
        self.entries
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn direct_count(&self) -> usize {
        self.count_of(SourceType::Direct)
    }

    pub fn inherited_count(&self) -> usize {
        self.count_of(SourceType::Group)
    }

    pub fn override_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_overridden).count()
    }

    fn count_of(&self, source_type: SourceType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.source_type == source_type)
            .count()
    }

    pub fn get(&self, key: &PermissionKey) -> Option<&ResolvedPermission> {
        self.entries.iter().find(|e| &e.permission.logical_key() == key)
    }

    /// Group entries by platform, platforms in order of first appearance.
    pub fn by_platform(&self) -> Vec<(&str, Vec<&ResolvedPermission>)> {
        let mut groups: Vec<(&str, Vec<&ResolvedPermission>)> = Vec::new();
        for entry in &self.entries {
            let platform = entry.permission.platform.as_str();
            match groups.iter_mut().find(|(p, _)| *p == platform) {
                Some((_, list)) => list.push(entry),
                None => groups.push((platform, vec![entry])),
            }
        }
        groups
    }
}

/// Insertion-ordered map keyed by logical permission key.
#[derive(Default)]
struct KeyedPermissions {
    index: HashMap<PermissionKey, usize>,
    entries: Vec<ResolvedPermission>,
}

impl KeyedPermissions {
    fn contains(&self, key: &PermissionKey) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace. A replaced entry keeps its original position.
    fn set(&mut self, key: PermissionKey, entry: ResolvedPermission) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

/// Permissions a group grants for the selected products.
fn group_grants<'g>(
    group: &'g Group,
    products: ProductFilter<'_>,
) -> impl Iterator<Item = &'g Permission> + 'g {
    let granted: Vec<ProductKey> = group
        .products
        .iter()
        .copied()
        .filter(|key| products.includes(*key))
        .collect();
    group
        .configurations
        .iter()
        .filter(move |c| granted.contains(&c.key))
        .flat_map(|c| c.permissions.permissions.iter())
}

/// Resolve the effective permissions of `member`.
///
/// Group ids that do not resolve through `groups` are skipped.
pub fn resolve_permissions<D>(
    member: &Member,
    groups: &D,
    products: ProductFilter<'_>,
    precedence: GroupPrecedence,
) -> ResolvedPermissions
where
    D: GroupDirectory + ?Sized,
{
    let mut inherited = KeyedPermissions::default();
    for group_id in &member.group_ids {
        let Some(group) = groups.group(group_id) else {
            tracing::debug!("Skipping unknown group {} for member {}", group_id, member.id);
            continue;
        };
        for permission in group_grants(group, products) {
            let key = permission.logical_key();
            if precedence == GroupPrecedence::FirstWins && inherited.contains(&key) {
                continue;
            }
            inherited.set(
                key,
                ResolvedPermission {
                    permission: permission.clone(),
                    source: group.name.clone(),
                    source_type: SourceType::Group,
                    is_overridden: false,
                },
            );
        }
    }

    let mut direct = KeyedPermissions::default();
    for configuration in member.product_configurations.iter() {
        if !products.includes(configuration.key) {
            continue;
        }
        for permission in &configuration.permissions.permissions {
            direct.set(
                permission.logical_key(),
                ResolvedPermission {
                    permission: permission.clone(),
                    source: DIRECT_ASSIGNMENT.to_string(),
                    source_type: SourceType::Direct,
                    is_overridden: false,
                },
            );
        }
    }

    let overrides: Vec<bool> = direct
        .entries
        .iter()
        .map(|e| inherited.contains(&e.permission.logical_key()))
        .collect();

    let mut merged = KeyedPermissions {
        index: inherited.index,
        entries: inherited.entries,
    };
    for (mut entry, is_overridden) in direct.entries.into_iter().zip(overrides) {
        entry.is_overridden = is_overridden;
        merged.set(entry.permission.logical_key(), entry);
    }

    let resolved = ResolvedPermissions {
        entries: merged.entries,
    };
    tracing::debug!(
        "Resolved {} permissions for member {} ({} direct, {} inherited, {} overridden)",
        resolved.total(),
        member.id,
        resolved.direct_count(),
        resolved.inherited_count(),
        resolved.override_count()
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, MemberRole, ProductConfiguration, RoleLevel};
    use crate::store::ConfigurationStore;
    use chrono::NaiveDate;

    fn permission(id: &str, platform: &str, action: &str, item: &str) -> Permission {
        Permission {
            id: id.to_string(),
            platform: platform.to_string(),
            category: "Documents".to_string(),
            action: action.to_string(),
            item: item.to_string(),
            description: String::new(),
        }
    }

    fn store(key: ProductKey, permissions: Vec<Permission>) -> ConfigurationStore {
        let mut store = ConfigurationStore::new();
        let mut config = ProductConfiguration::empty(key);
        config.permissions.permissions = permissions;
        store.insert(config);
        store
    }

    fn group(id: &str, name: &str, products: Vec<ProductKey>, grants: ConfigurationStore) -> Group {
        Group {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            member_count: 1,
            products,
            role_level: RoleLevel::Viewer,
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            configurations: grants,
        }
    }

    fn member(group_ids: &[&str], direct: ConfigurationStore) -> Member {
        Member {
            id: "m1".to_string(),
            org_id: "org".to_string(),
            name: "John Smith".to_string(),
            email: "john@example.com".to_string(),
            role: MemberRole::Negotiator,
            department: Department::Sales,
            external: false,
            product_configurations: direct,
            group_ids: group_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_member_resolves_to_nothing() {
        let groups: Vec<Group> = Vec::new();
        let resolved = resolve_permissions(
            &member(&[], ConfigurationStore::new()),
            &groups,
            ProductFilter::All,
            GroupPrecedence::LastWins,
        );
        assert!(resolved.is_empty());
        assert_eq!(resolved.total(), 0);
        assert_eq!(resolved.override_count(), 0);
    }

    #[test]
    fn test_direct_overrides_inherited() {
        let groups = vec![group(
            "g1",
            "CC - Admin",
            vec![ProductKey::ClearContracts],
            store(
                ProductKey::ClearContracts,
                vec![
                    permission("group-1", "Clear Contracts", "View", "All Documents"),
                    permission("group-2", "Clear Contracts", "Export", "Reports"),
                ],
            ),
        )];
        let m = member(
            &["g1"],
            store(
                ProductKey::ClearContracts,
                vec![permission("cc9", "Clear Contracts", "View", "All Documents")],
            ),
        );

        let resolved = resolve_permissions(&m, &groups, ProductFilter::All, GroupPrecedence::LastWins);

        assert_eq!(resolved.total(), 2);
        let first = &resolved.entries()[0];
        assert_eq!(first.permission.id, "cc9");
        assert_eq!(first.source_type, SourceType::Direct);
        assert_eq!(first.source, DIRECT_ASSIGNMENT);
        assert!(first.is_overridden);
        assert_eq!(resolved.direct_count(), 1);
        assert_eq!(resolved.inherited_count(), 1);
        assert_eq!(resolved.override_count(), 1);

        let ids: Vec<String> = resolved.into_entries().into_iter().map(|e| e.permission.id).collect();
        assert_eq!(ids, vec!["cc9".to_string(), "group-2".to_string()]);
    }

    #[test]
    fn test_group_collision_precedence() {
        let grant = |id: &str| {
            store(
                ProductKey::Analyze,
                vec![permission(id, "Analyze", "View", "Dashboard")],
            )
        };
        let groups = vec![
            group("g2", "Analyze - Editor", vec![ProductKey::Analyze], grant("from-g2")),
            group("g3", "Analyze - Viewer", vec![ProductKey::Analyze], grant("from-g3")),
        ];
        let m = member(&["g2", "g3"], ConfigurationStore::new());

        let last = resolve_permissions(&m, &groups, ProductFilter::All, GroupPrecedence::LastWins);
        assert_eq!(last.total(), 1);
        assert_eq!(last.entries()[0].source, "Analyze - Viewer");

        let first = resolve_permissions(&m, &groups, ProductFilter::All, GroupPrecedence::FirstWins);
        assert_eq!(first.entries()[0].source, "Analyze - Editor");
    }

    #[test]
    fn test_dangling_group_is_skipped() {
        let groups = vec![group(
            "g1",
            "CC - Admin",
            vec![ProductKey::ClearContracts],
            store(
                ProductKey::ClearContracts,
                vec![permission("group-1", "Clear Contracts", "View", "All Documents")],
            ),
        )];
        let m = member(&["missing", "g1"], ConfigurationStore::new());

        let resolved = resolve_permissions(&m, &groups, ProductFilter::All, GroupPrecedence::LastWins);
        assert_eq!(resolved.total(), 1);
        assert_eq!(resolved.inherited_count(), 1);
    }

    #[test]
    fn test_group_grants_limited_to_granted_products() {
        let mut grants = store(
            ProductKey::ClearContracts,
            vec![permission("group-1", "Clear Contracts", "View", "All Documents")],
        );
        grants.insert({
            let mut c = ProductConfiguration::empty(ProductKey::Analyze);
            c.permissions.permissions = vec![permission("group-3", "Analyze", "View", "Dashboard")];
            c
        });
        let groups = vec![group("g1", "CC - Admin", vec![ProductKey::ClearContracts], grants)];
        let m = member(&["g1"], ConfigurationStore::new());

        let resolved = resolve_permissions(&m, &groups, ProductFilter::All, GroupPrecedence::LastWins);
        assert_eq!(resolved.total(), 1);
        assert_eq!(resolved.entries()[0].permission.id, "group-1");
    }

    #[test]
    fn test_product_filter_and_platform_projection() {
        let mut direct = store(
            ProductKey::ClearContracts,
            vec![
                permission("cc1", "contracting_platform", "Can add", "contract project"),
                permission("cc3", "contracting_platform", "Can view", "contract project"),
            ],
        );
        direct.insert({
            let mut c = ProductConfiguration::empty(ProductKey::Analyze);
            c.permissions.permissions =
                vec![permission("a1", "ai_evaluation", "Can export", "ai eval labels")];
            c
        });
        let groups: Vec<Group> = Vec::new();
        let m = member(&[], direct);

        let all = resolve_permissions(&m, &groups, ProductFilter::All, GroupPrecedence::LastWins);
        let platforms: Vec<(&str, usize)> = all
            .by_platform()
            .into_iter()
            .map(|(p, list)| (p, list.len()))
            .collect();
        assert_eq!(
            platforms,
            vec![("contracting_platform", 2), ("ai_evaluation", 1)]
        );

        let only = [ProductKey::Analyze];
        let analyze = resolve_permissions(
            &m,
            &groups,
            ProductFilter::Only(&only),
            GroupPrecedence::LastWins,
        );
        assert_eq!(analyze.total(), 1);
        assert_eq!(analyze.entries()[0].permission.id, "a1");
    }

    #[test]
    fn test_serialized_view_is_flat() {
        let groups: Vec<Group> = Vec::new();
        let m = member(
            &[],
            store(
                ProductKey::ClearContracts,
                vec![permission("cc1", "contracting_platform", "Can add", "contract project")],
            ),
        );
        let resolved = resolve_permissions(&m, &groups, ProductFilter::All, GroupPrecedence::LastWins);
        let value = serde_json::to_value(&resolved.entries()[0]).unwrap();
        assert_eq!(value["id"], "cc1");
        assert_eq!(value["sourceType"], "direct");
        assert_eq!(value["isOverridden"], false);
    }
}
