//! Reference catalogs the console offers selections from.
//!
//! The console never edits these; they describe what can be selected (scope
//! filters per category, code-type crosswalks, permissions per product).

use std::collections::HashMap;

use crate::models::{
    CodeTypeCrosswalk, FilterType, Permission, PreferenceValue, ProductConfiguration, ProductKey,
    ProductPreference, ProductPreferences, ScopeCategory, ScopeFilter,
};
use crate::scope::{self, matches_query};

/// Available scope filters per category.
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    filters: HashMap<ScopeCategory, Vec<ScopeFilter>>,
}

impl FilterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an available filter under the category matching its type.
    pub fn with(mut self, filter: ScopeFilter) -> Self {
        self.filters
            .entry(filter.filter_type.category())
            .or_default()
            .push(filter);
        self
    }

    pub fn available(&self, category: ScopeCategory) -> &[ScopeFilter] {
        self.filters.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Catalog entries matching `query` that are not in `selected`.
    pub fn search<'a>(
        &'a self,
        category: ScopeCategory,
        selected: &'a [ScopeFilter],
        query: &str,
    ) -> impl Iterator<Item = &'a ScopeFilter> + 'a {
        scope::search(self.available(category), selected, query)
    }
}

/// Available permissions per product.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    permissions: HashMap<ProductKey, Vec<Permission>>,
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ProductKey, permissions: Vec<Permission>) -> Self {
        self.permissions.entry(key).or_default().extend(permissions);
        self
    }

    pub fn available(&self, key: ProductKey) -> &[Permission] {
        self.permissions.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Permissions of `key` not yet assigned whose action or item matches `query`.
    pub fn search<'a>(
        &'a self,
        key: ProductKey,
        assigned: &'a [Permission],
        query: &'a str,
    ) -> impl Iterator<Item = &'a Permission> + 'a {
        self.available(key).iter().filter(move |p| {
            !assigned.iter().any(|a| a.id == p.id)
                && (matches_query(&p.action, query) || matches_query(&p.item, query))
        })
    }
}

/// Default features and preferences per product.
#[derive(Debug, Clone, Default)]
pub struct PreferenceCatalog {
    defaults: HashMap<ProductKey, ProductPreferences>,
}

impl PreferenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ProductKey, preferences: ProductPreferences) -> Self {
        self.defaults.insert(key, preferences);
        self
    }

    /// The lists a newly enabled product starts with; empty for unlisted products.
    pub fn defaults(&self, key: ProductKey) -> ProductPreferences {
        self.defaults.get(&key).cloned().unwrap_or_default()
    }
}

/// Everything the console can offer for selection.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub filters: FilterCatalog,
    pub crosswalks: Vec<CodeTypeCrosswalk>,
    pub permissions: PermissionCatalog,
    pub preferences: PreferenceCatalog,
}

impl Catalogs {
    /// A fresh configuration for `key` with the product's default preferences,
    /// carrying the crosswalk catalog for products that interpret claims codes.
    pub fn blank_configuration(&self, key: ProductKey) -> ProductConfiguration {
        let mut configuration = ProductConfiguration::empty(key);
        configuration.preferences = self.preferences.defaults(key);
        if key == ProductKey::ClearContracts {
            configuration.scope.code_type_crosswalks = self.crosswalks.clone();
        }
        configuration
    }

    /// The reference data shipped with the console.
    pub fn reference() -> Self {
        let filters = [
            ("p1", "Banner Health", FilterType::Provider),
            ("p2", "CommonSpirit", FilterType::Provider),
            ("p3", "United Health", FilterType::Provider),
            ("p4", "Banner", FilterType::Provider),
            ("py1", "Aetna", FilterType::Payer),
            ("py2", "Cigna", FilterType::Payer),
            ("py3", "Blue Cross", FilterType::Payer),
            ("pn1", "AL HMO", FilterType::PayerNetwork),
            ("pn2", "AZ PPO", FilterType::PayerNetwork),
            ("pn3", "Blue Choice", FilterType::PayerNetwork),
            ("s1", "AL", FilterType::State),
            ("s2", "AZ", FilterType::State),
            ("s3", "AZ - AL", FilterType::State),
            ("s4", "CA", FilterType::State),
            ("s5", "NY", FilterType::State),
            ("ct1", "Banner Health", FilterType::ContractType),
            ("ct2", "CommonSpirit", FilterType::ContractType),
            ("pl1", "Gold Plan", FilterType::Plan),
            ("pl2", "Silver Plan", FilterType::Plan),
            ("l1", "Active", FilterType::Label),
            ("l2", "Pending", FilterType::Label),
            ("sv1", "L37829", FilterType::Service),
            ("sv2", "L26734", FilterType::Service),
            ("sv3", "S27783", FilterType::Service),
            ("dt1", "Amendment", FilterType::DocumentType),
            ("dt2", "Base Language", FilterType::DocumentType),
        ]
        .into_iter()
        .fold(FilterCatalog::new(), |catalog, (id, name, filter_type)| {
            catalog.with(ScopeFilter::new(id, name, filter_type))
        });

        let crosswalks = vec![
            crosswalk("ctc1", "MS-DRG (Default)", "APR-DRG Codes will be cross walked to MS-DRG", true),
            crosswalk("ctc2", "APR-DRG", "Select to crosswalk MSDRG to APR", false),
            crosswalk("ctc3", "HCPCS", "Healthcare Common Procedure Coding System", false),
            crosswalk("ctc4", "APC", "Ambulatory Payment Classification", false),
        ];

        let clear_contracts = [
            ("cc1", "contract project", "Can add", "contract project", "Allows user to create new contract projects"),
            ("cc2", "contract project", "Can change", "contract project", "Allows user to modify existing contract projects"),
            ("cc3", "contract project", "Can view", "contract project", "Allows user to view contract projects"),
            ("cc4", "contract project", "Can view", "unapproved intake statuses", "Allows user to view unapproved intake statuses"),
            ("cc5", "hierarchical document", "Can add", "hierarchical document", "Allows user to create hierarchical documents"),
        ]
        .into_iter()
        .map(|(id, category, action, item, description)| {
            permission(id, "contracting_platform", category, action, item, description)
        })
        .collect();

        let analyze = [
            ("a1", "ai eval label", "Can export", "ai eval labels", "Allows user to export AI evaluation labels"),
            ("a2", "ai eval label", "Can import", "ai eval labels", "Allows user to import AI evaluation labels"),
            ("a3", "ai eval label", "Can view", "ai eval label", "Allows user to view AI evaluation labels"),
            ("a4", "Al Eval Run", "Can add", "Al Eval Run", "Allows user to create AI evaluation runs"),
            ("a5", "Al Eval Run", "Can change", "Al Eval Run", "Allows user to modify AI evaluation runs"),
            ("a6", "Al Eval Run", "Can delete", "Al Eval Run", "Allows user to delete AI evaluation runs"),
        ]
        .into_iter()
        .map(|(id, category, action, item, description)| {
            permission(id, "ai_evaluation", category, action, item, description)
        })
        .collect();

        let clear_contracts_preferences = ProductPreferences {
            features: vec![
                boolean("cf-doc-1", "enable neural indexing", true),
                boolean("cf-doc-2", "enable auto indexing", false),
                boolean("cf-doc-3", "auto extract rate tables", false),
                boolean("cf-doc-4", "enable AI context", false),
                boolean("cf-doc-5", "enable redacto", false),
                boolean("cf-doc-6", "Clear contracts tag approval workflow", false),
                boolean("cf-doc-7", "Claims Data Schema", false),
                boolean("cf-tag-1", "Clear contracts custom tag templates only", false),
            ],
            preferences: vec![
                boolean("cp-notif-1", "Clear contracts notification on doc upload", false),
                boolean("cp-notif-2", "Clear contracts enable renewal emails", false),
                boolean("cp-org-1", "Clear contracts enable folder view", false),
                boolean("cp-org-2", "Clear contracts rate summary customer", false),
                boolean("cp-org-3", "Clear contracts document hierarchy enabled", false),
                boolean("cp-org-4", "Clear contracts intake statuses", false),
                boolean("cp-lifecycle-1", "Clear contracts renewal dates enabled", false),
                boolean("cp-lifecycle-2", "Renewals MS2", false),
                preference(
                    "cp-system-1",
                    "Upload / select Claims Data Schema",
                    PreferenceValue::String { value: String::new() },
                ),
                preference(
                    "cp-system-2",
                    "Medicare API Rate Limit",
                    PreferenceValue::Number { value: 1000 },
                ),
            ],
        };

        let analyze_preferences = ProductPreferences {
            features: Vec::new(),
            preferences: vec![
                preference(
                    "ap1",
                    "Default Dashboard",
                    PreferenceValue::Select {
                        value: "overview".to_string(),
                        options: ["overview", "detailed", "custom"]
                            .iter()
                            .map(|o| o.to_string())
                            .collect(),
                    },
                ),
                preference("ap2", "Auto-refresh Data", PreferenceValue::Number { value: 300 }),
                boolean("ap3", "Show Advanced Metrics", false),
            ],
        };

        Self {
            filters,
            crosswalks,
            permissions: PermissionCatalog::new()
                .with(ProductKey::ClearContracts, clear_contracts)
                .with(ProductKey::Analyze, analyze),
            preferences: PreferenceCatalog::new()
                .with(ProductKey::ClearContracts, clear_contracts_preferences)
                .with(ProductKey::Analyze, analyze_preferences),
        }
    }
}

fn preference(id: &str, name: &str, value: PreferenceValue) -> ProductPreference {
    ProductPreference {
        id: id.to_string(),
        name: name.to_string(),
        value,
    }
}

fn boolean(id: &str, name: &str, value: bool) -> ProductPreference {
    preference(id, name, PreferenceValue::Boolean { value })
}

fn crosswalk(id: &str, name: &str, description: &str, is_default: bool) -> CodeTypeCrosswalk {
    CodeTypeCrosswalk {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        is_default,
    }
}

fn permission(
    id: &str,
    platform: &str,
    category: &str,
    action: &str,
    item: &str,
    description: &str,
) -> Permission {
    Permission {
        id: id.to_string(),
        platform: platform.to_string(),
        category: category.to_string(),
        action: action.to_string(),
        item: item.to_string(),
        description: description.to_string(),
    }
}
