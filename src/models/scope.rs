//! Scope filter model matching the console's ProductScope interface.

use serde::{Deserialize, Deserializer, Serialize};

/// The kind tag carried by a scope filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    Provider,
    Payer,
    PayerNetwork,
    State,
    ContractType,
    Plan,
    Label,
    Service,
    DocumentType,
}

impl FilterType {
    /// The category filters of this type are stored under.
    pub fn category(&self) -> ScopeCategory {
        match self {
            FilterType::Provider => ScopeCategory::Providers,
            FilterType::Payer => ScopeCategory::Payers,
            FilterType::PayerNetwork => ScopeCategory::PayerNetworks,
            FilterType::State => ScopeCategory::States,
            FilterType::ContractType => ScopeCategory::ContractTypes,
            FilterType::Plan => ScopeCategory::Plans,
            FilterType::Label => ScopeCategory::Labels,
            FilterType::Service => ScopeCategory::Services,
            FilterType::DocumentType => ScopeCategory::DocumentTypes,
        }
    }
}

/// A named collection of filters inside a product scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeCategory {
    Providers,
    Payers,
    PayerNetworks,
    States,
    ContractTypes,
    Plans,
    Labels,
    Services,
    DocumentTypes,
}

impl ScopeCategory {
    pub const ALL: [ScopeCategory; 9] = [
        ScopeCategory::Providers,
        ScopeCategory::Payers,
        ScopeCategory::PayerNetworks,
        ScopeCategory::States,
        ScopeCategory::ContractTypes,
        ScopeCategory::Plans,
        ScopeCategory::Labels,
        ScopeCategory::Services,
        ScopeCategory::DocumentTypes,
    ];

    /// The only filter type that may be stored under this category.
    pub fn filter_type(&self) -> FilterType {
        match self {
            ScopeCategory::Providers => FilterType::Provider,
            ScopeCategory::Payers => FilterType::Payer,
            ScopeCategory::PayerNetworks => FilterType::PayerNetwork,
            ScopeCategory::States => FilterType::State,
            ScopeCategory::ContractTypes => FilterType::ContractType,
            ScopeCategory::Plans => FilterType::Plan,
            ScopeCategory::Labels => FilterType::Label,
            ScopeCategory::Services => FilterType::Service,
            ScopeCategory::DocumentTypes => FilterType::DocumentType,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeCategory::Providers => "providers",
            ScopeCategory::Payers => "payers",
            ScopeCategory::PayerNetworks => "payerNetworks",
            ScopeCategory::States => "states",
            ScopeCategory::ContractTypes => "contractTypes",
            ScopeCategory::Plans => "plans",
            ScopeCategory::Labels => "labels",
            ScopeCategory::Services => "services",
            ScopeCategory::DocumentTypes => "documentTypes",
        }
    }
}

impl std::fmt::Display for ScopeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, categorized tag restricting what data a configuration applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
}

impl ScopeFilter {
    pub fn new(id: impl Into<String>, name: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            filter_type,
        }
    }
}

/// A selectable code-mapping scheme applied to a product's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTypeCrosswalk {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

/// Per-product data scope: nine filter categories plus the crosswalk selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductScope {
    #[serde(default)]
    pub providers: Vec<ScopeFilter>,
    #[serde(default)]
    pub payers: Vec<ScopeFilter>,
    #[serde(default)]
    pub payer_networks: Vec<ScopeFilter>,
    #[serde(default)]
    pub states: Vec<ScopeFilter>,
    #[serde(default)]
    pub contract_types: Vec<ScopeFilter>,
    #[serde(default)]
    pub plans: Vec<ScopeFilter>,
    #[serde(default)]
    pub labels: Vec<ScopeFilter>,
    #[serde(default)]
    pub services: Vec<ScopeFilter>,
    #[serde(default)]
    pub document_types: Vec<ScopeFilter>,
    #[serde(default)]
    pub code_type_crosswalks: Vec<CodeTypeCrosswalk>,
    /// Single selection. Older snapshots stored a `selectedCrosswalks` list;
    /// its first entry is taken on load.
    #[serde(
        default,
        alias = "selectedCrosswalks",
        deserialize_with = "crosswalk_selection",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_crosswalk: Option<String>,
}

impl ProductScope {
    pub fn filters(&self, category: ScopeCategory) -> &[ScopeFilter] {
        match category {
            ScopeCategory::Providers => &self.providers,
            ScopeCategory::Payers => &self.payers,
            ScopeCategory::PayerNetworks => &self.payer_networks,
            ScopeCategory::States => &self.states,
            ScopeCategory::ContractTypes => &self.contract_types,
            ScopeCategory::Plans => &self.plans,
            ScopeCategory::Labels => &self.labels,
            ScopeCategory::Services => &self.services,
            ScopeCategory::DocumentTypes => &self.document_types,
        }
    }

    pub(crate) fn filters_mut(&mut self, category: ScopeCategory) -> &mut Vec<ScopeFilter> {
        match category {
            ScopeCategory::Providers => &mut self.providers,
            ScopeCategory::Payers => &mut self.payers,
            ScopeCategory::PayerNetworks => &mut self.payer_networks,
            ScopeCategory::States => &mut self.states,
            ScopeCategory::ContractTypes => &mut self.contract_types,
            ScopeCategory::Plans => &mut self.plans,
            ScopeCategory::Labels => &mut self.labels,
            ScopeCategory::Services => &mut self.services,
            ScopeCategory::DocumentTypes => &mut self.document_types,
        }
    }

    /// The selected crosswalk, or the one flagged as default when nothing is selected.
    pub fn effective_crosswalk(&self) -> Option<&CodeTypeCrosswalk> {
        match &self.selected_crosswalk {
            Some(id) => self.code_type_crosswalks.iter().find(|c| &c.id == id),
            None => self.code_type_crosswalks.iter().find(|c| c.is_default),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CrosswalkSelection {
    Single(String),
    Legacy(Vec<String>),
}

fn crosswalk_selection<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let selection = Option::<CrosswalkSelection>::deserialize(deserializer)?;
    Ok(match selection {
        Some(CrosswalkSelection::Single(id)) => Some(id),
        Some(CrosswalkSelection::Legacy(ids)) => ids.into_iter().next(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_types_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for category in ScopeCategory::ALL {
            assert!(seen.insert(category.filter_type()));
            assert_eq!(category.filter_type().category(), category);
        }
    }

    #[test]
    fn test_filter_wire_shape() {
        let filter = ScopeFilter::new("pn1", "AL HMO", FilterType::PayerNetwork);
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value, json!({"id": "pn1", "name": "AL HMO", "type": "payer-network"}));
    }

    #[test]
    fn test_legacy_crosswalk_list_takes_first() {
        let scope: ProductScope = serde_json::from_value(json!({
            "providers": [],
            "selectedCrosswalks": ["ctc1", "ctc3"]
        }))
        .unwrap();
        assert_eq!(scope.selected_crosswalk.as_deref(), Some("ctc1"));

        let empty: ProductScope =
            serde_json::from_value(json!({ "selectedCrosswalks": [] })).unwrap();
        assert_eq!(empty.selected_crosswalk, None);
    }

    #[test]
    fn test_single_crosswalk_round_trips() {
        let scope = ProductScope {
            selected_crosswalk: Some("ctc2".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&scope).unwrap();
        assert_eq!(value["selectedCrosswalk"], "ctc2");
        let back: ProductScope = serde_json::from_value(value).unwrap();
        assert_eq!(back, scope);
    }

    #[test]
    fn test_effective_crosswalk_falls_back_to_default() {
        let mut scope = ProductScope {
            code_type_crosswalks: vec![
                CodeTypeCrosswalk {
                    id: "ctc1".to_string(),
                    name: "MS-DRG (Default)".to_string(),
                    description: String::new(),
                    is_default: true,
                },
                CodeTypeCrosswalk {
                    id: "ctc2".to_string(),
                    name: "APR-DRG".to_string(),
                    description: String::new(),
                    is_default: false,
                },
            ],
            ..Default::default()
        };
        assert_eq!(scope.effective_crosswalk().map(|c| c.id.as_str()), Some("ctc1"));

        scope.selected_crosswalk = Some("ctc2".to_string());
        assert_eq!(scope.effective_crosswalk().map(|c| c.id.as_str()), Some("ctc2"));
    }
}
