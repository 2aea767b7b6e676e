//! Product catalog keys.

use serde::{Deserialize, Serialize};

/// A product the console can configure access for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductKey {
    ClearContracts,
    Analyze,
    ClaimsPricing,
    CompliancePlus,
    Gfe,
    HospitalPayerData,
    HospitalData,
    NetworkCheck,
    ProvisionsSearch,
    Request,
    Search,
    SearchEnterprise,
    SearchPro,
}

impl ProductKey {
    pub const ALL: [ProductKey; 13] = [
        ProductKey::ClearContracts,
        ProductKey::Analyze,
        ProductKey::ClaimsPricing,
        ProductKey::CompliancePlus,
        ProductKey::Gfe,
        ProductKey::HospitalPayerData,
        ProductKey::HospitalData,
        ProductKey::NetworkCheck,
        ProductKey::ProvisionsSearch,
        ProductKey::Request,
        ProductKey::Search,
        ProductKey::SearchEnterprise,
        ProductKey::SearchPro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKey::ClearContracts => "clear-contracts",
            ProductKey::Analyze => "analyze",
            ProductKey::ClaimsPricing => "claims-pricing",
            ProductKey::CompliancePlus => "compliance-plus",
            ProductKey::Gfe => "gfe",
            ProductKey::HospitalPayerData => "hospital-payer-data",
            ProductKey::HospitalData => "hospital-data",
            ProductKey::NetworkCheck => "network-check",
            ProductKey::ProvisionsSearch => "provisions-search",
            ProductKey::Request => "request",
            ProductKey::Search => "search",
            ProductKey::SearchEnterprise => "search-enterprise",
            ProductKey::SearchPro => "search-pro",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        ProductKey::ALL.into_iter().find(|key| key.as_str() == s)
    }

    /// Display name shown in the console.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProductKey::ClearContracts => "Clear Contracts",
            ProductKey::Analyze => "Analyze",
            ProductKey::ClaimsPricing => "Claims Pricing",
            ProductKey::CompliancePlus => "Compliance +",
            ProductKey::Gfe => "GFE",
            ProductKey::HospitalPayerData => "Hospital and Payer Data",
            ProductKey::HospitalData => "Hospital Data",
            ProductKey::NetworkCheck => "Network Check",
            ProductKey::ProvisionsSearch => "Provisions Search",
            ProductKey::Request => "Request",
            ProductKey::Search => "Search",
            ProductKey::SearchEnterprise => "Search - Enterprise",
            ProductKey::SearchPro => "Search - Pro",
        }
    }
}

impl std::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_as_str() {
        for key in ProductKey::ALL {
            let json = serde_json::to_value(key).unwrap();
            assert_eq!(json, key.as_str());
            assert_eq!(ProductKey::from_str(key.as_str()), Some(key));
        }
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(ProductKey::from_str("clear_contracts"), None);
    }
}
