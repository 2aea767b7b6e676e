//! Scope filter set operations.
//!
//! Each category of a [`ProductScope`] is an insertion-ordered set of filters keyed
//! by filter id. The catalog of available filters is owned elsewhere (see
//! [`crate::catalog::FilterCatalog`]); this module only maintains the selection.

use crate::errors::{ConsoleError, ConsoleResult};
use crate::models::{ProductScope, ScopeCategory, ScopeFilter};

impl ProductScope {
    /// Append `filter` to `category` unless a filter with the same id is already there.
    ///
    /// Returns `Ok(true)` when the filter was appended, `Ok(false)` when it was
    /// already selected.
    pub fn add_filter(&mut self, category: ScopeCategory, filter: ScopeFilter) -> ConsoleResult<bool> {
        check_type(category, &filter)?;

        if self.is_selected(category, &filter.id) {
            tracing::debug!("Filter {} already selected in {}", filter.id, category);
            return Ok(false);
        }
        self.filters_mut(category).push(filter);
        Ok(true)
    }

    /// Remove the filter with `filter_id` from `category`. Absent ids are a no-op.
    pub fn remove_filter(&mut self, category: ScopeCategory, filter_id: &str) -> bool {
        let selected = self.filters_mut(category);
        let before = selected.len();
        selected.retain(|f| f.id != filter_id);
        selected.len() != before
    }

    /// Replace the whole selection of `category`, leaving other categories untouched.
    pub fn replace_filters(
        &mut self,
        category: ScopeCategory,
        filters: Vec<ScopeFilter>,
    ) -> ConsoleResult<()> {
        check_filters(category, &filters)?;
        *self.filters_mut(category) = filters;
        Ok(())
    }

    /// Check every category and the crosswalk selection of a scope built outside
    /// the mutation methods, e.g. one read from a snapshot.
    pub fn validate(&self) -> ConsoleResult<()> {
        for category in ScopeCategory::ALL {
            check_filters(category, self.filters(category))?;
        }
        if let Some(id) = &self.selected_crosswalk {
            if !self.code_type_crosswalks.iter().any(|c| &c.id == id) {
                return Err(ConsoleError::Validation(format!(
                    "Selected crosswalk {} is not in the crosswalk list",
                    id
                )));
            }
        }
        Ok(())
    }

    pub fn is_selected(&self, category: ScopeCategory, filter_id: &str) -> bool {
        self.filters(category).iter().any(|f| f.id == filter_id)
    }
}

fn check_filters(category: ScopeCategory, filters: &[ScopeFilter]) -> ConsoleResult<()> {
    for (i, filter) in filters.iter().enumerate() {
        check_type(category, filter)?;
        if filters[..i].iter().any(|f| f.id == filter.id) {
            return Err(ConsoleError::Validation(format!(
                "Duplicate filter {} in {}",
                filter.id, category
            )));
        }
    }
    Ok(())
}

fn check_type(category: ScopeCategory, filter: &ScopeFilter) -> ConsoleResult<()> {
    if filter.filter_type != category.filter_type() {
        return Err(ConsoleError::Validation(format!(
            "Filter {} has type {:?} and cannot be stored under {}",
            filter.id, filter.filter_type, category
        )));
    }
    Ok(())
}

/// Case-insensitive substring match used by every console search box.
pub fn matches_query(text: &str, query: &str) -> bool {
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
}

/// Lazily yield the entries of `available` that match `query` and are not in `selected`.
pub fn search<'a>(
    available: &'a [ScopeFilter],
    selected: &'a [ScopeFilter],
    query: &str,
) -> impl Iterator<Item = &'a ScopeFilter> + 'a {
    let needle = query.to_lowercase();
    available.iter().filter(move |candidate| {
        !selected.iter().any(|s| s.id == candidate.id)
            && candidate.name.to_lowercase().contains(&needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterType;

    fn provider(id: &str, name: &str) -> ScopeFilter {
        ScopeFilter::new(id, name, FilterType::Provider)
    }

    #[test]
    fn test_add_filter_preserves_insertion_order() {
        let mut scope = ProductScope::default();
        assert!(scope.add_filter(ScopeCategory::Providers, provider("p2", "CommonSpirit")).unwrap());
        assert!(scope.add_filter(ScopeCategory::Providers, provider("p1", "Banner Health")).unwrap());

        let ids: Vec<&str> = scope.providers.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn test_add_filter_dedups_by_id() {
        let mut scope = ProductScope::default();
        scope.add_filter(ScopeCategory::Providers, provider("p1", "Banner Health")).unwrap();
        let added = scope
            .add_filter(ScopeCategory::Providers, provider("p1", "Banner Health (renamed)"))
            .unwrap();

        assert!(!added);
        assert_eq!(scope.providers.len(), 1);
        assert_eq!(scope.providers[0].name, "Banner Health");
        assert!(scope.is_selected(ScopeCategory::Providers, "p1"));
        assert!(!scope.is_selected(ScopeCategory::Payers, "p1"));
    }

    #[test]
    fn test_add_filter_rejects_wrong_category() {
        let mut scope = ProductScope::default();
        let err = scope
            .add_filter(ScopeCategory::Payers, provider("p1", "Banner Health"))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
        assert!(scope.payers.is_empty());
    }

    #[test]
    fn test_remove_filter_is_idempotent() {
        let mut scope = ProductScope::default();
        scope.add_filter(ScopeCategory::Providers, provider("p1", "Banner Health")).unwrap();
        scope.add_filter(ScopeCategory::Providers, provider("p2", "CommonSpirit")).unwrap();

        assert!(scope.remove_filter(ScopeCategory::Providers, "p1"));
        let once = scope.clone();
        assert!(!scope.remove_filter(ScopeCategory::Providers, "p1"));
        assert_eq!(scope, once);
    }

    #[test]
    fn test_replace_rejects_duplicates() {
        let mut scope = ProductScope::default();
        let err = scope
            .replace_filters(
                ScopeCategory::Providers,
                vec![provider("p1", "Banner Health"), provider("p1", "Banner Health")],
            )
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
    }

    #[test]
    fn test_validate_catches_fields_set_directly() {
        let mut scope = ProductScope::default();
        assert!(scope.validate().is_ok());

        scope.providers = vec![provider("p1", "Banner Health"), provider("p1", "Banner Health")];
        assert!(matches!(scope.validate(), Err(ConsoleError::Validation(_))));

        scope.providers = vec![ScopeFilter::new("py1", "Aetna", FilterType::Payer)];
        assert!(scope.validate().is_err());

        scope.providers.clear();
        scope.selected_crosswalk = Some("ctc9".to_string());
        assert!(scope.validate().is_err());
    }

    #[test]
    fn test_search_excludes_selected_and_ignores_case() {
        let available = vec![
            provider("p1", "Banner Health"),
            provider("p2", "CommonSpirit"),
            provider("p4", "Banner"),
        ];
        let selected = vec![provider("p1", "Banner Health")];

        let hits: Vec<&str> = search(&available, &selected, "BANNER")
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(hits, vec!["p4"]);
    }

    #[test]
    fn test_search_empty_query_returns_unselected() {
        let available = vec![provider("p1", "Banner Health"), provider("p2", "CommonSpirit")];
        let selected = vec![provider("p2", "CommonSpirit")];

        assert_eq!(search(&available, &selected, "").count(), 1);
        assert_eq!(search(&[], &selected, "").count(), 0);
    }
}
