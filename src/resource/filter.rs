use super::Searchable;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Search box and category dropdown of a list page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct ListQuery {
    /// Case-insensitive substring matched against the resource's search fields
    #[schema(example = "sara")]
    pub search: Option<String>,
    /// Categorical filter; `all` or empty shows everything
    #[schema(example = "all")]
    pub category: Option<String>,
}

impl ListQuery {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.category().is_none()
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        let text_ok = match self.needle() {
            None => true,
            Some(needle) => item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle)),
        };
        let category_ok = self.category().is_none_or(|c| item.in_category(c));
        text_ok && category_ok
    }
}

/// Records matching `query`, in their original order. Never touches the
/// backend.
pub fn apply<T: Searchable + Clone>(records: &[T], query: &ListQuery) -> Vec<T> {
    if query.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| query.matches(*record))
        .cloned()
        .collect()
}
