// src/derivation/view.rs
//! Filtered and sorted table view over the raw collection.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{InventoryItem, SortField, SortOrder};

pub const ALL_CATEGORIES: &str = "All";

// ==================== CATEGORY FILTER ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        CategoryFilter::All
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        if value == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value)
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        CategoryFilter::from(value.to_string())
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Only(category) => category,
        }
    }
}

// ==================== QUERY ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryQuery {
    pub search_term: String,
    pub category_filter: CategoryFilter,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for InventoryQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            category_filter: CategoryFilter::All,
            sort_field: SortField::LastUpdated,
            sort_order: SortOrder::Desc,
        }
    }
}

/// Partial query update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPatch {
    pub search_term: Option<String>,
    pub category_filter: Option<CategoryFilter>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl QueryPatch {
    pub fn is_empty(&self) -> bool {
        self.search_term.is_none()
            && self.category_filter.is_none()
            && self.sort_field.is_none()
            && self.sort_order.is_none()
    }
}

impl InventoryQuery {
    pub fn apply_patch(&mut self, patch: QueryPatch) {
        if let Some(search_term) = patch.search_term {
            self.search_term = search_term;
        }
        if let Some(category_filter) = patch.category_filter {
            self.category_filter = category_filter;
        }
        if let Some(sort_field) = patch.sort_field {
            self.sort_field = sort_field;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
    }

    pub fn patched(&self, patch: QueryPatch) -> Self {
        let mut query = self.clone();
        query.apply_patch(patch);
        query
    }

    /// Column header click: the active column flips its order, any other
    /// column becomes active in descending order.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Desc;
        }
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        let needle = self.search_term.to_lowercase();
        let matches_search = item.name.to_lowercase().contains(&needle)
            || item.id.to_lowercase().contains(&needle);
        matches_search && self.category_filter.matches(&item.category)
    }
}

// ==================== VIEW ====================

/// Items passing the filter, stably sorted. Ties keep collection order in
/// both directions.
pub fn compute_view(items: &[InventoryItem], query: &InventoryQuery) -> Vec<InventoryItem> {
    let mut view: Vec<InventoryItem> = items
        .iter()
        .filter(|item| query.matches(item))
        .cloned()
        .collect();

    view.sort_by(|a, b| {
        let ordering = compare_by_field(a, b, query.sort_field);
        match query.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    view
}

pub fn compare_by_field(a: &InventoryItem, b: &InventoryItem, field: SortField) -> Ordering {
    match field {
        SortField::Name => locale_compare(&a.name, &b.name),
        SortField::Category => locale_compare(&a.category, &b.category),
        SortField::Quantity => a.quantity.cmp(&b.quantity),
        SortField::Price => a.price.total_cmp(&b.price),
        // same order as comparing the fixed-width ISO strings
        SortField::LastUpdated => a.last_updated.cmp(&b.last_updated),
    }
}

/// Collation close to a browser's default `localeCompare`: letters compare
/// with accents and case folded first, then unaccented before accented, then
/// lowercase before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = base_letters(a).cmp(base_letters(b));
    if primary != Ordering::Equal {
        return primary;
    }

    let accents = a
        .nfd()
        .flat_map(char::to_lowercase)
        .cmp(b.nfd().flat_map(char::to_lowercase));
    if accents != Ordering::Equal {
        return accents;
    }

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }

    a.cmp(b)
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}
