// src/session.rs
//! UI state owned by the presentation shell: the table query and the active view.

use serde::Serialize;

use crate::derivation::{InventoryQuery, QueryPatch};
use crate::models::{SortField, View};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSession {
    pub query: InventoryQuery,
    pub view: View,
}

impl ShellSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, patch: QueryPatch) -> &InventoryQuery {
        self.query.apply_patch(patch);
        &self.query
    }

    pub fn reset_query(&mut self) -> &InventoryQuery {
        self.query = InventoryQuery::default();
        &self.query
    }

    pub fn toggle_sort(&mut self, field: SortField) -> &InventoryQuery {
        self.query.toggle_sort(field);
        &self.query
    }

    pub fn change_view(&mut self, view: View) -> View {
        if self.view != view {
            log::debug!("Switching view {} -> {}", self.view, view);
        }
        self.view = view;
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::CategoryFilter;
    use crate::models::SortOrder;

    #[test]
    fn test_new_session_defaults() {
        let session = ShellSession::new();
        assert_eq!(session.view, View::Dashboard);
        assert_eq!(session.query, InventoryQuery::default());
    }

    #[test]
    fn test_set_query_is_partial() {
        let mut session = ShellSession::new();
        session.set_query(QueryPatch {
            search_term: Some("desk".to_string()),
            ..Default::default()
        });
        session.set_query(QueryPatch {
            category_filter: Some(CategoryFilter::from("Furniture")),
            ..Default::default()
        });
        assert_eq!(session.query.search_term, "desk");
        assert_eq!(session.query.category_filter, CategoryFilter::Only("Furniture".to_string()));
        assert_eq!(session.query.sort_field, SortField::LastUpdated);

        session.reset_query();
        assert_eq!(session.query, InventoryQuery::default());
    }

    #[test]
    fn test_toggle_sort_through_session() {
        let mut session = ShellSession::new();
        let q = session.toggle_sort(SortField::LastUpdated);
        assert_eq!(q.sort_order, SortOrder::Asc);
        let q = session.toggle_sort(SortField::Category);
        assert_eq!((q.sort_field, q.sort_order), (SortField::Category, SortOrder::Desc));
    }

    #[test]
    fn test_change_view() {
        let mut session = ShellSession::new();
        assert_eq!(session.change_view(View::Inventory), View::Inventory);
        assert_eq!(session.view.title(), "Inventory Management");
    }
}
