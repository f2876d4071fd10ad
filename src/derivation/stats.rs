// src/derivation/stats.rs
use std::collections::HashSet;
use serde::Serialize;

use super::view::{compute_view, InventoryQuery};
use crate::models::InventoryItem;

/// Dashboard aggregates, recomputed from scratch on every call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: usize,
    pub total_value: f64,
    pub low_stock_count: usize,
    pub categories_count: usize,
}

pub fn compute_stats(items: &[InventoryItem]) -> DashboardStats {
    let mut categories = HashSet::new();
    let mut stats = DashboardStats::default();

    for item in items {
        stats.total_items += 1;
        stats.total_value += item.stock_value();
        if item.is_low_stock() {
            stats.low_stock_count += 1;
        }
        categories.insert(item.category.as_str());
    }

    stats.categories_count = categories.len();
    stats
}

/// First `limit` items in store order, shown the way the table shows them by
/// default: most recently updated first.
pub fn recent_items(items: &[InventoryItem], limit: usize) -> Vec<InventoryItem> {
    let head = &items[..limit.min(items.len())];
    compute_view(head, &InventoryQuery::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{seed_items, timestamp_now};
    use chrono::Duration;

    fn item(id: &str, category: &str, quantity: u32, price: f64, threshold: u32) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            category: category.to_string(),
            quantity,
            price,
            min_stock_threshold: threshold,
            last_updated: timestamp_now(),
        }
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(stats.total_value, 0.0);
    }

    #[test]
    fn test_seed_scenario() {
        let stats = compute_stats(&seed_items());
        assert_eq!(stats.total_items, 4);
        // 8 <= 15 and 3 <= 8; 45 > 10 and 12 > 5
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.categories_count, 4);
        let expected = 45.0 * 299.00 + 8.0 * 129.99 + 12.0 * 449.50 + 3.0 * 89.99;
        assert!((stats.total_value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_total_items_matches_len() {
        for n in 0..6 {
            let items: Vec<_> = (0..n).map(|i| item(&i.to_string(), "Furniture", 1, 1.0, 0)).collect();
            assert_eq!(compute_stats(&items).total_items, items.len());
        }
    }

    #[test]
    fn test_low_stock_boundary_inclusive() {
        let items = vec![
            item("eq", "A", 10, 1.0, 10),
            item("above", "A", 11, 1.0, 10),
            item("zero", "A", 0, 1.0, 0),
            item("below", "A", 1, 1.0, 5),
        ];
        assert_eq!(compute_stats(&items).low_stock_count, 3);
    }

    #[test]
    fn test_total_value_sum_of_products() {
        let items = vec![
            item("1", "A", 3, 2.5, 0),
            item("2", "B", 0, 999.0, 0),
            item("3", "B", 10, 0.1, 0),
        ];
        let stats = compute_stats(&items);
        let expected: f64 = items.iter().map(|i| i.price * f64::from(i.quantity)).sum();
        assert_eq!(stats.total_value, expected);
        assert_eq!(stats.categories_count, 2);
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let items = vec![item("1", "Furniture", 1, 1.0, 0), item("2", "furniture", 1, 1.0, 0)];
        assert_eq!(compute_stats(&items).categories_count, 2);
    }

    #[test]
    fn test_recent_items() {
        let items = seed_items();
        let recent = recent_items(&items, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "1");
        assert_eq!(recent_items(&items, 10).len(), 4);
        assert!(recent_items(&[], 5).is_empty());
    }

    #[test]
    fn test_recent_items_put_latest_edit_first() {
        let mut items = seed_items();
        items[3].last_updated = items[3].last_updated + Duration::milliseconds(5);
        let ids: Vec<String> = recent_items(&items, 5).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["4", "1", "2", "3"]);
    }

    #[test]
    fn test_recent_items_slice_before_sorting() {
        let mut items = seed_items();
        // outside the window, so it never shows up however fresh it is
        items[3].last_updated = items[3].last_updated + Duration::seconds(1);
        let ids: Vec<String> = recent_items(&items, 2).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_stats_json_names() {
        let value = serde_json::to_value(compute_stats(&seed_items())).unwrap();
        assert_eq!(value["totalItems"], 4);
        assert_eq!(value["lowStockCount"], 2);
        assert_eq!(value["categoriesCount"], 4);
        assert!(value["totalValue"].is_number());
    }
}
