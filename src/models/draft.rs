// src/models/draft.rs
use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, Utc};

use super::item::InventoryItem;
use crate::error::{ApiError, ApiResult};

// ==================== ITEM DRAFT ====================

/// Add/edit form payload. Numeric fields are signed so that negative input
/// reaches validation instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,

    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    #[validate(range(min = 0, message = "Low stock threshold cannot be negative"))]
    #[serde(default)]
    pub min_stock_threshold: Option<i64>,
}

impl ItemDraft {
    /// Builds the stored item. Call only after the draft passed validation.
    pub fn into_item(self, id: String, now: DateTime<Utc>) -> ApiResult<InventoryItem> {
        let quantity = u32::try_from(self.quantity)
            .map_err(|_| ApiError::validation_failed("quantity"))?;
        let min_stock_threshold = u32::try_from(self.min_stock_threshold.unwrap_or(0))
            .map_err(|_| ApiError::validation_failed("minStockThreshold"))?;

        Ok(InventoryItem {
            id,
            name: self.name.trim().to_string(),
            category: self.category,
            quantity,
            price: self.price,
            min_stock_threshold,
            last_updated: now,
        })
    }
}

impl From<&InventoryItem> for ItemDraft {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: i64::from(item.quantity),
            price: item.price,
            min_stock_threshold: Some(i64::from(item.min_stock_threshold)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::{seed_items, timestamp_now};

    fn draft() -> ItemDraft {
        ItemDraft {
            name: "  Standing Desk ".to_string(),
            category: "Furniture".to_string(),
            quantity: 7,
            price: 420.0,
            min_stock_threshold: None,
        }
    }

    #[test]
    fn test_draft_derive_validation() {
        assert!(draft().validate().is_ok());

        let mut bad = draft();
        bad.name = String::new();
        bad.quantity = -1;
        bad.price = -0.5;
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_into_item_defaults_threshold_and_trims() {
        let now = timestamp_now();
        let item = draft().into_item("abc".to_string(), now).unwrap();
        assert_eq!(item.name, "Standing Desk");
        assert_eq!(item.min_stock_threshold, 0);
        assert_eq!(item.last_updated, now);
    }

    #[test]
    fn test_into_item_rejects_out_of_range() {
        let mut bad = draft();
        bad.quantity = i64::from(u32::MAX) + 1;
        assert!(bad.into_item("x".to_string(), timestamp_now()).is_err());
    }

    #[test]
    fn test_draft_from_item() {
        let item = seed_items().remove(1);
        let d = ItemDraft::from(&item);
        assert_eq!(d.quantity, 8);
        assert_eq!(d.min_stock_threshold, Some(15));
        let rebuilt = d.into_item(item.id.clone(), item.last_updated).unwrap();
        assert_eq!(rebuilt, item);
    }

    #[test]
    fn test_draft_json_camel_case() {
        let d: ItemDraft = serde_json::from_str(
            r#"{"name":"Mouse","category":"Peripherals","quantity":3,"price":19.9,"minStockThreshold":2}"#,
        ).unwrap();
        assert_eq!(d.min_stock_threshold, Some(2));
    }
}
