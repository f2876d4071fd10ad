// src/models/item.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, SubsecRound, Utc};
use rand::{thread_rng, Rng};
use uuid::Uuid;

use super::enums::{IdFormat, StockStatus};

/// Categories offered by the add/edit form. Items may carry other values.
pub const CATEGORIES: &[&str] = &[
    "Electronics",
    "Office Supplies",
    "Furniture",
    "Accessories",
    "Peripherals",
];

/// Initial threshold shown by the add form.
pub const DEFAULT_MIN_STOCK_THRESHOLD: u32 = 10;

const SHORT_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ==================== INVENTORY ITEM ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub price: f64,
    pub min_stock_threshold: u32,
    #[serde(with = "iso8601")]
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock_threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::classify(self.quantity, self.min_stock_threshold)
    }

    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Row of the inventory table: the item plus its derived status.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRow {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: StockStatus,
}

impl From<InventoryItem> for ItemRow {
    fn from(item: InventoryItem) -> Self {
        let status = item.status();
        Self { item, status }
    }
}

// ==================== TIMESTAMPS & IDS ====================

/// Current time at millisecond precision, the resolution of the stored ISO string.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Generates an id not rejected by `taken`.
pub fn generate_item_id(format: IdFormat, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = match format {
            IdFormat::Short => short_id(),
            IdFormat::Uuid => Uuid::new_v4().to_string(),
        };
        if !taken(&id) {
            return id;
        }
        log::debug!("Generated item id '{}' collides, retrying", id);
    }
}

fn short_id() -> String {
    let mut rng = thread_rng();
    (0..SHORT_ID_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

// ==================== SEED COLLECTION ====================

/// Fallback collection used when nothing usable is stored.
pub fn seed_items() -> Vec<InventoryItem> {
    let now = timestamp_now();
    let seed = |id: &str, name: &str, category: &str, quantity: u32, price: f64, threshold: u32| {
        InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            price,
            min_stock_threshold: threshold,
            last_updated: now,
        }
    };

    vec![
        seed("1", "Ergonomic Mesh Chair", "Furniture", 45, 299.00, 10),
        seed("2", "Wireless Mechanical Keyboard", "Peripherals", 8, 129.99, 15),
        seed("3", "27\" 4K Monitor", "Electronics", 12, 449.50, 5),
        seed("4", "USB-C Docking Station", "Accessories", 3, 89.99, 8),
    ]
}

/// `lastUpdated` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_item_json_field_names() {
        let item = seed_items().remove(0);
        let value = serde_json::to_value(&item).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["id", "name", "category", "quantity", "price", "minStockThreshold", "lastUpdated"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        let ts = obj["lastUpdated"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn test_collection_roundtrip() {
        let items = seed_items();
        let json = serde_json::to_string(&items).unwrap();
        let back: Vec<InventoryItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn test_parses_browser_iso_string() {
        let json = r#"{"id":"k3j","name":"Desk","category":"Furniture","quantity":2,
            "price":150.5,"minStockThreshold":1,"lastUpdated":"2024-03-05T10:15:30.250Z"}"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.last_updated.timestamp_millis() % 1000, 250);
        assert!(!item.is_low_stock());
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let json = r#"{"id":"x","name":"Desk","category":"Furniture","quantity":-1,
            "price":1.0,"minStockThreshold":1,"lastUpdated":"2024-03-05T10:15:30.250Z"}"#;
        assert!(serde_json::from_str::<InventoryItem>(json).is_err());
    }

    #[test]
    fn test_seed_collection_shape() {
        let items = seed_items();
        assert_eq!(items.len(), 4);
        let categories: HashSet<_> = items.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(categories.len(), 4);
        assert!(categories.iter().all(|c| CATEGORIES.contains(c)));
        let low: Vec<_> = items.iter().filter(|i| i.is_low_stock()).map(|i| i.id.as_str()).collect();
        assert_eq!(low, vec!["2", "4"]);
    }

    #[test]
    fn test_item_row_status() {
        let mut item = seed_items().remove(3);
        assert_eq!(ItemRow::from(item.clone()).status, StockStatus::LowStock);
        item.quantity = 0;
        let row = ItemRow::from(item);
        assert_eq!(row.status, StockStatus::OutOfStock);
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["status"], "out_of_stock");
        assert_eq!(value["id"], "4");
    }

    #[test]
    fn test_generate_short_id() {
        let id = generate_item_id(IdFormat::Short, |_| false);
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generate_uuid_id() {
        let id = generate_item_id(IdFormat::Uuid, |_| false);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_generate_id_skips_taken() {
        let taken = std::cell::Cell::new(0);
        let id = generate_item_id(IdFormat::Short, |_| {
            taken.set(taken.get() + 1);
            taken.get() < 3
        });
        assert_eq!(taken.get(), 3);
        assert_eq!(id.len(), 9);
    }
}
