// src/models/enums.rs
//! Status and selector enums shared by the derivation engine and the shell.

use serde::{Serialize, Deserialize};
use strum::{EnumString, Display, AsRefStr};

/// Generates a status enum with as_str, from_str, is_valid, all_values and Display
macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $str_val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        $vis enum $name {
            $( $variant ),+
        }

        impl $name {
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $str_val ),+
                }
            }

            pub fn from_str(s: &str) -> Option<Self> {
                match s.to_lowercase().as_str() {
                    $( $str_val => Some($name::$variant), )+
                    _ => None,
                }
            }

            #[inline]
            pub fn is_valid(s: &str) -> bool {
                Self::from_str(s).is_some()
            }

            pub const fn all_values() -> &'static [&'static str] {
                &[ $( $str_val ),+ ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_str(s).ok_or_else(|| format!("Invalid {}: '{}'", stringify!($name), s))
            }
        }
    };
}

// ==================== STOCK STATUS ====================

define_status_enum! {
    /// Per-item stock status shown in the table.
    ///
    /// - InStock: quantity above the threshold
    /// - LowStock: quantity at or below the threshold
    /// - OutOfStock: nothing left (takes precedence over LowStock)
    pub enum StockStatus {
        InStock => "in_stock",
        LowStock => "low_stock",
        OutOfStock => "out_of_stock",
    }
}

impl StockStatus {
    pub fn classify(quantity: u32, min_stock_threshold: u32) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

// ==================== SORTING ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Category,
    Quantity,
    Price,
    LastUpdated,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Name,
        SortField::Category,
        SortField::Quantity,
        SortField::Price,
        SortField::LastUpdated,
    ];
}

impl Default for SortField {
    fn default() -> Self {
        SortField::LastUpdated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

// ==================== SHELL ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Inventory,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Executive Dashboard",
            View::Inventory => "Inventory Management",
        }
    }
}

impl Default for View {
    fn default() -> Self {
        View::Dashboard
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum IdFormat {
    /// 9 lowercase base-36 characters
    Short,
    Uuid,
}

impl Default for IdFormat {
    fn default() -> Self {
        IdFormat::Short
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_stock_status_classify() {
        assert_eq!(StockStatus::classify(0, 0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(0, 10), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(10, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(3, 8), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(11, 10), StockStatus::InStock);
    }

    #[test]
    fn test_stock_status_strings() {
        assert_eq!(StockStatus::LowStock.as_str(), "low_stock");
        assert_eq!(StockStatus::from_str("OUT_OF_STOCK"), Some(StockStatus::OutOfStock));
        assert!(StockStatus::is_valid("in_stock"));
        assert!(!StockStatus::is_valid("backordered"));
        assert_eq!(StockStatus::all_values().len(), 3);
        assert_eq!(StockStatus::OutOfStock.display_name(), "Out of Stock");
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!(SortField::from_str("name").unwrap(), SortField::Name);
        assert_eq!(SortField::from_str("lastUpdated").unwrap(), SortField::LastUpdated);
        assert_eq!(SortField::from_str("lastupdated").unwrap(), SortField::LastUpdated);
        assert!(SortField::from_str("password").is_err());
    }

    #[test]
    fn test_sort_field_serde_names() {
        let json = serde_json::to_string(&SortField::LastUpdated).unwrap();
        assert_eq!(json, "\"lastUpdated\"");
        assert_eq!(SortField::LastUpdated.to_string(), "lastUpdated");
    }

    #[test]
    fn test_sort_order_flip() {
        assert_eq!(SortOrder::Asc.flipped(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.flipped().flipped(), SortOrder::Desc);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }

    #[test]
    fn test_view_roundtrip() {
        for view in [View::Dashboard, View::Inventory] {
            let s = view.to_string();
            assert_eq!(View::from_str(&s).unwrap(), view);
        }
        assert!(View::from_str("analytics").is_err());
    }
}
