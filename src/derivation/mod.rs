// src/derivation/mod.rs
//! Pure functions deriving dashboard aggregates and the table view from the
//! raw collection. Nothing here is cached; callers recompute on every change.

pub mod stats;
pub mod view;

pub use stats::{compute_stats, recent_items, DashboardStats};
pub use view::{compute_view, CategoryFilter, InventoryQuery, QueryPatch};
