// src/store.rs
//! Item store: sole owner of the inventory collection. Every mutation is
//! followed by a full-snapshot write-through.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{seed_items, InventoryItem};
use crate::storage::InventoryGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Where the collection came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    Stored,
    SeedMissing,
    SeedRecovered,
}

/// Durability of the in-memory state. `durable == false` means the last write
/// was rejected and changes since then exist only in this process. A freshly
/// seeded store is durable until a write fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistenceStatus {
    pub durable: bool,
    pub last_error: Option<String>,
    pub last_written_at: Option<DateTime<Utc>>,
    pub writes: u64,
    pub failed_writes: u64,
    pub load_source: LoadSource,
}

pub struct ItemStore {
    items: Vec<InventoryItem>,
    gateway: InventoryGateway,
    persist_empty: bool,
    status: PersistenceStatus,
}

impl ItemStore {
    /// Loads the stored collection, falling back to the seed when the slot is
    /// empty or unreadable. Never fails and never writes.
    pub fn load(gateway: InventoryGateway) -> Self {
        let (items, load_source) = match gateway.load_items() {
            Ok(Some(items)) => {
                log::info!("Loaded {} inventory items from {}", items.len(), gateway.key());
                (items, LoadSource::Stored)
            }
            Ok(None) => {
                log::info!("No stored inventory under {}, using seed collection", gateway.key());
                (seed_items(), LoadSource::SeedMissing)
            }
            Err(err) => {
                if err.is_read_error() {
                    log::error!("Stored inventory is unreadable: {}; using seed collection", err);
                } else {
                    log::error!("Failed to load inventory from storage: {}; using seed collection", err);
                }
                (seed_items(), LoadSource::SeedRecovered)
            }
        };

        Self {
            items,
            gateway,
            persist_empty: true,
            status: PersistenceStatus {
                durable: true,
                last_error: None,
                last_written_at: None,
                writes: 0,
                failed_writes: 0,
                load_source,
            },
        }
    }

    /// With `false`, an empty collection is not written (the snapshot that was
    /// stored before the last delete stays in the slot).
    pub fn with_persist_empty(mut self, persist_empty: bool) -> Self {
        self.persist_empty = persist_empty;
        self
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn persistence_status(&self) -> &PersistenceStatus {
        &self.status
    }

    pub fn gateway(&self) -> &InventoryGateway {
        &self.gateway
    }

    /// Inserts a new item at the front or replaces the one with the same id in
    /// place. `last_updated` is stamped by the caller.
    pub fn upsert(&mut self, item: InventoryItem) -> UpsertOutcome {
        let outcome = match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                *existing = item;
                UpsertOutcome::Replaced
            }
            None => {
                self.items.insert(0, item);
                UpsertOutcome::Inserted
            }
        };
        self.persist();
        outcome
    }

    /// Removes the item with `id`. A missing id is not an error.
    pub fn remove(&mut self, id: &str) -> Option<InventoryItem> {
        let removed = self
            .items
            .iter()
            .position(|item| item.id == id)
            .map(|idx| self.items.remove(idx));
        if removed.is_none() {
            log::debug!("Delete of unknown item '{}' ignored", id);
        }
        self.persist();
        removed
    }

    #[tracing::instrument(level = "debug", skip(self), fields(key = %self.gateway.key(), items = self.items.len()))]
    fn persist(&mut self) {
        if self.items.is_empty() && !self.persist_empty {
            log::warn!("Inventory is empty, skipping write to {}", self.gateway.key());
            return;
        }

        match self.gateway.save_items(&self.items) {
            Ok(()) => {
                self.status.durable = true;
                self.status.last_error = None;
                self.status.last_written_at = Some(Utc::now());
                self.status.writes += 1;
            }
            Err(err) => {
                log::error!("Failed to save inventory to storage: {}", err);
                self.status.durable = false;
                self.status.last_error = Some(err.to_string());
                self.status.failed_writes += 1;
            }
        }
    }
}
