// src/storage.rs
//! Persistence gateway: a local key-value slot holding the whole collection
//! as one JSON array.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::InventoryItem;
use crate::validator::FieldValidator;

pub const DEFAULT_STORAGE_KEY: &str = "stockflow_inventory_v1";

// ==================== ERRORS ====================

#[derive(Debug)]
pub enum StorageError {
    InvalidKey(String),
    Read(std::io::Error),
    Parse(serde_json::Error),
    Shape(String),
    Write(std::io::Error),
    Encode(serde_json::Error),
}

impl StorageError {
    /// Read-side failures are masked by seeding; write-side ones lose durability.
    pub fn is_read_error(&self) -> bool {
        matches!(self, StorageError::Read(_) | StorageError::Parse(_) | StorageError::Shape(_))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StorageError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            StorageError::Read(err) => write!(f, "Failed to read slot: {}", err),
            StorageError::Parse(err) => write!(f, "Stored payload is not valid JSON: {}", err),
            StorageError::Shape(msg) => write!(f, "Stored payload has invalid shape: {}", msg),
            StorageError::Write(err) => write!(f, "Failed to write slot: {}", err),
            StorageError::Encode(err) => write!(f, "Failed to encode payload: {}", err),
        }
    }
}

impl std::error::Error for StorageError {}

// ==================== KEY ====================

/// Namespaced, versioned slot name. Schema changes migrate by rotating the suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        FieldValidator::storage_key(&key).map_err(StorageError::InvalidKey)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StorageKey {
    fn default() -> Self {
        Self(DEFAULT_STORAGE_KEY.to_string())
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==================== KEY-VALUE BACKENDS ====================

pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &StorageKey) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &StorageKey, value: &str) -> Result<(), StorageError>;

    /// Short human-readable description for startup logs
    fn describe(&self) -> String;
}

/// One file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.root.join(format!("{}.json", key.as_str()))
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn read(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read(err)),
        }
    }

    fn write(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(StorageError::Write)?;

        // temp file in the same directory so the final rename stays on one filesystem
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root).map_err(StorageError::Write)?;
        tmp.write_all(value.as_bytes()).map_err(StorageError::Write)?;
        tmp.as_file().sync_all().map_err(StorageError::Write)?;
        tmp.persist(self.path_for(key))
            .map_err(|e| StorageError::Write(e.error))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file ({})", self.root.display())
    }
}

/// Process-local slots. Can be switched into a failing mode to exercise the
/// write-error path.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_value(key: &StorageKey, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(key.as_str().to_string(), value.into());
        }
        store
    }

    #[cfg(test)]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn raw(&self, key: &StorageKey) -> Option<String> {
        self.slots.lock().ok()?.get(key.as_str()).cloned()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn read(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| {
            StorageError::Read(std::io::Error::new(std::io::ErrorKind::Other, "slot lock poisoned"))
        })?;
        Ok(slots.get(key.as_str()).cloned())
    }

    fn write(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )));
        }
        let mut slots = self.slots.lock().map_err(|_| {
            StorageError::Write(std::io::Error::new(std::io::ErrorKind::Other, "slot lock poisoned"))
        })?;
        slots.insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory (not durable across restarts)".to_string()
    }
}

// ==================== INVENTORY GATEWAY ====================

/// Maps the inventory collection to and from its slot.
pub struct InventoryGateway {
    kv: Box<dyn KeyValueStore>,
    key: StorageKey,
}

impl InventoryGateway {
    pub fn new(kv: Box<dyn KeyValueStore>, key: StorageKey) -> Self {
        Self { kv, key }
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn describe(&self) -> String {
        format!("{} key={}", self.kv.describe(), self.key)
    }

    /// `Ok(None)` when the slot has never been written.
    pub fn load_items(&self) -> Result<Option<Vec<InventoryItem>>, StorageError> {
        let raw = match self.kv.read(&self.key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let items = decode_items(&raw)?;
        Ok(Some(items))
    }

    pub fn save_items(&self, items: &[InventoryItem]) -> Result<(), StorageError> {
        let payload = encode_items(items)?;
        self.kv.write(&self.key, &payload)
    }
}

pub fn encode_items(items: &[InventoryItem]) -> Result<String, StorageError> {
    serde_json::to_string(items).map_err(StorageError::Encode)
}

pub fn decode_items(raw: &str) -> Result<Vec<InventoryItem>, StorageError> {
    let items: Vec<InventoryItem> = serde_json::from_str(raw).map_err(StorageError::Parse)?;
    check_shape(&items)?;
    Ok(items)
}

fn check_shape(items: &[InventoryItem]) -> Result<(), StorageError> {
    let mut seen = HashSet::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        if !seen.insert(item.id.as_str()) {
            return Err(StorageError::Shape(format!("duplicate id '{}' at index {}", item.id, idx)));
        }
        if item.name.trim().is_empty() {
            return Err(StorageError::Shape(format!("item '{}' has an empty name", item.id)));
        }
        if let Err(e) = FieldValidator::price(item.price) {
            return Err(StorageError::Shape(format!("item '{}': {}", item.id, e)));
        }
    }
    Ok(())
}
