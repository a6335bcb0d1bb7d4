//! In-memory backend.
//!
//! Holds items in a hash map keyed by (class code, key). It enforces the
//! same rules a protected store would: known class codes, per-class
//! attribute names, a payload size limit, and (class, key) uniqueness.
//! Nothing survives the process.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use zeroize::Zeroizing;

use crate::attributes::Attributes;
use crate::backend::{validate_query, Backend, Record, DEFAULT_MAX_PAYLOAD_LEN};
use crate::identity::Query;
use crate::status::Status;
use crate::time::now_micros;

struct StoredItem {
    attributes: Attributes,
    payload: Zeroizing<Vec<u8>>,
    created_at: u64,
    modified_at: u64,
}

/// Process-local backend.
pub struct MemoryBackend {
    items: RwLock<HashMap<(String, String), StoredItem>>,
    max_payload_len: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }

    /// Payloads longer than `max` are rejected with
    /// [`Status::DATA_TOO_LARGE`].
    pub fn with_max_payload_len(mut self, max: usize) -> Self {
        self.max_payload_len = max;
        self
    }

    /// Number of stored items across all classes.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every item.
    pub fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn slot(query: &Query) -> (String, String) {
        (query.class_code.clone(), query.key.clone())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("items", &self.len())
            .field("max_payload_len", &self.max_payload_len)
            .finish()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn insert(&self, query: &Query, payload: &[u8]) -> Status {
        if let Err(status) = validate_query(query, true) {
            return status;
        }
        if payload.len() > self.max_payload_len {
            return Status::DATA_TOO_LARGE;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let slot = Self::slot(query);
        if items.contains_key(&slot) {
            return Status::DUPLICATE_ITEM;
        }

        let now = now_micros();
        items.insert(
            slot,
            StoredItem {
                attributes: query.attributes.clone(),
                payload: Zeroizing::new(payload.to_vec()),
                created_at: now,
                modified_at: now,
            },
        );
        Status::SUCCESS
    }

    fn lookup(&self, query: &Query, want_payload: bool) -> (Status, Option<Record>) {
        if let Err(status) = validate_query(query, true) {
            return (status, None);
        }

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        match items.get(&Self::slot(query)) {
            Some(item) if item.attributes.matches(&query.attributes) => {
                let record = Record {
                    class_code: query.class_code.clone(),
                    key: query.key.clone(),
                    attributes: item.attributes.clone(),
                    payload: want_payload.then(|| item.payload.clone()),
                    created_at: item.created_at,
                    modified_at: item.modified_at,
                };
                (Status::SUCCESS, Some(record))
            }
            _ => (Status::ITEM_NOT_FOUND, None),
        }
    }

    fn modify(&self, query: &Query, new_payload: &[u8]) -> Status {
        if let Err(status) = validate_query(query, true) {
            return status;
        }
        if new_payload.len() > self.max_payload_len {
            return Status::DATA_TOO_LARGE;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(&Self::slot(query)) {
            Some(item) if item.attributes.matches(&query.attributes) => {
                item.payload = Zeroizing::new(new_payload.to_vec());
                item.modified_at = now_micros();
                Status::SUCCESS
            }
            _ => Status::ITEM_NOT_FOUND,
        }
    }

    fn remove(&self, query: &Query) -> Status {
        if let Err(status) = validate_query(query, true) {
            return status;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let slot = Self::slot(query);
        let matched = items
            .get(&slot)
            .is_some_and(|item| item.attributes.matches(&query.attributes));
        if !matched {
            return Status::ITEM_NOT_FOUND;
        }
        items.remove(&slot);
        Status::SUCCESS
    }

    fn list(&self, query: &Query) -> (Status, Vec<String>) {
        if let Err(status) = validate_query(query, false) {
            return (status, Vec::new());
        }

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = items
            .iter()
            .filter(|((class_code, _), item)| {
                *class_code == query.class_code && item.attributes.matches(&query.attributes)
            })
            .map(|((_, key), _)| key.clone())
            .collect();
        keys.sort();
        (Status::SUCCESS, keys)
    }
}
