//! Storage manager — the CRUD engine.
//!
//! [`StorageManager`] turns typed values and [`Identity`] addresses into
//! backend queries, calls the backend, and translates every status it gets
//! back into the [`KeychainError`] taxonomy. It is the only component that
//! talks to a [`Backend`].
//!
//! The manager holds no per-call state. Its default attribute set is fixed
//! at construction, so one instance can be shared (behind an `Arc`) by any
//! number of bindings and threads.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::attributes::Attributes;
use crate::backend::{Backend, Record};
use crate::codec::{Codec, JsonCodec};
use crate::config::KeychainConfig;
use crate::error::{KeychainError, Result};
use crate::identity::{Identity, Query};
use crate::item_class::ItemClass;
use crate::time::micros_to_rfc3339;

/// Metadata of a stored item, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub class: ItemClass,
    pub key: String,
    pub attributes: Attributes,
    /// Unix epoch microseconds.
    pub created_at: u64,
    /// Unix epoch microseconds.
    pub modified_at: u64,
}

impl ItemRecord {
    pub fn created_at_rfc3339(&self) -> String {
        micros_to_rfc3339(self.created_at)
    }

    pub fn modified_at_rfc3339(&self) -> String {
        micros_to_rfc3339(self.modified_at)
    }
}

/// Typed CRUD over a [`Backend`].
pub struct StorageManager<C: Codec = JsonCodec> {
    backend: Arc<dyn Backend>,
    codec: C,
    default_attributes: Attributes,
}

impl StorageManager<JsonCodec> {
    /// Manager with the JSON codec and no default attributes.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_codec(backend, JsonCodec)
    }

    /// Manager with the JSON codec and the defaults described by `config`.
    pub fn from_config(backend: Arc<dyn Backend>, config: &KeychainConfig) -> Self {
        Self::new(backend).with_default_attributes(config.to_attributes())
    }
}

impl<C: Codec> StorageManager<C> {
    pub fn with_codec(backend: Arc<dyn Backend>, codec: C) -> Self {
        Self {
            backend,
            codec,
            default_attributes: Attributes::new(),
        }
    }

    /// Replace the default attribute set attached to every query.
    pub fn with_default_attributes(mut self, attributes: Attributes) -> Self {
        self.default_attributes = attributes;
        self
    }

    pub fn default_attributes(&self) -> &Attributes {
        &self.default_attributes
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn query(&self, identity: &Identity) -> Query {
        let query = identity.to_query(&self.default_attributes);
        log::trace!(
            "query {identity}: {} attribute(s) after merging defaults",
            query.attributes.len()
        );
        query
    }

    // ── CRUD ──────────────────────────────────────────────────────────────────

    /// Store a new item.
    ///
    /// # Errors
    ///
    /// - `DuplicateItem` if an item with this identity already exists.
    /// - `InvalidData` if encoding fails or the payload is too large.
    /// - `IncorrectAttributeForClass` if an attribute does not apply to the
    ///   identity's class.
    /// - `Unexpected` for any other backend failure.
    pub fn create<T: Serialize + ?Sized>(&self, identity: &Identity, value: &T) -> Result<()> {
        log::debug!("create {identity}");
        let payload = Zeroizing::new(self.codec.encode(value)?);
        self.backend
            .insert(&self.query(identity), &payload)
            .check()
    }

    /// Load and decode an item.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if no item matches.
    /// - `InvalidData` if the record has no payload or decoding fails.
    /// - `Unexpected` for any other backend failure.
    pub fn retrieve<T: DeserializeOwned>(&self, identity: &Identity) -> Result<T> {
        log::debug!("retrieve {identity}");
        let record = self.lookup(identity, true)?;
        let payload = record.payload.ok_or_else(|| {
            KeychainError::InvalidData(format!("{identity}: record has no payload"))
        })?;
        self.codec.decode(&payload)
    }

    /// Replace the payload of an existing item. Its attributes are not
    /// touched.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if no item matches.
    /// - `InvalidData` if encoding fails or the payload is too large.
    /// - `Unexpected` for any other backend failure.
    pub fn update<T: Serialize + ?Sized>(&self, identity: &Identity, value: &T) -> Result<()> {
        log::debug!("update {identity}");
        let payload = Zeroizing::new(self.codec.encode(value)?);
        self.backend
            .modify(&self.query(identity), &payload)
            .check()
    }

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if no item matches.
    /// - `Unexpected` for any other backend failure.
    pub fn delete(&self, identity: &Identity) -> Result<()> {
        log::debug!("delete {identity}");
        self.backend.remove(&self.query(identity)).check()
    }

    // ── Queries without payload ───────────────────────────────────────────────

    /// Whether an item matches `identity`. Never decodes the payload.
    ///
    /// # Errors
    ///
    /// Any failure other than `ItemNotFound`.
    pub fn contains(&self, identity: &Identity) -> Result<bool> {
        match self.lookup(identity, false) {
            Ok(_) => Ok(true),
            Err(KeychainError::ItemNotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Attributes and timestamps of an item.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if no item matches.
    /// - `Unexpected` for any other backend failure.
    pub fn retrieve_record(&self, identity: &Identity) -> Result<ItemRecord> {
        let record = self.lookup(identity, false)?;
        Ok(ItemRecord {
            class: identity.class,
            key: record.key,
            attributes: record.attributes,
            created_at: record.created_at,
            modified_at: record.modified_at,
        })
    }

    fn lookup(&self, identity: &Identity, want_payload: bool) -> Result<Record> {
        let (status, record) = self.backend.lookup(&self.query(identity), want_payload);
        status.check()?;
        record.ok_or_else(|| {
            KeychainError::InvalidData(format!("{identity}: backend returned no record"))
        })
    }

    // ── Class-wide operations ─────────────────────────────────────────────────

    /// Keys of every item of `class` that matches the default attributes,
    /// sorted.
    ///
    /// # Errors
    ///
    /// `Unexpected` if the backend cannot enumerate items or fails.
    pub fn keys(&self, class: ItemClass) -> Result<Vec<String>> {
        let query = Query::for_class(class, self.default_attributes.clone());
        let (status, keys) = self.backend.list(&query);
        status.check()?;
        Ok(keys)
    }

    /// Remove every item of `class` that matches the default attributes.
    /// Returns how many were removed.
    ///
    /// Items that vanish between listing and removal are skipped.
    ///
    /// # Errors
    ///
    /// The first failure other than `ItemNotFound`. Items removed before it
    /// stay removed.
    pub fn delete_all(&self, class: ItemClass) -> Result<usize> {
        let mut removed = 0;
        for key in self.keys(class)? {
            match self.delete(&Identity::new(class, key)) {
                Ok(()) => removed += 1,
                Err(KeychainError::ItemNotFound) => {}
                Err(err) => return Err(err),
            }
        }
        log::debug!("delete_all {}: removed {removed}", class.code());
        Ok(removed)
    }
}

impl<C: Codec> std::fmt::Debug for StorageManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageManager")
            .field("backend", &self.backend.name())
            .field("codec", &self.codec.name())
            .field("default_attributes", &self.default_attributes)
            .finish()
    }
}
