//! JSON-file backend.
//!
//! Stores each item as a single JSON file:
//!
//! ```text
//! {root}/
//! ├── genp/
//! │   └── {hex(key)}.json
//! ├── inet/
//! │   └── {hex(key)}.json
//! └── ...
//! ```
//!
//! Keys longer than [`MAX_HEX_NAME_KEY_LEN`] bytes would overflow common
//! file name limits once hex encoded; they are stored as
//! `sha256-{hex(sha256(key))}.json` instead. The key itself is always read
//! back from the file contents.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "item": {
//!         "key": "...",
//!         "attributes": { ... },
//!         "payload": "<base64>",
//!         "created_at": 0,
//!         "modified_at": 0
//!     }
//! }
//! ```
//!
//! Payloads are written in the clear. Use this backend for development,
//! fixtures, and tooling, not for real secrets.
//!
//! Each write goes to a temporary file that is then renamed over the target,
//! so readers never observe a partial payload. Operations are serialized by
//! a process-local mutex; separate processes are not coordinated.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::attributes::Attributes;
use crate::backend::{validate_query, Backend, Record, DEFAULT_MAX_PAYLOAD_LEN};
use crate::error::{KeychainError, Result};
use crate::identity::Query;
use crate::status::Status;
use crate::time::now_micros;

// ── File format constants ─────────────────────────────────────────────────────

const ITEM_FILE_VERSION: u32 = 1;
const ITEM_FILE_EXTENSION: &str = "json";

/// Longest key (in bytes) stored under its hex-encoded name.
pub const MAX_HEX_NAME_KEY_LEN: usize = 100;

const HASHED_NAME_PREFIX: &str = "sha256-";

// ── On-disk structures ────────────────────────────────────────────────────────

/// Wrapper written to disk for each item.
#[derive(Debug, Serialize, Deserialize)]
struct ItemFile {
    /// Format version number.
    version: u32,
    /// The stored item.
    item: ItemEntry,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemEntry {
    key: String,
    attributes: Attributes,
    /// Base64 of the payload bytes.
    payload: String,
    created_at: u64,
    modified_at: u64,
}

// ── FileBackend ───────────────────────────────────────────────────────────────

/// Filesystem-backed backend, one JSON file per item.
pub struct FileBackend {
    root: PathBuf,
    max_payload_len: usize,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `KeychainError::Unexpected` carrying [`Status::IO`] if the
    /// directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            log::warn!("cannot create keychain directory {}: {e}", root.display());
            KeychainError::Unexpected(Status::IO.code())
        })?;
        Ok(Self {
            root,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            lock: Mutex::new(()),
        })
    }

    /// Payloads longer than `max` are rejected with
    /// [`Status::DATA_TOO_LARGE`].
    pub fn with_max_payload_len(mut self, max: usize) -> Self {
        self.max_payload_len = max;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn class_dir(&self, class_code: &str) -> PathBuf {
        self.root.join(class_code)
    }

    fn item_path(&self, query: &Query) -> PathBuf {
        self.class_dir(&query.class_code)
            .join(format!("{}.{ITEM_FILE_EXTENSION}", item_file_stem(&query.key)))
    }

    /// Read an item file. A missing file is `Ok(None)`.
    fn read_entry(path: &Path) -> std::result::Result<Option<ItemEntry>, Status> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                log::warn!("read {}: {e}", path.display());
                return Err(Status::IO);
            }
        };
        let file: ItemFile = serde_json::from_slice(&bytes).map_err(|e| {
            log::warn!("malformed item file {}: {e}", path.display());
            Status::DECODE
        })?;
        if file.version != ITEM_FILE_VERSION {
            log::warn!(
                "unsupported item file version {} in {}",
                file.version,
                path.display()
            );
            return Err(Status::DECODE);
        }
        Ok(Some(file.item))
    }

    fn write_entry(path: &Path, entry: ItemEntry) -> Status {
        let file = ItemFile {
            version: ITEM_FILE_VERSION,
            item: entry,
        };
        let json = match serde_json::to_vec_pretty(&file) {
            Ok(json) => Zeroizing::new(json),
            Err(e) => {
                log::warn!("serialize item file {}: {e}", path.display());
                return Status::DECODE;
            }
        };

        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let tmp_path = path.with_extension("json.tmp");
            std::fs::write(&tmp_path, json.as_slice())?;
            std::fs::rename(&tmp_path, path)
        };
        match write() {
            Ok(()) => Status::SUCCESS,
            Err(e) => {
                log::warn!("write {}: {e}", path.display());
                Status::IO
            }
        }
    }

    fn decode_payload(entry: &ItemEntry) -> std::result::Result<Zeroizing<Vec<u8>>, Status> {
        BASE64
            .decode(&entry.payload)
            .map(Zeroizing::new)
            .map_err(|_| Status::DECODE)
    }

    /// Load the entry addressed by `query` if it exists and matches the
    /// query attributes.
    fn find(&self, query: &Query) -> std::result::Result<ItemEntry, Status> {
        match Self::read_entry(&self.item_path(query))? {
            Some(entry) if entry.attributes.matches(&query.attributes) => Ok(entry),
            _ => Err(Status::ITEM_NOT_FOUND),
        }
    }
}

/// File name (without extension) for `key`.
fn item_file_stem(key: &str) -> String {
    if key.len() <= MAX_HEX_NAME_KEY_LEN {
        hex::encode(key.as_bytes())
    } else {
        format!("{HASHED_NAME_PREFIX}{}", hex::encode(Sha256::digest(key.as_bytes())))
    }
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("root", &self.root)
            .field("max_payload_len", &self.max_payload_len)
            .finish()
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn insert(&self, query: &Query, payload: &[u8]) -> Status {
        if let Err(status) = validate_query(query, true) {
            return status;
        }
        if payload.len() > self.max_payload_len {
            return Status::DATA_TOO_LARGE;
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.item_path(query);
        match Self::read_entry(&path) {
            Ok(Some(_)) => return Status::DUPLICATE_ITEM,
            Ok(None) => {}
            Err(status) => return status,
        }

        let now = now_micros();
        Self::write_entry(
            &path,
            ItemEntry {
                key: query.key.clone(),
                attributes: query.attributes.clone(),
                payload: BASE64.encode(payload),
                created_at: now,
                modified_at: now,
            },
        )
    }

    fn lookup(&self, query: &Query, want_payload: bool) -> (Status, Option<Record>) {
        if let Err(status) = validate_query(query, true) {
            return (status, None);
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = match self.find(query) {
            Ok(entry) => entry,
            Err(status) => return (status, None),
        };
        let payload = if want_payload {
            match Self::decode_payload(&entry) {
                Ok(payload) => Some(payload),
                Err(status) => return (status, None),
            }
        } else {
            None
        };

        let record = Record {
            class_code: query.class_code.clone(),
            key: entry.key,
            attributes: entry.attributes,
            payload,
            created_at: entry.created_at,
            modified_at: entry.modified_at,
        };
        (Status::SUCCESS, Some(record))
    }

    fn modify(&self, query: &Query, new_payload: &[u8]) -> Status {
        if let Err(status) = validate_query(query, true) {
            return status;
        }
        if new_payload.len() > self.max_payload_len {
            return Status::DATA_TOO_LARGE;
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = match self.find(query) {
            Ok(entry) => entry,
            Err(status) => return status,
        };
        entry.payload = BASE64.encode(new_payload);
        entry.modified_at = now_micros();
        Self::write_entry(&self.item_path(query), entry)
    }

    fn remove(&self, query: &Query) -> Status {
        if let Err(status) = validate_query(query, true) {
            return status;
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(status) = self.find(query) {
            return status;
        }
        let path = self.item_path(query);
        match std::fs::remove_file(&path) {
            Ok(()) => Status::SUCCESS,
            Err(e) => {
                log::warn!("remove {}: {e}", path.display());
                Status::IO
            }
        }
    }

    fn list(&self, query: &Query) -> (Status, Vec<String>) {
        if let Err(status) = validate_query(query, false) {
            return (status, Vec::new());
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = self.class_dir(&query.class_code);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return (Status::SUCCESS, Vec::new())
            }
            Err(e) => {
                log::warn!("read_dir {}: {e}", dir.display());
                return (Status::IO, Vec::new());
            }
        };

        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ITEM_FILE_EXTENSION) {
                continue;
            }
            // Unreadable files are logged by read_entry and skipped here.
            if let Ok(Some(item)) = Self::read_entry(&path) {
                if item.attributes.matches(&query.attributes) {
                    keys.push(item.key);
                }
            }
        }
        keys.sort();
        (Status::SUCCESS, keys)
    }
}
