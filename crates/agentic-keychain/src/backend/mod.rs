//! Backend capability interface.
//!
//! A backend is the protected store itself. It speaks in raw [`Status`]
//! codes; the [`StorageManager`](crate::manager::StorageManager) is the only
//! caller and the only place those codes are interpreted.
//!
//! # Modules
//!
//! - [`memory`]: in-process reference backend.
//! - [`file`]: JSON-file backend for development and tooling. It does not
//!   encrypt anything.

pub mod file;
pub mod memory;

use std::fmt;

use zeroize::Zeroizing;

use crate::attributes::Attributes;
use crate::identity::Query;
use crate::item_class::ItemClass;
use crate::status::Status;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Payload size limit applied by the bundled backends unless overridden.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 1 << 20;

/// A stored item as returned by [`Backend::lookup`].
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    pub class_code: String,
    pub key: String,
    pub attributes: Attributes,
    /// Present only when the lookup asked for it.
    pub payload: Option<Zeroizing<Vec<u8>>>,
    /// Creation time, Unix epoch microseconds.
    pub created_at: u64,
    /// Last payload change, Unix epoch microseconds.
    pub modified_at: u64,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("class_code", &self.class_code)
            .field("key", &self.key)
            .field("attributes", &self.attributes)
            .field("payload", &self.payload.as_ref().map(|p| p.len()))
            .field("created_at", &self.created_at)
            .field("modified_at", &self.modified_at)
            .finish()
    }
}

/// Primitive operations every protected store provides.
///
/// Implementations must make each single call atomic. Nothing is assumed
/// about sequences of calls.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Name of this backend, for diagnostics.
    fn name(&self) -> &str;

    /// Store a new item. Fails with [`Status::DUPLICATE_ITEM`] if an item
    /// with the same class and key exists.
    fn insert(&self, query: &Query, payload: &[u8]) -> Status;

    /// Find the item addressed by `query`. The payload is included only when
    /// `want_payload` is set.
    fn lookup(&self, query: &Query, want_payload: bool) -> (Status, Option<Record>);

    /// Replace the payload of an existing item. Attributes are unchanged.
    fn modify(&self, query: &Query, new_payload: &[u8]) -> Status;

    /// Remove the item addressed by `query`.
    fn remove(&self, query: &Query) -> Status;

    /// Keys of every item in the query's class matching its attributes. The
    /// query key is ignored.
    fn list(&self, query: &Query) -> (Status, Vec<String>) {
        let _ = query;
        (Status::UNIMPLEMENTED, Vec::new())
    }
}

/// Check a query against the class catalog.
///
/// Unknown class codes yield [`Status::NO_SUCH_CLASS`], attributes the class
/// does not support yield [`Status::NO_SUCH_ATTR`], and an empty key (when
/// `require_key` is set) yields [`Status::PARAM`].
pub(crate) fn validate_query(query: &Query, require_key: bool) -> Result<ItemClass, Status> {
    let class = query.class().ok_or(Status::NO_SUCH_CLASS)?;
    if let Some(name) = query
        .attributes
        .names()
        .find(|name| !class.supports_attribute(name))
    {
        log::trace!("attribute {name} rejected for {}", class.code());
        return Err(Status::NO_SUCH_ATTR);
    }
    if require_key && query.key.is_empty() {
        return Err(Status::PARAM);
    }
    Ok(class)
}
