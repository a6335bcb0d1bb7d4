//! AgenticKeychain — typed credential storage for AI agents.
//!
//! Persists typed values under an (item class, key) identity in a protected
//! key-value backend, normalizes every backend failure into one small error
//! taxonomy, and offers field-like bindings that read and write through to
//! the store.
//!
//! ```
//! use std::sync::Arc;
//! use agentic_keychain::{Identity, KeychainBinding, MemoryBackend, StorageManager};
//!
//! let manager = Arc::new(StorageManager::new(Arc::new(MemoryBackend::new())));
//! let token: KeychainBinding<String> =
//!     KeychainBinding::new(Arc::clone(&manager), Identity::generic("api-token"));
//!
//! token.set(Some("s3cr3t".to_string()));
//! assert_eq!(token.get().as_deref(), Some("s3cr3t"));
//! token.clear();
//! assert_eq!(token.get(), None);
//! ```

pub mod attributes;
pub mod backend;
pub mod binding;
pub mod codec;
pub mod config;
pub mod error;
pub mod identity;
pub mod item_class;
pub mod manager;
pub mod status;
pub mod time;

// Re-export primary types
pub use attributes::{AttributeValue, Attributes};
pub use backend::{Backend, FileBackend, MemoryBackend, Record};
pub use binding::{ErrorSink, KeychainBinding, WriteOutcome};
pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use config::{Accessibility, KeychainConfig};
pub use error::{KeychainError, Result};
pub use identity::{Identity, Query};
pub use item_class::ItemClass;
pub use manager::{ItemRecord, StorageManager};
pub use status::Status;
