//! Reactive field binding.
//!
//! A [`KeychainBinding`] makes a stored item behave like an optional field:
//! [`get`](KeychainBinding::get) reads it, [`set`](KeychainBinding::set)
//! writes or clears it. Nothing is cached; every access is a round trip to
//! the backend through the shared [`StorageManager`].
//!
//! Assignment picks the storage operation itself:
//!
//! | new value | item exists | operation |
//! |-----------|-------------|-----------|
//! | `Some(v)` | yes         | update    |
//! | `Some(v)` | no          | create    |
//! | `None`    | either      | delete (not-found is a no-op) |
//!
//! `get`/`set` have no error channel. Failures go to the binding's
//! [`ErrorSink`] and reads degrade to `None`, so an item that exists but
//! cannot be decoded reads the same as one never stored. Use
//! [`try_get`](KeychainBinding::try_get) / [`try_set`](KeychainBinding::try_set)
//! to see errors directly. Writes are refused the same way: a value is
//! never written over an item the binding cannot read.
//!
//! The existence check and the write that follows are two backend calls, not
//! one transaction. Two writers racing on the same identity can lose an
//! update or hit `DuplicateItem` / `ItemNotFound`; that error is reported to
//! the sink like any other.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{Codec, JsonCodec};
use crate::error::{KeychainError, Result};
use crate::identity::Identity;
use crate::manager::StorageManager;

/// Receiver for errors that `get`/`set` cannot return.
pub type ErrorSink = Arc<dyn Fn(&Identity, &KeychainError) + Send + Sync>;

/// Sink that logs each error at `warn` level. The default.
pub fn log_sink() -> ErrorSink {
    Arc::new(|identity: &Identity, err: &KeychainError| {
        log::warn!("keychain binding {identity}: {err}")
    })
}

/// Sink that drops every error.
pub fn silent_sink() -> ErrorSink {
    Arc::new(|_: &Identity, _: &KeychainError| {})
}

/// What a write did to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    Deleted,
    /// Clearing found nothing to delete.
    AlreadyAbsent,
}

/// Optional field of type `T` persisted under one identity.
pub struct KeychainBinding<T, C: Codec = JsonCodec> {
    identity: Identity,
    manager: Arc<StorageManager<C>>,
    sink: ErrorSink,
    _value: PhantomData<fn() -> T>,
}

impl<T, C> KeychainBinding<T, C>
where
    T: Serialize + DeserializeOwned,
    C: Codec,
{
    /// Bind `identity` through `manager`. Errors are logged until a sink is
    /// set with [`with_error_sink`](Self::with_error_sink).
    pub fn new(manager: Arc<StorageManager<C>>, identity: Identity) -> Self {
        Self {
            identity,
            manager,
            sink: log_sink(),
            _value: PhantomData,
        }
    }

    pub fn with_error_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&Identity, &KeychainError) + Send + Sync + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    /// Use an existing sink, e.g. one shared by several bindings.
    pub fn with_shared_sink(mut self, sink: ErrorSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn manager(&self) -> &Arc<StorageManager<C>> {
        &self.manager
    }

    // ── Fail-soft accessors ───────────────────────────────────────────────────

    /// Current value, or `None` if absent or unreadable.
    pub fn get(&self) -> Option<T> {
        self.try_get().unwrap_or_else(|err| {
            self.report(&err);
            None
        })
    }

    /// Store `Some(value)` or clear with `None`. Errors go to the sink.
    pub fn set(&self, value: Option<T>) {
        if let Err(err) = self.try_set(value.as_ref()) {
            self.report(&err);
        }
    }

    /// Same as `set(None)`.
    pub fn clear(&self) {
        self.set(None);
    }

    /// Whether the item currently exists. Errors go to the sink and read
    /// as `false`.
    pub fn is_bound(&self) -> bool {
        self.manager.contains(&self.identity).unwrap_or_else(|err| {
            self.report(&err);
            false
        })
    }

    // ── Strict accessors ──────────────────────────────────────────────────────

    /// Current value; absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Any manager error other than `ItemNotFound`.
    pub fn try_get(&self) -> Result<Option<T>> {
        match self.manager.retrieve(&self.identity) {
            Ok(value) => Ok(Some(value)),
            Err(KeychainError::ItemNotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Write or clear, reporting which operation ran.
    ///
    /// Writing a value first reads the current one. Only `ItemNotFound`
    /// leads to a create; a stored item that cannot be decoded as `T` is
    /// left untouched and its `InvalidData` is returned.
    ///
    /// # Errors
    ///
    /// The error of the existence check or of the chosen operation.
    /// `ItemNotFound` while clearing is not an error.
    pub fn try_set(&self, value: Option<&T>) -> Result<WriteOutcome> {
        let outcome = match value {
            None => match self.manager.delete(&self.identity) {
                Ok(()) => WriteOutcome::Deleted,
                Err(KeychainError::ItemNotFound) => WriteOutcome::AlreadyAbsent,
                Err(err) => return Err(err),
            },
            Some(value) => match self.manager.retrieve::<T>(&self.identity) {
                Ok(_) => {
                    self.manager.update(&self.identity, value)?;
                    WriteOutcome::Updated
                }
                Err(KeychainError::ItemNotFound) => {
                    self.manager.create(&self.identity, value)?;
                    WriteOutcome::Created
                }
                Err(err) => return Err(err),
            },
        };
        log::debug!("binding {}: {outcome:?}", self.identity);
        Ok(outcome)
    }

    fn report(&self, err: &KeychainError) {
        (self.sink)(&self.identity, err);
    }
}

impl<T, C: Codec> Clone for KeychainBinding<T, C> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            manager: Arc::clone(&self.manager),
            sink: Arc::clone(&self.sink),
            _value: PhantomData,
        }
    }
}

impl<T, C: Codec> fmt::Debug for KeychainBinding<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeychainBinding")
            .field("identity", &self.identity)
            .field("value_type", &std::any::type_name::<T>())
            .field("manager", &self.manager)
            .finish()
    }
}
