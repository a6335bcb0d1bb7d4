//! Value codecs.
//!
//! A codec turns typed values into the byte payload stored by the backend
//! and back. Both directions fail with [`KeychainError::InvalidData`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{KeychainError, Result};

/// Pluggable encode/decode pair.
pub trait Codec: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON payloads via `serde_json`. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| KeychainError::InvalidData(format!("json encode: {e}")))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| KeychainError::InvalidData(format!("json decode: {e}")))
    }
}

/// Compact binary payloads via `bincode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| KeychainError::InvalidData(format!("bincode encode: {e}")))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| KeychainError::InvalidData(format!("bincode decode: {e}")))
    }
}
