//! Error types for AgenticKeychain.
//!
//! Every failure a caller can observe is one of five kinds. Raw backend
//! status codes are translated exactly once, in [`KeychainError::from_status`];
//! nothing above the backend boundary sees them except as the diagnostic
//! code carried by [`KeychainError::Unexpected`].
//!
//! Payload bytes are never included in error messages.

use crate::status::Status;

/// Keychain error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeychainError {
    /// The payload could not be encoded or decoded, the stored record had no
    /// payload, or the backend rejected it as too large.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Item not found")]
    ItemNotFound,

    #[error("Duplicate item")]
    DuplicateItem,

    #[error("Incorrect attribute for item class")]
    IncorrectAttributeForClass,

    /// Any backend status without a dedicated kind. Carries the raw code.
    #[error("Unexpected backend status: {0}")]
    Unexpected(i32),
}

impl KeychainError {
    /// Classify a backend status.
    ///
    /// Returns `None` for [`Status::SUCCESS`]. Every other status maps to
    /// exactly one kind; unmapped codes become [`KeychainError::Unexpected`].
    pub fn from_status(status: Status) -> Option<Self> {
        match status {
            Status::SUCCESS => None,
            Status::ITEM_NOT_FOUND => Some(Self::ItemNotFound),
            Status::DUPLICATE_ITEM => Some(Self::DuplicateItem),
            Status::DATA_TOO_LARGE => Some(Self::InvalidData(
                "payload exceeds backend size limit".into(),
            )),
            Status::DECODE => Some(Self::InvalidData(
                "backend could not decode stored data".into(),
            )),
            Status::NO_SUCH_ATTR => Some(Self::IncorrectAttributeForClass),
            other => Some(Self::Unexpected(other.code())),
        }
    }

    /// True for [`KeychainError::ItemNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound)
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, KeychainError>;
