//! Backend status vocabulary.
//!
//! Backends report the outcome of every primitive as a signed status code.
//! The named constants cover the codes the library interprets; any other
//! value is still a valid `Status` and surfaces as
//! [`KeychainError::Unexpected`](crate::error::KeychainError::Unexpected).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KeychainError, Result};

/// Raw status code returned by a [`Backend`](crate::backend::Backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(i32);

impl Status {
    pub const SUCCESS: Status = Status(0);
    pub const UNIMPLEMENTED: Status = Status(-4);
    pub const IO: Status = Status(-36);
    pub const PARAM: Status = Status(-50);
    pub const AUTH_FAILED: Status = Status(-25293);
    pub const DUPLICATE_ITEM: Status = Status(-25299);
    pub const ITEM_NOT_FOUND: Status = Status(-25300);
    pub const DATA_TOO_LARGE: Status = Status(-25302);
    pub const NO_SUCH_ATTR: Status = Status(-25303);
    pub const NO_SUCH_CLASS: Status = Status(-25306);
    pub const INTERACTION_NOT_ALLOWED: Status = Status(-25308);
    pub const DECODE: Status = Status(-26275);

    /// Wrap a raw code.
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// The raw code.
    pub const fn code(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Translate into the error taxonomy.
    pub fn check(self) -> Result<()> {
        match KeychainError::from_status(self) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Short description for diagnostics. Unknown codes yield `None`.
    pub fn description(self) -> Option<&'static str> {
        let text = match self {
            Self::SUCCESS => "success",
            Self::UNIMPLEMENTED => "operation not implemented by backend",
            Self::IO => "backend I/O failure",
            Self::PARAM => "invalid parameter",
            Self::AUTH_FAILED => "authorization failed",
            Self::DUPLICATE_ITEM => "item already exists",
            Self::ITEM_NOT_FOUND => "item not found",
            Self::DATA_TOO_LARGE => "data too large",
            Self::NO_SUCH_ATTR => "attribute does not exist for class",
            Self::NO_SUCH_CLASS => "unknown item class",
            Self::INTERACTION_NOT_ALLOWED => "user interaction not allowed",
            Self::DECODE => "unable to decode stored data",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(text) => write!(f, "{} ({})", self.0, text),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Self(code)
    }
}
