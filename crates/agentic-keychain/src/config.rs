//! Manager configuration.
//!
//! A [`KeychainConfig`] describes the default attribute set a
//! [`StorageManager`](crate::manager::StorageManager) attaches to every
//! query. It can be built in code or loaded from a JSON file:
//!
//! ```json
//! {
//!     "service": "com.example.agent",
//!     "accessibility": "after_first_unlock",
//!     "synchronizable": false
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::error::{KeychainError, Result};
use crate::item_class::attr;
use crate::status::Status;

/// When a stored item may be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    WhenUnlocked,
    AfterFirstUnlock,
    WhenPasscodeSetThisDeviceOnly,
    WhenUnlockedThisDeviceOnly,
    AfterFirstUnlockThisDeviceOnly,
}

impl Accessibility {
    /// Attribute value stored under [`attr::ACCESSIBLE`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Accessibility::WhenUnlocked => "when_unlocked",
            Accessibility::AfterFirstUnlock => "after_first_unlock",
            Accessibility::WhenPasscodeSetThisDeviceOnly => "when_passcode_set_this_device_only",
            Accessibility::WhenUnlockedThisDeviceOnly => "when_unlocked_this_device_only",
            Accessibility::AfterFirstUnlockThisDeviceOnly => "after_first_unlock_this_device_only",
        }
    }
}

/// Default attributes for a storage manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeychainConfig {
    /// Service name. Applies to generic passwords only.
    pub service: Option<String>,
    pub access_group: Option<String>,
    pub accessibility: Option<Accessibility>,
    pub synchronizable: Option<bool>,
    pub label: Option<String>,
    /// Additional attributes, applied after the named fields.
    pub attributes: Attributes,
}

impl KeychainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn access_group(mut self, group: impl Into<String>) -> Self {
        self.access_group = Some(group.into());
        self
    }

    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = Some(accessibility);
        self
    }

    pub fn synchronizable(mut self, synchronizable: bool) -> Self {
        self.synchronizable = Some(synchronizable);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `KeychainError::InvalidData` if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| KeychainError::InvalidData(format!("config: {e}")))
    }

    /// Load a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `KeychainError::Unexpected` carrying [`Status::IO`] if the
    /// file cannot be read, or `KeychainError::InvalidData` if it is
    /// malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            log::warn!("cannot read keychain config {}: {e}", path.display());
            KeychainError::Unexpected(Status::IO.code())
        })?;
        Self::from_json_str(&text)
    }

    /// The default attribute set described by this config.
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(service) = &self.service {
            attributes.insert(attr::SERVICE, service.as_str());
        }
        if let Some(group) = &self.access_group {
            attributes.insert(attr::ACCESS_GROUP, group.as_str());
        }
        if let Some(accessibility) = self.accessibility {
            attributes.insert(attr::ACCESSIBLE, accessibility.as_str());
        }
        if let Some(synchronizable) = self.synchronizable {
            attributes.insert(attr::SYNCHRONIZABLE, synchronizable);
        }
        if let Some(label) = &self.label {
            attributes.insert(attr::LABEL, label.as_str());
        }
        attributes.merged_with(&self.attributes)
    }
}
