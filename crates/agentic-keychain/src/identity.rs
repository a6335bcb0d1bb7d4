//! Item identities and backend queries.
//!
//! An [`Identity`] addresses one stored item. A [`Query`] is what actually
//! crosses the backend boundary: the class code, the key, and the merged
//! attribute set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeValue, Attributes};
use crate::item_class::ItemClass;

/// Address of a stored item: class, key, and extra attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub class: ItemClass,
    pub key: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl Identity {
    pub fn new(class: ItemClass, key: impl Into<String>) -> Self {
        Self {
            class,
            key: key.into(),
            attributes: Attributes::new(),
        }
    }

    /// Shorthand for a [`ItemClass::GenericPassword`] identity.
    pub fn generic(key: impl Into<String>) -> Self {
        Self::new(ItemClass::GenericPassword, key)
    }

    /// Shorthand for an [`ItemClass::InternetPassword`] identity.
    pub fn internet(key: impl Into<String>) -> Self {
        Self::new(ItemClass::InternetPassword, key)
    }

    /// Attach a call-specific attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Replace the attribute set.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Build the backend query, merging `defaults` under this identity's
    /// own attributes.
    pub fn to_query(&self, defaults: &Attributes) -> Query {
        Query {
            class_code: self.class.code().to_string(),
            key: self.key.clone(),
            attributes: defaults.merged_with(&self.attributes),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.class.code(), self.key)
    }
}

/// Backend-facing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub class_code: String,
    pub key: String,
    pub attributes: Attributes,
}

impl Query {
    /// Query for every item of `class` matching `attributes`. The key is
    /// left empty; only [`Backend::list`](crate::backend::Backend::list)
    /// accepts such a query.
    pub fn for_class(class: ItemClass, attributes: Attributes) -> Self {
        Self {
            class_code: class.code().to_string(),
            key: String::new(),
            attributes,
        }
    }

    /// Resolved class, if the code is known.
    pub fn class(&self) -> Option<ItemClass> {
        ItemClass::from_code(&self.class_code)
    }
}
