//! Item classes and the attribute catalog.
//!
//! Every stored item belongs to exactly one [`ItemClass`]. Backends identify
//! classes by a four-character category code; [`ItemClass::code`] and
//! [`ItemClass::from_code`] convert in both directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of a secured item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    /// Generic secret (password, token, opaque blob).
    GenericPassword,
    /// Credential for a network service.
    InternetPassword,
    Certificate,
    /// Cryptographic key.
    Key,
    /// Certificate paired with its private key.
    Identity,
}

impl ItemClass {
    /// Every class, in declaration order.
    pub const ALL: [ItemClass; 5] = [
        ItemClass::GenericPassword,
        ItemClass::InternetPassword,
        ItemClass::Certificate,
        ItemClass::Key,
        ItemClass::Identity,
    ];

    /// Backend category code.
    pub const fn code(self) -> &'static str {
        match self {
            ItemClass::GenericPassword => "genp",
            ItemClass::InternetPassword => "inet",
            ItemClass::Certificate => "cert",
            ItemClass::Key => "keys",
            ItemClass::Identity => "idnt",
        }
    }

    /// Resolve a backend category code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.code() == code)
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            ItemClass::GenericPassword => "generic password",
            ItemClass::InternetPassword => "internet password",
            ItemClass::Certificate => "certificate",
            ItemClass::Key => "key",
            ItemClass::Identity => "identity",
        }
    }

    /// Class-specific attribute names (common names excluded).
    pub fn specific_attributes(self) -> &'static [&'static str] {
        match self {
            ItemClass::GenericPassword => attr::GENERIC_PASSWORD,
            ItemClass::InternetPassword => attr::INTERNET_PASSWORD,
            ItemClass::Certificate => attr::CERTIFICATE,
            ItemClass::Key => attr::KEY,
            ItemClass::Identity => attr::IDENTITY,
        }
    }

    /// Whether `name` is a valid attribute for items of this class.
    pub fn supports_attribute(self, name: &str) -> bool {
        attr::COMMON.contains(&name) || self.specific_attributes().contains(&name)
    }
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemClass {
    type Err = String;

    /// Accepts either the backend code or the human-readable name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
            .or_else(|| Self::ALL.into_iter().find(|class| class.name() == s))
            .ok_or_else(|| format!("unknown item class: {s}"))
    }
}

/// Attribute names understood by the backends.
pub mod attr {
    pub const LABEL: &str = "label";
    pub const DESCRIPTION: &str = "description";
    pub const COMMENT: &str = "comment";
    pub const ACCESS_GROUP: &str = "access_group";
    pub const ACCESSIBLE: &str = "accessible";
    pub const SYNCHRONIZABLE: &str = "synchronizable";
    pub const CREATOR: &str = "creator";

    pub const SERVICE: &str = "service";
    pub const GENERIC: &str = "generic";

    pub const SERVER: &str = "server";
    pub const PROTOCOL: &str = "protocol";
    pub const PORT: &str = "port";
    pub const PATH: &str = "path";
    pub const SECURITY_DOMAIN: &str = "security_domain";
    pub const AUTHENTICATION_TYPE: &str = "authentication_type";

    pub const CERTIFICATE_TYPE: &str = "certificate_type";
    pub const CERTIFICATE_ENCODING: &str = "certificate_encoding";
    pub const SUBJECT: &str = "subject";
    pub const ISSUER: &str = "issuer";
    pub const SERIAL_NUMBER: &str = "serial_number";

    pub const KEY_CLASS: &str = "key_class";
    pub const KEY_TYPE: &str = "key_type";
    pub const KEY_SIZE_IN_BITS: &str = "key_size_in_bits";
    pub const APPLICATION_TAG: &str = "application_tag";
    pub const APPLICATION_LABEL: &str = "application_label";

    /// Valid for every class.
    pub const COMMON: &[&str] = &[
        LABEL,
        DESCRIPTION,
        COMMENT,
        ACCESS_GROUP,
        ACCESSIBLE,
        SYNCHRONIZABLE,
        CREATOR,
    ];

    pub(crate) const GENERIC_PASSWORD: &[&str] = &[SERVICE, GENERIC];

    pub(crate) const INTERNET_PASSWORD: &[&str] = &[
        SERVER,
        PROTOCOL,
        PORT,
        PATH,
        SECURITY_DOMAIN,
        AUTHENTICATION_TYPE,
    ];

    pub(crate) const CERTIFICATE: &[&str] = &[
        CERTIFICATE_TYPE,
        CERTIFICATE_ENCODING,
        SUBJECT,
        ISSUER,
        SERIAL_NUMBER,
    ];

    pub(crate) const KEY: &[&str] = &[
        KEY_CLASS,
        KEY_TYPE,
        KEY_SIZE_IN_BITS,
        APPLICATION_TAG,
        APPLICATION_LABEL,
    ];

    pub(crate) const IDENTITY: &[&str] = &[
        CERTIFICATE_TYPE,
        CERTIFICATE_ENCODING,
        SUBJECT,
        ISSUER,
        SERIAL_NUMBER,
        KEY_CLASS,
        KEY_TYPE,
        KEY_SIZE_IN_BITS,
        APPLICATION_TAG,
        APPLICATION_LABEL,
    ];
}
