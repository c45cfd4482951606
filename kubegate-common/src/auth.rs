//! Caller identity and access levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Privilege tier of a caller
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Reader < User < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Reader,
    User,
    Admin,
}

impl AccessLevel {
    /// All levels, lowest first
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Reader, AccessLevel::User, AccessLevel::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Self::Reader),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(Error::InvalidAccessLevel(other.to_string())),
        }
    }
}

/// Operation a caller wants to perform on a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    List,
    Get,
    Describe,
    Create,
    Update,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::List,
        Verb::Get,
        Verb::Describe,
        Verb::Create,
        Verb::Update,
        Verb::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Describe => "describe",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "get" => Ok(Self::Get),
            "describe" => Ok(Self::Describe),
            "create" => Ok(Self::Create),
            "update" | "patch" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(Error::InvalidVerb(other.to_string())),
        }
    }
}

/// Authenticated caller
///
/// Supplied by the authentication layer. The gateway only reads the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub access_level: AccessLevel,
}

impl Principal {
    pub fn new(id: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            id: id.into(),
            access_level,
        }
    }

    /// Whether this caller meets the given minimum level
    pub fn has_level(&self, required: AccessLevel) -> bool {
        self.access_level >= required
    }
}
