//! Case-insensitive identity keys
//!
//! Marker names and planet identities are compared without regard to case.
//! The original spelling is kept for display.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A non-empty identity compared case-insensitively
#[derive(Debug, Clone)]
pub struct IdentityKey {
    display: String,
    folded: String,
}

impl IdentityKey {
    /// Build a key; empty strings never form an identity
    pub fn new(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            display: raw.to_string(),
            folded: raw.to_lowercase(),
        })
    }

    /// Key for a built-in, non-empty name
    pub(crate) fn named(raw: &'static str) -> Self {
        debug_assert!(!raw.is_empty(), "built-in identity must not be empty");
        Self {
            display: raw.to_string(),
            folded: raw.to_lowercase(),
        }
    }

    /// Original spelling
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Case-folded key used for comparison
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Compare against a raw string without allocating a key
    pub fn matches(&self, raw: &str) -> bool {
        !raw.is_empty() && raw.to_lowercase() == self.folded
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl Serialize for IdentityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for IdentityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        IdentityKey::new(&raw).ok_or_else(|| serde::de::Error::custom("identity must not be empty"))
    }
}
