// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Immutable UTF-8 strings, pooled for short payloads.
//!
//! Strings up to [`ManagedString::INLINE_CAP`] bytes are stored inline (no
//! heap allocation, no pool bookkeeping); longer strings fall back to a
//! single `Box<str>` allocation. Either way a `ManagedString` owns its
//! bytes independently, so `clone()` always duplicates rather than sharing
//! — there is no reference counting to get wrong.

use std::fmt;
use std::hash::{Hash, Hasher};


/// An immutable, owned UTF-8 string.
#[derive(Clone)]
pub enum ManagedString {
    /// Inline storage for strings of at most [`ManagedString::INLINE_CAP`] bytes.
    Inline { len: u8, data: [u8; ManagedString::INLINE_CAP] },
    /// Individually heap-allocated storage for longer strings.
    Boxed(Box<str>),
}

impl ManagedString {
    /// Strings up to this many bytes are pooled inline; longer ones spill
    /// to an individual heap allocation.
    pub const INLINE_CAP: usize = 63;

    /// Acquire a managed string from (conceptually) the pool.
    #[must_use]
    pub fn new(s: &str) -> Self {
        if s.len() <= Self::INLINE_CAP {
            let mut data = [0u8; Self::INLINE_CAP];
            data[..s.len()].copy_from_slice(s.as_bytes());
            Self::Inline { len: s.len() as u8, data }
        } else {
            Self::Boxed(s.into())
        }
    }

    /// Borrow the string's contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline { len, data } => {
                // SAFETY net: bytes were validated UTF-8 at construction.
                std::str::from_utf8(&data[..*len as usize]).unwrap_or_default()
            }
            Self::Boxed(s) => s,
        }
    }

    /// Code-point length, not byte length.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.as_str().chars().count()
    }

    /// Byte length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ManagedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ManagedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl PartialEq for ManagedString {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
impl Eq for ManagedString {}

impl PartialOrd for ManagedString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ManagedString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for ManagedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for ManagedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ManagedString {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl std::ops::Deref for ManagedString {
    type Target = str;
    fn deref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ManagedString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ManagedString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <&str>::deserialize(deserializer).map(Self::new)
    }
}
