// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Many-to-many mapping between object *names* (not handles — tags are a
//! class-level concept) and string tags.
//!
//! Grounded on the reference implementation's `tag_system.c`: tags are
//! attached at the class level so "is object X tagged T" and "iterate
//! all object names tagged T" are cheap regardless of how many live
//! instances of X exist.

use std::collections::{HashMap, HashSet};

#[cfg(test)]
mod tests;

#[derive(Default)]
pub struct TagSystem {
    tags_of_name: HashMap<String, HashSet<String>>,
    names_of_tag: HashMap<String, HashSet<String>>,
}

impl TagSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tag(&mut self, object_name: &str, tag: &str) {
        self.tags_of_name.entry(object_name.to_string()).or_default().insert(tag.to_string());
        self.names_of_tag.entry(tag.to_string()).or_default().insert(object_name.to_string());
    }

    #[must_use]
    pub fn has_tag(&self, object_name: &str, tag: &str) -> bool {
        self.tags_of_name.get(object_name).is_some_and(|tags| tags.contains(tag))
    }

    /// All tags attached to `object_name`, in no particular order.
    #[must_use]
    pub fn tags_of(&self, object_name: &str) -> Vec<&str> {
        self.tags_of_name
            .get(object_name)
            .map(|tags| tags.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// All object names carrying `tag`, in no particular order.
    #[must_use]
    pub fn names_with_tag(&self, tag: &str) -> Vec<&str> {
        self.names_of_tag
            .get(tag)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
