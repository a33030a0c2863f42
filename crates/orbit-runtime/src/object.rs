// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! A single object: identity, private heap, state, tree links, exported
//! variables and opaque user data.

use crate::heap::Heap;
use orbit_core::Value;
use std::collections::HashMap;

#[cfg(test)]
mod tests;

/// Minimal 2-D transform. The full `Transform2D` standard-library object
/// (matrix composition, local/world space, ...) lives outside this
/// runtime core; objects only need a place to keep position/rotation
/// when one is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform2D {
    pub x: f64,
    pub y: f64,
    pub rotation_degrees: f64,
}

/// Opaque, object-kind-specific data that doesn't fit the heap's
/// uniform value-cell model.
#[derive(Debug, Clone, Default)]
pub enum UserData {
    #[default]
    None,
    /// The root object's ordered list of system-library names to
    /// auto-spawn as its children at launch.
    SystemObjectNames(Vec<String>),
    /// Backing storage for a native `Array`.
    Array(Vec<Value>),
    /// The host program's command-line arguments, stashed on
    /// `Application` for its `args` accessor to expose as an `Array`.
    Args(Vec<String>),
}

/// A node in the object tree.
pub struct Object {
    name: String,
    handle: u32,
    parent: u32,
    children: Vec<u32>,
    heap: Heap,
    state: String,
    active: bool,
    killed: bool,
    /// GC workspace: cleared at the start of each cycle, set when the
    /// object is reached from the root or the stack.
    pub(crate) reachable: bool,
    last_state_change: f64,
    transform: Option<Transform2D>,
    exported_vars: HashMap<String, usize>,
    pub user_data: UserData,
}

impl Object {
    pub(crate) fn new(name: &str, handle: u32, parent: u32) -> Self {
        Self {
            name: name.to_string(),
            handle,
            parent,
            children: Vec::new(),
            heap: Heap::new(),
            state: "main".to_string(),
            active: true,
            killed: false,
            reachable: false,
            last_state_change: 0.0,
            transform: None,
            exported_vars: HashMap::new(),
            user_data: UserData::None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn handle(&self) -> u32 {
        self.handle
    }

    #[must_use]
    pub fn parent(&self) -> u32 {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: u32) {
        self.parent = parent;
    }

    #[must_use]
    pub fn children(&self) -> &[u32] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: u32) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: u32) {
        self.children.retain(|&h| h != child);
    }

    #[must_use]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Transition to a new state, recording the current timestamp so
    /// `timeout(seconds)` measures elapsed time relative to this change.
    pub fn set_state(&mut self, state: &str, now: f64) {
        self.state = state.to_string();
        self.last_state_change = now;
    }

    #[must_use]
    pub fn last_state_change(&self) -> f64 {
        self.last_state_change
    }

    /// Has at least `seconds` elapsed since the last state change?
    #[must_use]
    pub fn timeout(&self, now: f64, seconds: f64) -> bool {
        now - self.last_state_change >= seconds
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[must_use]
    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// Cooperative kill: the scheduler deletes the object next time it
    /// visits it. Never destroys anything immediately — this is what
    /// makes it safe for an object to kill itself mid-execution.
    pub fn kill(&mut self) {
        self.killed = true;
    }

    #[must_use]
    pub fn transform(&self) -> Option<&Transform2D> {
        self.transform.as_ref()
    }

    pub fn attach_transform(&mut self) -> &mut Transform2D {
        self.transform.get_or_insert_with(Transform2D::default)
    }

    #[must_use]
    pub fn exported_var(&self, name: &str) -> Option<usize> {
        self.exported_vars.get(name).copied()
    }

    pub(crate) fn export_var(&mut self, name: &str, address: usize) {
        self.exported_vars.insert(name.to_string(), address);
    }

    #[must_use]
    pub fn exported_vars(&self) -> impl Iterator<Item = (&str, usize)> {
        self.exported_vars.iter().map(|(name, &addr)| (name.as_str(), addr))
    }
}
