// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Sparse handle table owning every live [`Object`], the object tree,
//! and spawn/destroy lifecycle.

use crate::error::{FatalError, FatalResult};
use crate::object::{Object, UserData};
use std::collections::HashMap;


pub const NULL_HANDLE: u32 = 0;
pub const ROOT_HANDLE: u32 = 1;

/// Fixed spawn order for the always-available standard library, used to
/// seed the root's `user_data` at [`ObjectManager::spawn_root`]. Its own
/// constructor consumes this list to spawn each one as a direct child of
/// itself, in order. `Application` must stay last: every other entry is
/// meant to be available by the time user code starts running under it.
pub const SYSTEM_OBJECT_NAMES: &[&str] = &[
    "String",
    "Number",
    "Boolean",
    "Time",
    "Math",
    "Console",
    "__Temp",
    "__GC",
    "__TagSystem",
    "Application",
];

pub struct ObjectManager {
    slots: Vec<Option<Object>>,
    free_slots: Vec<u32>,
    count: usize,
    system_objects: HashMap<&'static str, u32>,
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectManager {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: vec![None], free_slots: Vec::new(), count: 0, system_objects: HashMap::new() }
    }

    /// Create the root object, named `System`, at [`ROOT_HANDLE`]. Must
    /// be called exactly once per VM, before any other spawn. Its
    /// `user_data` carries [`SYSTEM_OBJECT_NAMES`] for its own
    /// constructor to consume; the constructor itself (and therefore the
    /// actual spawning of `Application` and the rest) runs separately,
    /// once native bindings are in place.
    pub fn spawn_root(&mut self) -> FatalResult<u32> {
        debug_assert!(self.slots.len() == 1, "spawn_root called more than once");
        let mut root = Object::new("System", ROOT_HANDLE, ROOT_HANDLE);
        root.user_data =
            UserData::SystemObjectNames(SYSTEM_OBJECT_NAMES.iter().map(|s| (*s).to_string()).collect());
        self.slots.push(Some(root));
        self.count = 1;
        tracing::info!(handle = ROOT_HANDLE, "root object spawned");
        Ok(ROOT_HANDLE)
    }

    /// Register a handle already occupied by a freshly spawned object as
    /// one of the fixed system-library slots, so [`Self::system_object`]
    /// can find it later.
    pub fn register_system_object(&mut self, name: &'static str, handle: u32) {
        self.system_objects.insert(name, handle);
    }

    /// Allocate a handle, insert the object into the tree under `parent`,
    /// and mark it reachable for the GC cycle in progress. Does not run
    /// any constructor program — that's the interpreter's job, since
    /// this manager has no knowledge of programs.
    pub fn spawn(&mut self, parent: u32, name: &str) -> FatalResult<u32> {
        if parent != NULL_HANDLE {
            self.get(parent)?;
        }
        let handle = self.allocate_slot();
        let mut obj = Object::new(name, handle, parent);
        obj.reachable = true;
        self.slots[handle as usize] = Some(obj);
        self.count += 1;
        if parent != NULL_HANDLE && parent != handle {
            self.get_mut(parent)?.add_child(handle);
        }
        tracing::debug!(handle, parent, name, "object spawned");
        Ok(handle)
    }

    fn allocate_slot(&mut self) -> u32 {
        if let Some(handle) = self.free_slots.pop() {
            handle
        } else {
            let handle = self.slots.len() as u32;
            self.slots.push(None);
            handle
        }
    }

    #[must_use]
    pub fn exists(&self, handle: u32) -> bool {
        handle != NULL_HANDLE && self.slots.get(handle as usize).is_some_and(Option::is_some)
    }

    pub fn get(&self, handle: u32) -> FatalResult<&Object> {
        self.slots
            .get(handle as usize)
            .and_then(Option::as_ref)
            .ok_or(FatalError::InvalidHandle { handle })
    }

    pub fn get_mut(&mut self, handle: u32) -> FatalResult<&mut Object> {
        self.slots
            .get_mut(handle as usize)
            .and_then(Option::as_mut)
            .ok_or(FatalError::InvalidHandle { handle })
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Every currently-live handle, in table order. Used by the GC's
    /// sweep phase and by `System.objectCount`-style reflection.
    pub fn handles(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| slot.as_ref().map(|_| i as u32))
    }

    #[must_use]
    pub fn null(&self) -> u32 {
        NULL_HANDLE
    }

    #[must_use]
    pub fn root(&self) -> u32 {
        ROOT_HANDLE
    }

    /// The `Application` object — a direct child of the root, spawned
    /// last among the always-available system objects. User code's own
    /// top-level object is spawned under this one, not under the root.
    #[must_use]
    pub fn application(&self) -> Option<u32> {
        self.system_object("Application")
    }

    /// Deterministic handle of a system object by name, independent of
    /// whether a manager even exists yet for the caller — `None` simply
    /// means "not registered", which callers treat as null.
    #[must_use]
    pub fn system_object(&self, name: &str) -> Option<u32> {
        self.system_objects.get(name).copied()
    }

    pub fn find_child_by_name(&self, parent: u32, name: &str) -> FatalResult<Option<u32>> {
        Ok(self.get(parent)?.children().iter().copied().find(|&h| self.get(h).is_ok_and(|o| o.name() == name)))
    }

    /// Destroy `handle` and its whole subtree. `on_destroy` is invoked
    /// once per object, root of the destroyed subtree first, before
    /// that object is actually unlinked — this is where a caller runs
    /// the `__destructor` program. It receives `self` back (reborrowed)
    /// so it can run script code that touches the object table, without
    /// this method's own recursion over `children()` ever running
    /// twice: unlinking only ever happens here, once.
    pub fn delete<F>(&mut self, handle: u32, on_destroy: &mut F) -> FatalResult<()>
    where
        F: FnMut(&mut ObjectManager, u32) -> FatalResult<()>,
    {
        if !self.exists(handle) {
            return Ok(());
        }
        on_destroy(self, handle)?;

        let children = self.get(handle)?.children().to_vec();
        for child in children {
            self.get_mut(child)?.set_parent(child);
            self.delete(child, on_destroy)?;
        }

        let parent = self.get(handle)?.parent();
        if parent != handle {
            if let Ok(parent_obj) = self.get_mut(parent) {
                parent_obj.remove_child(handle);
            }
        }

        self.slots[handle as usize] = None;
        self.free_slots.push(handle);
        self.count -= 1;
        tracing::debug!(handle, "object destroyed");
        Ok(())
    }

    /// Re-parent `child` onto `new_parent`, updating both children
    /// lists. Used by `foreach`/reflection helpers that move objects
    /// around the tree.
    pub fn reparent(&mut self, child: u32, new_parent: u32) -> FatalResult<()> {
        let old_parent = self.get(child)?.parent();
        if old_parent != child {
            self.get_mut(old_parent)?.remove_child(child);
        }
        self.get_mut(child)?.set_parent(new_parent);
        if new_parent != child {
            self.get_mut(new_parent)?.add_child(child);
        }
        Ok(())
    }
}
